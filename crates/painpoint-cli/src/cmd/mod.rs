pub mod config;
pub mod init;
pub mod pain_point;
pub mod serve;
pub mod sub;
pub mod update;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use painpoint_core::client::ContentClient;
use painpoint_core::config::Config;
use std::path::Path;

/// Load the config and build a content client; `token` overrides the env variable.
pub(crate) fn client(root: &Path, token: Option<String>) -> anyhow::Result<ContentClient> {
    let config = Config::load(root).context("failed to load painpoints.yaml")?;
    let token = token.or_else(|| config.content.token());
    ContentClient::new(&config.content, token).context("failed to build content client")
}

pub(crate) fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}

/// Accepts RFC 3339 or a bare `YYYY-MM-DD` (midnight UTC).
pub(crate) fn parse_date_arg(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("'{s}' is not an RFC 3339 timestamp or YYYY-MM-DD date"))
}
