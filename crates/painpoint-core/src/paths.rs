use crate::error::{PainPointError, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "painpoints.yaml";

pub const UPDATES_DIR: &str = "updates";
pub const SUB_PAIN_POINTS_DIR: &str = "sub-pain-points";
pub const INDEX_FILE: &str = "index.yaml";

// ---------------------------------------------------------------------------
// Local paths
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Content-host paths
//
// All of these are repository-relative, '/'-separated strings.
// ---------------------------------------------------------------------------

/// Join path segments with '/', dropping empty segments and stray slashes.
pub fn join(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn pain_point_dir(content_root: &str, slug: &str) -> String {
    join(&[content_root, slug])
}

/// Preferred file name for a new main record.
pub fn main_record_path(content_root: &str, slug: &str) -> String {
    join(&[content_root, slug, &format!("{slug}.yaml")])
}

/// Main-record file names in preference order.
pub fn main_record_candidates(slug: &str) -> [String; 4] {
    [
        format!("{slug}.yaml"),
        format!("{slug}.yml"),
        INDEX_FILE.to_string(),
        format!("{slug}.json"),
    ]
}

pub fn updates_dir(content_root: &str, slug: &str) -> String {
    join(&[content_root, slug, UPDATES_DIR])
}

pub fn sub_pain_points_dir(content_root: &str, slug: &str) -> String {
    join(&[content_root, slug, SUB_PAIN_POINTS_DIR])
}

pub fn sub_record_path(content_root: &str, slug: &str, sub_slug: &str) -> String {
    join(&[
        content_root,
        slug,
        SUB_PAIN_POINTS_DIR,
        &format!("{sub_slug}.yaml"),
    ])
}

pub fn sub_updates_dir(content_root: &str, slug: &str, sub_slug: &str) -> String {
    join(&[content_root, slug, SUB_PAIN_POINTS_DIR, sub_slug, UPDATES_DIR])
}

/// `update-{timestamp}.yaml`, where the timestamp is ISO-8601 with ':' and '.'
/// replaced by '-' and cut to 19 characters (second resolution).
pub fn update_file_name(at: DateTime<Utc>) -> String {
    let iso = at.to_rfc3339_opts(SecondsFormat::Millis, true);
    let stamp: String = iso
        .chars()
        .map(|c| if c == ':' || c == '.' { '-' } else { c })
        .take(19)
        .collect();
    format!("update-{stamp}.yaml")
}

pub fn is_yaml_file(name: &str) -> bool {
    name.ends_with(".yaml") || name.ends_with(".yml")
}

/// File name without its final extension.
pub fn file_stem(name: &str) -> &str {
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

static SLUG_RE: OnceLock<Regex> = OnceLock::new();

fn slug_re() -> &'static Regex {
    SLUG_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.is_empty() || slug.len() > 64 || !slug_re().is_match(slug) {
        return Err(PainPointError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Derive a slug from a free-text title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.truncate(64);
    slug.trim_end_matches('-').to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
