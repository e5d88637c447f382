use crate::output::{print_fields, print_json};
use anyhow::Context;
use clap::Subcommand;
use painpoint_core::config::{Config, WarnLevel};
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    match subcmd {
        ConfigSubcommand::Show => show(&config, json),
        ConfigSubcommand::Validate => validate(&config, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config: &Config, json: bool) -> anyhow::Result<()> {
    let token_set = config.content.token().is_some();
    if json {
        let value = serde_json::json!({
            "config": config,
            "token_set": token_set,
        });
        return print_json(&value);
    }

    let c = &config.content;
    print_fields(&[
        ("api base", c.api_base.clone()),
        ("repository", format!("{}/{}", c.owner, c.repo)),
        ("branch", c.branch.clone().unwrap_or_else(|| "(default)".to_string())),
        ("content root", c.root.clone()),
        (
            "token",
            format!("${} ({})", c.token_env, if token_set { "set" } else { "unset" }),
        ),
        ("cache ttl", format!("{}s", config.cache_ttl_secs)),
        ("port", config.server.port.to_string()),
    ]);
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(config: &Config, json: bool) -> anyhow::Result<()> {
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }

    Ok(())
}
