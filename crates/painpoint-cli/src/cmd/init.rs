use anyhow::Context;
use painpoint_core::{config::Config, io, paths};
use std::path::Path;

pub struct InitOptions {
    pub owner: String,
    pub repo: String,
    pub branch: Option<String>,
    pub content_root: Option<String>,
    pub api_base: Option<String>,
    pub force: bool,
}

pub fn run(root: &Path, opts: InitOptions) -> anyhow::Result<()> {
    let mut cfg = Config::new(opts.owner, opts.repo);
    cfg.content.branch = opts.branch;
    if let Some(content_root) = opts.content_root {
        cfg.content.root = content_root;
    }
    if let Some(api_base) = opts.api_base {
        cfg.content.api_base = api_base;
    }

    let path = paths::config_path(root);
    let data = cfg.to_yaml()?;

    if opts.force {
        io::atomic_write(&path, data.as_bytes()).context("failed to write painpoints.yaml")?;
        println!("  written: {}", paths::CONFIG_FILE);
    } else if io::write_if_missing(&path, data.as_bytes())
        .context("failed to write painpoints.yaml")?
    {
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {} (use --force to overwrite)", paths::CONFIG_FILE);
        return Ok(());
    }

    for w in cfg.validate() {
        println!("  note: {}", w.message);
    }
    Ok(())
}
