use anyhow::Context;
use painpoint_core::config::Config;
use painpoint_server::state::AppState;
use std::path::Path;

pub fn run(root: &Path, token: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load painpoints.yaml")?;
    for w in config.validate() {
        tracing::warn!(warning = %w.message, "config");
    }
    let port = port.unwrap_or(config.server.port);

    let state = AppState::new(&config, token).context("failed to build server state")?;
    super::runtime()?.block_on(painpoint_server::serve(state, port))
}
