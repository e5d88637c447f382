use painpoint_core::cache::ViewCache;
use painpoint_core::client::ContentClient;
use painpoint_core::config::Config;
use painpoint_core::fetcher::ContentFetcher;
use painpoint_core::writer::ContentWriter;
use std::sync::Arc;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<ContentFetcher>,
    pub writer: Arc<ContentWriter>,
    pub cache: Arc<ViewCache>,
}

impl AppState {
    /// Build state for `config`. `token` overrides the configured token variable.
    pub fn new(config: &Config, token: Option<String>) -> painpoint_core::Result<Self> {
        let token = token.or_else(|| config.content.token());
        let client = ContentClient::new(&config.content, token)?;
        if !client.has_token() {
            tracing::warn!(
                token_env = %config.content.token_env,
                "no content host token; write routes will be rejected"
            );
        }
        Ok(Self {
            fetcher: Arc::new(ContentFetcher::new(client.clone())),
            writer: Arc::new(ContentWriter::new(client)),
            cache: Arc::new(ViewCache::new(config.cache_ttl())),
        })
    }
}
