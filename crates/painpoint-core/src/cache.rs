//! Time-bounded cache of derived views, keyed by slug.
//!
//! Views are derived on every read; the cache only spares the content host
//! repeated listings. A zero TTL disables it entirely.

use crate::ledger::PainPointView;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

#[derive(Debug)]
pub struct ViewCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, Arc<PainPointView>)>>,
}

impl ViewCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// The cached view for `slug`, if it is younger than the TTL.
    pub async fn get(&self, slug: &str) -> Option<Arc<PainPointView>> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        let (stored_at, view) = entries.get(slug)?;
        if stored_at.elapsed() >= self.ttl {
            return None;
        }
        tracing::debug!(slug = %slug, "view cache hit");
        Some(Arc::clone(view))
    }

    pub async fn insert(&self, view: PainPointView) -> Arc<PainPointView> {
        let view = Arc::new(view);
        if self.is_enabled() {
            let mut entries = self.entries.write().await;
            entries.retain(|_, (stored_at, _)| stored_at.elapsed() < self.ttl);
            entries.insert(view.slug().to_string(), (Instant::now(), Arc::clone(&view)));
        }
        view
    }

    pub async fn invalidate(&self, slug: &str) {
        if self.entries.write().await.remove(slug).is_some() {
            tracing::debug!(slug = %slug, "view cache invalidated");
        }
    }
}
