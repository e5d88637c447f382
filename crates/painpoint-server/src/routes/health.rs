use axum::extract::State;
use axum::Json;

use crate::state::AppState;

/// GET /api/health: liveness plus whether writes are enabled.
pub async fn health(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "writesEnabled": app.fetcher.client().has_token(),
        "cacheEnabled": app.cache.is_enabled(),
    }))
}
