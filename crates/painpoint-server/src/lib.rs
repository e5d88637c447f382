pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: state::AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health::health))
        // Pain points
        .route(
            "/api/pain-points",
            get(routes::pain_points::list_pain_points).post(routes::pain_points::create_pain_point),
        )
        .route(
            "/api/pain-points/{slug}",
            get(routes::pain_points::get_pain_point),
        )
        .route(
            "/api/pain-points/{slug}/updates",
            post(routes::pain_points::append_update),
        )
        // Sub-pain-points
        .route(
            "/api/pain-points/{slug}/sub-pain-points",
            post(routes::pain_points::create_sub_pain_point),
        )
        .route(
            "/api/pain-points/{slug}/sub-pain-points/{sub}",
            get(routes::pain_points::get_sub_pain_point),
        )
        .route(
            "/api/pain-points/{slug}/sub-pain-points/{sub}/updates",
            post(routes::pain_points::append_sub_update),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Start the API server on `0.0.0.0:{port}`.
pub async fn serve(app_state: state::AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Start the API server on a pre-bound listener.
///
/// The caller can read the actual port before starting, which matters when
/// `port = 0` and the OS picks a free one.
pub async fn serve_on(
    app_state: state::AppState,
    listener: tokio::net::TcpListener,
) -> anyhow::Result<()> {
    let actual_port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!(port = actual_port, "pain-point API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
