use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use painpoint_core::ledger::PainPointView;
use painpoint_core::view::{timeline, ScoreBadge};
use painpoint_core::writer::{Created, NewPainPoint, NewSubPainPoint, NewUpdate, UpdateTarget};
use painpoint_core::PainPointError;
use std::sync::Arc;

use crate::error::AppError;
use crate::state::AppState;

/// Cached view for `slug`, loading it from the content host on a miss.
async fn load_view(app: &AppState, slug: &str) -> Result<Arc<PainPointView>, AppError> {
    if let Some(view) = app.cache.get(slug).await {
        return Ok(view);
    }
    let view = app.fetcher.load_pain_point(slug).await?;
    Ok(app.cache.insert(view).await)
}

fn view_json(view: &PainPointView) -> serde_json::Value {
    serde_json::json!({
        "slug": view.slug(),
        "record": view.record,
        "currentDemandScore": view.current_demand_score,
        "currentProgressScore": view.current_progress_score,
        "demandBadge": ScoreBadge::for_score(view.current_demand_score),
        "progressBadge": ScoreBadge::for_score(view.current_progress_score),
        "subPainPoints": view.sub_pain_points,
        "allUpdates": view.all_updates,
        "timeline": timeline(view),
    })
}

/// GET /api/pain-points: list pain points.
pub async fn list_pain_points(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let list = app.fetcher.list_pain_points().await;
    Ok(Json(serde_json::json!(list)))
}

/// GET /api/pain-points/{slug}: the aggregated view with its timeline.
pub async fn get_pain_point(
    State(app): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view = load_view(&app, &slug).await?;
    Ok(Json(view_json(&view)))
}

/// GET /api/pain-points/{slug}/sub-pain-points/{sub}: one sub-pain-point and its events.
pub async fn get_sub_pain_point(
    State(app): State<AppState>,
    Path((slug, sub)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, AppError> {
    let view = load_view(&app, &slug).await?;
    let Some(found) = view.sub_pain_points.iter().find(|s| s.sub.slug == sub) else {
        return Err(PainPointError::SubPainPointNotFound { parent: slug, slug: sub }.into());
    };
    let entries: Vec<_> = timeline(&view)
        .into_iter()
        .filter(|e| e.source_id == sub)
        .collect();
    Ok(Json(serde_json::json!({
        "parent": view.slug(),
        "subPainPoint": found,
        "demandBadge": ScoreBadge::for_score(found.current_demand_score),
        "progressBadge": ScoreBadge::for_score(found.current_progress_score),
        "timeline": entries,
    })))
}

/// POST /api/pain-points: create a pain point.
pub async fn create_pain_point(
    State(app): State<AppState>,
    Json(body): Json<NewPainPoint>,
) -> Result<(StatusCode, Json<Created>), AppError> {
    let created = app.writer.create_pain_point(&body).await?;
    app.cache.invalidate(&created.slug).await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/pain-points/{slug}/updates: append an update to a pain point.
pub async fn append_update(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<NewUpdate>,
) -> Result<(StatusCode, Json<Created>), AppError> {
    let target = UpdateTarget::PainPoint(slug.clone());
    let created = app.writer.append_update(&target, &body).await?;
    app.cache.invalidate(&slug).await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/pain-points/{slug}/sub-pain-points: create a sub-pain-point.
pub async fn create_sub_pain_point(
    State(app): State<AppState>,
    Path(slug): Path<String>,
    Json(body): Json<NewSubPainPoint>,
) -> Result<(StatusCode, Json<Created>), AppError> {
    let created = app.writer.create_sub_pain_point(&slug, &body).await?;
    app.cache.invalidate(&slug).await;
    Ok((StatusCode::CREATED, Json(created)))
}

/// POST /api/pain-points/{slug}/sub-pain-points/{sub}/updates: append an update to a sub-pain-point.
pub async fn append_sub_update(
    State(app): State<AppState>,
    Path((slug, sub)): Path<(String, String)>,
    Json(body): Json<NewUpdate>,
) -> Result<(StatusCode, Json<Created>), AppError> {
    let target = UpdateTarget::SubPainPoint {
        parent: slug.clone(),
        slug: sub,
    };
    let created = app.writer.append_update(&target, &body).await?;
    app.cache.invalidate(&slug).await;
    Ok((StatusCode::CREATED, Json(created)))
}
