use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use painpoint_core::error::PainPointError;

// ---------------------------------------------------------------------------
// AppError: unified error type for HTTP responses
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

fn status_for(err: &PainPointError) -> StatusCode {
    match err {
        PainPointError::NotFound(_) | PainPointError::SubPainPointNotFound { .. } => {
            StatusCode::NOT_FOUND
        }
        PainPointError::InvalidSlug(_) | PainPointError::InvalidInput(_) => {
            StatusCode::BAD_REQUEST
        }
        PainPointError::MissingToken(_) => StatusCode::UNAUTHORIZED,
        PainPointError::Upstream { .. } => StatusCode::BAD_GATEWAY,
        PainPointError::NotInitialized
        | PainPointError::Http(_)
        | PainPointError::Io(_)
        | PainPointError::Yaml(_)
        | PainPointError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self
            .0
            .downcast_ref::<PainPointError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %format_args!("{:#}", self.0), "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
