use thiserror::Error;

#[derive(Debug, Error)]
pub enum PainPointError {
    #[error("not initialized: run 'painpoints init'")]
    NotInitialized,

    #[error("pain point not found: {0}")]
    NotFound(String),

    #[error("sub-pain-point not found: {parent}/{slug}")]
    SubPainPointNotFound { parent: String, slug: String },

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("content host token missing: set ${0} to enable writes")]
    MissingToken(String),

    #[error("content host returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PainPointError>;
