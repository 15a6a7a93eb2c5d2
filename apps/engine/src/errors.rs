use thiserror::Error;

use crate::render::RenderError;

/// Engine-level error type returned across the library surface.
/// The embedding service maps these onto HTTP status codes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Ingestion error: {0}")]
    Ingest(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
