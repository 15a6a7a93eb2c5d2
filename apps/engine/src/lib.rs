//! Tailor Engine — the application-tailoring and PDF-rendering core.
//!
//! The HTTP layer lives in a separate service and embeds this crate. The
//! pipeline it drives: ingest the candidate's PDF resume into plain text,
//! call the LLM once to produce a tailored application (resume as a LaTeX
//! document, cover letter, suggestions), then sanitize and compile that
//! document into PDF bytes via the external TeX toolchain.

pub mod config;
pub mod errors;
pub mod generation;
pub mod ingest;
pub mod llm_client;
pub mod render;
pub mod state;

// Re-export the surface the embedding service consumes.
pub use config::Config;
pub use errors::AppError;
pub use generation::tailor::{TailorRequest, TailoredApplication};
pub use render::{RenderError, Renderer};
pub use state::AppState;
