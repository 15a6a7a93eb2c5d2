// PDF rendering pipeline: sanitize the LLM-authored LaTeX source, stage it
// into an isolated workspace, run the TeX engine twice, return bytes or a
// diagnostic report. Sanitization is pure string transformation; everything
// that touches the filesystem or spawns processes lives in the pipeline.

use std::path::PathBuf;

use thiserror::Error;

pub mod compiler;
pub mod diagnostics;
pub mod pipeline;
pub mod sanitize;

// Re-export the public API consumed by other modules (state, tests).
pub use diagnostics::{DebugSink, DirSink};
pub use pipeline::Renderer;
pub use sanitize::sanitize;

/// Failure taxonomy for one rendering request. All variants are terminal for
/// the request and none of them crash the process; the embedding service maps
/// them onto its own error surface.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The caller supplied an empty (or whitespace-only) document. Reported
    /// before any filesystem or process activity.
    #[error("empty document: nothing to compile")]
    EmptyInput,

    /// A configured auxiliary resource does not exist. Reported before any
    /// workspace is created.
    #[error("auxiliary resource not found: {0}")]
    ResourceNotFound(PathBuf),

    /// The TeX engine binary could not be located or started. An environment
    /// misconfiguration, not a document defect.
    #[error("TeX engine '{engine}' could not be started: {source}")]
    ToolMissing {
        engine: String,
        #[source]
        source: std::io::Error,
    },

    /// Two compiler passes completed but no artifact was produced.
    /// `exit_code` is the second pass's status (`None` when it was killed on
    /// timeout); `log_excerpt` carries the relevant compiler log lines.
    #[error("compilation produced no PDF (exit code {exit_code:?})")]
    Compilation {
        exit_code: Option<i32>,
        log_excerpt: String,
    },

    /// Workspace staging or readback failed.
    #[error("workspace I/O error: {0}")]
    Workspace(#[from] std::io::Error),
}
