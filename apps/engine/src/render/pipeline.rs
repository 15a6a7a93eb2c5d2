//! Compilation Orchestrator — turns a sanitized LaTeX source into PDF bytes.
//!
//! Flow per request: validate → stage into a fresh `TempDir` workspace →
//! conditionally stage the resume class → run the TeX engine twice → read the
//! artifact back, or assemble a diagnostic report from the compiler log.
//!
//! The workspace is owned by this function for the duration of one request
//! and removed on drop, so every exit path (success, any failure kind, panic
//! unwind) tears it down. Concurrent requests are safe: each gets its own
//! workspace and its own child process; nothing is shared.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::config::Config;
use crate::render::compiler::{run_pass, PassOutput};
use crate::render::diagnostics::{build_report, DebugSink, DirSink};
use crate::render::sanitize::sanitize;
use crate::render::RenderError;

/// File stem for everything staged or produced in the workspace
/// (`resume.tex` in, `resume.pdf` / `resume.log` out).
const DOC_STEM: &str = "resume";

/// The TeX toolchain needs a second pass to resolve forward references
/// (labels, tables of contents), and commonly reports recoverable warnings
/// as failures on pass one. Always exactly two; a second genuine failure is
/// terminal, never retried.
const COMPILE_PASSES: u32 = 2;

const DEFAULT_PASS_TIMEOUT: Duration = Duration::from_secs(30);

/// One configured rendering pipeline. Cheap to clone-by-Arc inside an
/// application state; construction does no I/O.
pub struct Renderer {
    engine: String,
    class_path: Option<PathBuf>,
    pass_timeout: Duration,
    workspace_root: PathBuf,
    debug_sink: Option<Arc<dyn DebugSink>>,
}

impl Renderer {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            class_path: None,
            pass_timeout: DEFAULT_PASS_TIMEOUT,
            workspace_root: std::env::temp_dir(),
            debug_sink: None,
        }
    }

    /// Builds a renderer from deployment configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut renderer = Renderer::new(config.tex_engine.clone())
            .with_pass_timeout(Duration::from_secs(config.render_timeout_secs));
        if let Some(cls) = &config.resume_class_path {
            renderer = renderer.with_class_path(cls.clone());
        }
        if let Some(dir) = &config.render_debug_dir {
            renderer = renderer.with_debug_sink(Arc::new(DirSink::new(dir.clone())));
        }
        renderer
    }

    /// Deployment-provided class file staged into workspaces on demand.
    pub fn with_class_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.class_path = Some(path.into());
        self
    }

    pub fn with_pass_timeout(mut self, timeout: Duration) -> Self {
        self.pass_timeout = timeout;
        self
    }

    /// Parent directory for per-request workspaces. Defaults to the system
    /// temp dir; tests point this at their own scratch space.
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    pub fn with_debug_sink(mut self, sink: Arc<dyn DebugSink>) -> Self {
        self.debug_sink = Some(sink);
        self
    }

    /// Sanitizes a raw LLM-authored document and compiles it to PDF bytes.
    pub async fn render_pdf(&self, raw: &str) -> Result<Vec<u8>, RenderError> {
        let document = sanitize(raw);
        if let Some(sink) = &self.debug_sink {
            sink.record("sanitized", &document).await;
        }
        self.compile(&document).await
    }

    /// Compiles an already-sanitized document. Exposed separately so callers
    /// holding pre-validated sources skip re-sanitization.
    pub async fn compile(&self, document: &str) -> Result<Vec<u8>, RenderError> {
        if document.trim().is_empty() {
            return Err(RenderError::EmptyInput);
        }

        // Fail fast on a missing class file: no workspace yet, nothing to
        // leave behind.
        if let Some(cls) = &self.class_path {
            if !cls.exists() {
                return Err(RenderError::ResourceNotFound(cls.clone()));
            }
        }

        let workspace = tempfile::Builder::new()
            .prefix("render-")
            .tempdir_in(&self.workspace_root)?;
        let tex_path = workspace.path().join(format!("{DOC_STEM}.tex"));
        tokio::fs::write(&tex_path, document).await?;

        self.stage_class_file(document, workspace.path()).await?;

        let mut final_pass: Option<PassOutput> = None;
        for pass in 1..=COMPILE_PASSES {
            let output = run_pass(&self.engine, workspace.path(), &tex_path, self.pass_timeout)
                .await?;
            debug!(
                pass,
                exit_code = ?output.exit_code,
                timed_out = output.timed_out,
                "TeX pass finished"
            );
            final_pass = Some(output);
        }
        let final_pass = final_pass.expect("at least one compile pass ran");

        let pdf_path = workspace.path().join(format!("{DOC_STEM}.pdf"));
        if pdf_path.exists() {
            let bytes = tokio::fs::read(&pdf_path).await?;
            info!(bytes = bytes.len(), "render produced PDF artifact");
            return Ok(bytes);
        }

        let log_path = workspace.path().join(format!("{DOC_STEM}.log"));
        let log = tokio::fs::read(&log_path)
            .await
            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
            .unwrap_or_default();

        info!(exit_code = ?final_pass.exit_code, "render failed; assembling diagnostics");
        Err(RenderError::Compilation {
            exit_code: final_pass.exit_code,
            log_excerpt: build_report(&log, &final_pass),
        })
        // `workspace` drops here on every path, removing the directory tree.
    }

    /// Copies the class file into the workspace, but only when the document
    /// actually references its logical name; a self-contained document must
    /// not grow a spurious dependency.
    async fn stage_class_file(&self, document: &str, workspace: &Path) -> Result<(), RenderError> {
        let Some(cls) = &self.class_path else {
            return Ok(());
        };
        if !references_resource(document, cls) {
            debug!(class = %cls.display(), "document does not reference class; compiling without it");
            return Ok(());
        }
        let file_name = cls
            .file_name()
            .ok_or_else(|| RenderError::ResourceNotFound(cls.clone()))?;
        tokio::fs::copy(cls, workspace.join(file_name)).await?;
        Ok(())
    }
}

/// True when the document mentions the resource's logical name (file stem) in
/// braces, as `\documentclass{resume}` or `\usepackage{resume}` would.
fn references_resource(document: &str, resource: &Path) -> bool {
    resource
        .file_stem()
        .and_then(|s| s.to_str())
        .map(|stem| document.contains(&format!("{{{stem}}}")))
        .unwrap_or(false)
}
