use std::path::PathBuf;

use anyhow::{Context, Result};

/// Engine configuration loaded from environment variables.
/// The embedding service calls `from_env()` once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    /// TeX engine binary to invoke. Defaults to `pdflatex`.
    pub tex_engine: String,
    /// Deployment-provided resume class file (`.cls`), staged into each
    /// compilation workspace when the document references it.
    pub resume_class_path: Option<PathBuf>,
    /// Wall-clock ceiling per compiler pass, in seconds.
    pub render_timeout_secs: u64,
    /// When set, sanitized documents are mirrored here for postmortems.
    pub render_debug_dir: Option<PathBuf>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            tex_engine: std::env::var("TEX_ENGINE").unwrap_or_else(|_| "pdflatex".to_string()),
            resume_class_path: std::env::var("RESUME_CLASS_PATH").ok().map(PathBuf::from),
            render_timeout_secs: std::env::var("RENDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("RENDER_TIMEOUT_SECS must be a whole number of seconds")?,
            render_debug_dir: std::env::var("RENDER_DEBUG_DIR").ok().map(PathBuf::from),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
