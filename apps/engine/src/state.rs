use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::tailor::{tailor_application, TailorRequest, TailoredApplication};
use crate::llm_client::LlmClient;
use crate::render::Renderer;

/// Shared engine state the embedding service constructs once at startup and
/// clones into its request handlers.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    pub renderer: Arc<Renderer>,
    pub config: Config,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        let llm = LlmClient::new(config.anthropic_api_key.clone());
        info!("LLM client initialized (model: {})", crate::llm_client::MODEL);

        let renderer = Arc::new(Renderer::from_config(&config));
        info!(engine = %config.tex_engine, "renderer initialized");

        Self {
            llm,
            renderer,
            config,
        }
    }

    /// The document class the tailoring prompt targets: the deployment's
    /// resume class when one is configured, plain `article` otherwise.
    pub fn class_hint(&self) -> &str {
        self.config
            .resume_class_path
            .as_deref()
            .and_then(|p| p.file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("article")
    }

    /// End-to-end convenience: tailor the candidate's application against the
    /// posting, then render the generated resume to PDF bytes. The embedding
    /// service calls this from its generate endpoint; callers that only need
    /// the text package use `tailor_application` directly.
    pub async fn tailor_and_render(
        &self,
        request: &TailorRequest,
    ) -> Result<(TailoredApplication, Vec<u8>), AppError> {
        let tailored = tailor_application(&self.llm, request, self.class_hint()).await?;
        let pdf = self.renderer.render_pdf(&tailored.resume_tex).await?;
        Ok((tailored, pdf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config(class_path: Option<&str>) -> Config {
        Config {
            anthropic_api_key: "test-key-never-used".to_string(),
            tex_engine: "pdflatex".to_string(),
            resume_class_path: class_path.map(PathBuf::from),
            render_timeout_secs: 30,
            render_debug_dir: None,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn test_class_hint_uses_configured_class_stem() {
        let state = AppState::from_config(test_config(Some("/opt/styles/resume.cls")));
        assert_eq!(state.class_hint(), "resume");
    }

    #[test]
    fn test_class_hint_defaults_to_article() {
        let state = AppState::from_config(test_config(None));
        assert_eq!(state.class_hint(), "article");
    }
}
