//! Application tailoring — orchestrates the single LLM call that rewrites a
//! candidate's materials against a job posting.
//!
//! Flow: validate inputs → build prompt → LLM call (JSON mode) → structural
//! check of the returned LaTeX → retry on structural failure → return.
//! The returned `resume_tex` is NOT trusted to be clean LaTeX; the render
//! pipeline sanitizes it before compilation.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{TAILOR_PROMPT_TEMPLATE, TAILOR_SYSTEM_TEMPLATE};
use crate::llm_client::prompts::{FACTUALITY_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::LlmClient;

/// Extra attempts when the model returns a structurally unusable document.
const MAX_TAILOR_RETRIES: u32 = 2;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Candidate materials plus the target posting. At least one of `resume_text`
/// and `cover_letter` must be non-blank; `job_posting` may be empty (the
/// model then optimizes generically).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailorRequest {
    #[serde(default)]
    pub resume_text: String,
    #[serde(default)]
    pub cover_letter: String,
    #[serde(default)]
    pub job_posting: String,
}

/// One suggested route for reaching the hiring team. Methods and public
/// sources only — the model is forbidden from fabricating contact details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachSuggestion {
    pub method: String,
    pub source: String,
    #[serde(default)]
    pub search_terms: Vec<String>,
}

/// The full tailored package returned by the LLM.
/// `resume_tex` is a complete LaTeX document destined for the render pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TailoredApplication {
    pub resume_tex: String,
    pub cover_letter: String,
    #[serde(default)]
    pub resume_suggestions: Vec<String>,
    #[serde(default)]
    pub interview_questions: Vec<String>,
    #[serde(default)]
    pub outreach_suggestions: Vec<OutreachSuggestion>,
}

// ────────────────────────────────────────────────────────────────────────────
// Tailoring pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the tailoring call. `class_hint` is the document class the model is
/// told to target (`article`, or the deployment's resume class stem).
///
/// Retries up to `MAX_TAILOR_RETRIES` extra times when the reply parses but
/// `resume_tex` is not a complete LaTeX document; a model that keeps
/// returning fragments is a terminal `Llm` error, not a render failure.
pub async fn tailor_application(
    llm: &LlmClient,
    request: &TailorRequest,
    class_hint: &str,
) -> Result<TailoredApplication, AppError> {
    if request.resume_text.trim().is_empty() && request.cover_letter.trim().is_empty() {
        return Err(AppError::Validation(
            "Provide at least resume text or a cover letter.".to_string(),
        ));
    }

    let system = build_tailor_system();
    let prompt = build_tailor_prompt(request, class_hint)?;

    for attempt in 0..=MAX_TAILOR_RETRIES {
        let tailored: TailoredApplication = llm
            .call_json(&prompt, &system)
            .await
            .map_err(|e| AppError::Llm(format!("Tailoring LLM call failed: {e}")))?;

        if is_complete_latex(&tailored.resume_tex) {
            info!(
                suggestions = tailored.resume_suggestions.len(),
                questions = tailored.interview_questions.len(),
                "tailored application generated"
            );
            return Ok(tailored);
        }

        warn!(
            attempt = attempt + 1,
            max = MAX_TAILOR_RETRIES + 1,
            "tailoring reply was not a complete LaTeX document; retrying"
        );
    }

    Err(AppError::Llm(format!(
        "Tailoring failed after {} attempts: model never returned a complete LaTeX resume",
        MAX_TAILOR_RETRIES + 1
    )))
}

/// A usable resume document carries its own class declaration; everything
/// else the sanitizer can repair.
fn is_complete_latex(resume_tex: &str) -> bool {
    resume_tex.contains("\\documentclass")
}

fn build_tailor_system() -> String {
    TAILOR_SYSTEM_TEMPLATE
        .replace("{json_only}", JSON_ONLY_INSTRUCTION)
        .replace("{factuality}", FACTUALITY_INSTRUCTION)
}

/// Builds the tailoring prompt by serializing the request into the template.
fn build_tailor_prompt(request: &TailorRequest, class_hint: &str) -> Result<String, AppError> {
    let inputs_json = serde_json::to_string_pretty(request)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize inputs: {e}")))?;

    Ok(TAILOR_PROMPT_TEMPLATE
        .replace("{class_hint}", class_hint)
        .replace("{inputs_json}", &inputs_json))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_request() -> TailorRequest {
        TailorRequest {
            resume_text: "Senior engineer, 8 years Rust, built payment infra.".to_string(),
            cover_letter: String::new(),
            job_posting: "Rust engineer for distributed systems at Acme.".to_string(),
        }
    }

    #[test]
    fn test_tailored_application_deserializes_full_reply() {
        let json = r#"{
            "resume_tex": "\\documentclass{article}\\begin{document}ok\\end{document}",
            "cover_letter": "Dear team,",
            "resume_suggestions": ["Quantify the payments work"],
            "interview_questions": ["Why Rust?"],
            "outreach_suggestions": [
                {"method": "LinkedIn search", "source": "company page", "search_terms": ["Acme recruiter"]}
            ]
        }"#;
        let parsed: TailoredApplication = serde_json::from_str(json).unwrap();
        assert!(parsed.resume_tex.contains("\\documentclass"));
        assert_eq!(parsed.resume_suggestions.len(), 1);
        assert_eq!(parsed.outreach_suggestions[0].method, "LinkedIn search");
    }

    #[test]
    fn test_optional_lists_default_to_empty() {
        let json = r#"{
            "resume_tex": "\\documentclass{article}",
            "cover_letter": ""
        }"#;
        let parsed: TailoredApplication = serde_json::from_str(json).unwrap();
        assert!(parsed.resume_suggestions.is_empty());
        assert!(parsed.interview_questions.is_empty());
        assert!(parsed.outreach_suggestions.is_empty());
    }

    #[test]
    fn test_is_complete_latex_requires_documentclass() {
        assert!(is_complete_latex("\\documentclass{resume}\n..."));
        assert!(!is_complete_latex("Just some markdown-ish text"));
    }

    #[test]
    fn test_prompt_contains_inputs_and_class_hint() {
        let prompt = build_tailor_prompt(&make_request(), "resume").unwrap();
        assert!(prompt.contains("payment infra"));
        assert!(prompt.contains("distributed systems at Acme"));
        assert!(prompt.contains("\\documentclass{resume}"));
        assert!(!prompt.contains("{inputs_json}"));
    }

    #[test]
    fn test_system_prompt_splices_shared_fragments() {
        let system = build_tailor_system();
        assert!(system.contains("valid JSON only"));
        assert!(system.contains("Do NOT invent employers"));
        assert!(!system.contains("{json_only}"));
    }

    #[tokio::test]
    async fn test_blank_materials_rejected_before_any_llm_call() {
        let llm = LlmClient::new("test-key-never-used".to_string());
        let request = TailorRequest {
            resume_text: "  ".to_string(),
            cover_letter: "\n".to_string(),
            job_posting: "anything".to_string(),
        };
        let result = tailor_application(&llm, &request, "article").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
