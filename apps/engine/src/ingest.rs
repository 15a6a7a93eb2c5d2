//! PDF ingestion — turns an uploaded resume PDF into the plain text the
//! tailoring prompt consumes.

use tracing::warn;

use crate::errors::AppError;

/// Prompt budget for extracted resume text; beyond this the tail is almost
/// always reference lists and page furniture, not career history.
const MAX_CHARS: usize = 8000;

const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// Extracts plain text from PDF bytes, capped at `MAX_CHARS` characters.
/// Extraction is CPU-bound, so it runs via `tokio::task::spawn_blocking`.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
        })?
        .map_err(|e| {
            warn!(error = %e, "PDF text extraction failed");
            AppError::Ingest(format!("Unable to extract text from PDF: {e}"))
        })?;

    Ok(cap_text(&text))
}

fn cap_text(text: &str) -> String {
    if text.chars().count() <= MAX_CHARS {
        return text.to_string();
    }
    let mut capped: String = text.chars().take(MAX_CHARS).collect();
    capped.push_str(TRUNCATION_MARKER);
    capped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_passes_through_unmarked() {
        let out = cap_text("Senior engineer, 8 years Rust.");
        assert_eq!(out, "Senior engineer, 8 years Rust.");
        assert!(!out.contains("[truncated]"));
    }

    #[test]
    fn test_long_text_is_capped_with_marker() {
        let long = "x".repeat(MAX_CHARS + 500);
        let out = cap_text(&long);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            out.chars().count(),
            MAX_CHARS + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn test_cap_is_char_boundary_safe() {
        let long = "é".repeat(MAX_CHARS + 1);
        let out = cap_text(&long);
        assert!(out.ends_with(TRUNCATION_MARKER));
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail_with_ingest_error() {
        let result = extract_pdf_text(b"this is not a pdf".to_vec()).await;
        assert!(matches!(result, Err(AppError::Ingest(_))));
    }
}
