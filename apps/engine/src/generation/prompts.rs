// All LLM prompt constants for the tailoring module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// System prompt for application tailoring — enforces JSON-only output.
/// Replace `{json_only}` and `{factuality}` with the shared fragments.
pub const TAILOR_SYSTEM_TEMPLATE: &str = "You are an expert job-application assistant. \
    Given a candidate's resume text, cover letter, and a job posting, you produce a \
    tailored, ATS-friendly application package. \
    {json_only} {factuality}";

/// Tailoring prompt template.
/// Replace: {class_hint}, {inputs_json}
pub const TAILOR_PROMPT_TEMPLATE: &str = r#"Tailor the candidate's application to the target job posting.

Return a JSON object with this EXACT schema (no extra fields):
{
  "resume_tex": "complete LaTeX source of the tailored resume",
  "cover_letter": "customized cover letter, 3-6 short paragraphs, plain text",
  "resume_suggestions": [
    "short actionable suggestion, at most 2 sentences"
  ],
  "interview_questions": [
    "role-appropriate interview question the candidate should prepare for"
  ],
  "outreach_suggestions": [
    {
      "method": "how to reach the hiring team",
      "source": "public source to use",
      "search_terms": ["example search terms"]
    }
  ]
}

Rules for resume_tex:
- It must be a COMPLETE compilable LaTeX document: `\documentclass{{class_hint}}`
  through `\end{document}`.
- Plain structure only: sections, itemize lists, simple tabular headers. No
  exotic packages.
- Escape LaTeX special characters in prose (&, %, #, _).
- Keep it to one page of dense, quantified bullet points matched to the
  posting's keywords.

Rules for the rest:
- cover_letter: concise, specific to this posting, no placeholders like
  "[Company]" left unfilled if the posting names the company.
- resume_suggestions: concrete edits the candidate should make by hand.
- interview_questions: exactly 10, role-appropriate.
- outreach_suggestions: methods and public sources only. Do NOT fabricate
  names, emails, or phone numbers.

CANDIDATE MATERIALS AND JOB POSTING (JSON):
{inputs_json}"#;
