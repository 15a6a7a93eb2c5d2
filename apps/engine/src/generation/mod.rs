// Application tailoring: one structured LLM call that rewrites the
// candidate's materials against a target job posting.
// All LLM calls go through llm_client — no direct API calls here.

pub mod prompts;
pub mod tailor;

pub use tailor::{tailor_application, TailorRequest, TailoredApplication};
