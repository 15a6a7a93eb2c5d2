// Cross-cutting prompt fragments shared by every module that talks to the LLM.
// Module-specific templates live next to their callers and splice these in.

/// Output discipline — spliced into every system prompt that expects JSON back.
pub const JSON_ONLY_INSTRUCTION: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Factuality guard — the engine rewrites career history, it never invents it.
pub const FACTUALITY_INSTRUCTION: &str = "Use ONLY facts present in the provided \
    candidate materials. Do NOT invent employers, job titles, dates, degrees, \
    metrics, or personal contact details. If a detail is missing, omit it rather \
    than guessing.";
