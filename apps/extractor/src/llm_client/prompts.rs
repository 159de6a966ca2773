// Cross-cutting prompt fragments shared by every extraction pass.
// Each pass defines its own template in `extraction::prompts`; this file
// holds only what applies to all of them.

/// System prompt applied to every completion call — enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str =
    "You are a precise analyst of health and performance practitioner interviews. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
