//! Response Normalizer — turns raw model text into parsed JSON.
//!
//! Models wrap JSON in markdown fences, preambles ("Here is the extraction:")
//! and trailing commentary. Normalization strips all of that and then parses
//! strictly. A response that still fails to parse degrades to a
//! [`ParseFailure`] carrying the original raw text — it never aborts the
//! pipeline, and the raw text is kept for manual recovery and prompt tuning.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel recorded in place of a pass's structured output when the model
/// response could not be parsed. Serialized as
/// `{"error": ..., "raw_response": ...}` so it persists as plain data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseFailure {
    pub error: String,
    pub raw_response: String,
}

/// Parses a raw model response into a JSON value.
///
/// Steps: trim whitespace, strip markdown code fences (with or without a
/// language tag), slice from the first `{` to the last `}` to drop any
/// surrounding prose, then parse strictly. Never panics.
///
/// A syntactically valid document with an unexpected shape is accepted as-is;
/// shape anomalies are the typed views' concern, not the normalizer's.
pub fn parse(raw: &str) -> Result<Value, ParseFailure> {
    let cleaned = strip_fences(raw.trim());
    let candidate = slice_to_object(cleaned).unwrap_or(cleaned);

    serde_json::from_str(candidate).map_err(|e| ParseFailure {
        error: format!("JSON parsing failed: {e}"),
        raw_response: raw.to_string(),
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Slices to the span from the first `{` to the last `}`, discarding any
/// preamble or trailing commentary the model added around the JSON object.
fn slice_to_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start <= end).then(|| &text[start..=end])
}
