//! Extraction of JSON objects from model completions.
//!
//! Models asked for bare JSON still wrap it in code fences or surround it
//! with prose. These helpers strip the fences and pick out the first
//! well-formed `{ ... }` object before parsing.

use serde_json::{Deserializer, Value};

use crate::PapersmithError;

/// Removes a leading ```` ```json ```` / ```` ``` ```` fence and a trailing fence.
pub fn strip_code_fences(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// The first span starting at a `{` that parses as a complete JSON object,
/// or the stripped text itself when there is none.
pub fn extract_json_object(raw: &str) -> &str {
    let cleaned = strip_code_fences(raw);
    cleaned
        .match_indices('{')
        .find_map(|(start, _)| {
            let tail = &cleaned[start..];
            let mut stream = Deserializer::from_str(tail).into_iter::<Value>();
            match stream.next() {
                Some(Ok(value)) if value.is_object() => Some(&tail[..stream.byte_offset()]),
                _ => None,
            }
        })
        .unwrap_or(cleaned)
}

/// Parses the first JSON object found in `raw`.
pub fn parse_json_object(raw: &str) -> Result<Value, PapersmithError> {
    let candidate = extract_json_object(raw);
    let value: Value = serde_json::from_str(candidate).map_err(|err| {
        PapersmithError::ParseFailed {
            output: truncate_for_error(raw),
            reason: err.to_string(),
        }
    })?;
    if !value.is_object() {
        return Err(PapersmithError::ParseFailed {
            output: truncate_for_error(raw),
            reason: "expected a JSON object".to_string(),
        });
    }
    Ok(value)
}

fn truncate_for_error(raw: &str) -> String {
    const LIMIT: usize = 200;
    if raw.chars().count() <= LIMIT {
        return raw.to_string();
    }
    let mut out: String = raw.chars().take(LIMIT).collect();
    out.push_str("...");
    out
}
