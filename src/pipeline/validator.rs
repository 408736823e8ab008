use crate::{
    error::{ComicError, Result},
    models::GenerationRequest,
};
use serde_json::Value;

/// Extracts prompts from a `{ prompt }` or `{ prompts }` body.
///
/// `prompts` wins when both are present. A `null`, `false`, `0` or `""` field
/// counts as absent. A non-array `prompts` is treated as a single prompt. Every element must be a string; elements are trimmed and
/// blank ones dropped, and at least one must remain.
pub fn validate_body(body: &Value) -> Result<GenerationRequest> {
    let (raw, batch): (Vec<&Value>, bool) = match (field(body, "prompts"), field(body, "prompt")) {
        (Some(Value::Array(items)), _) => (items.iter().collect(), true),
        (Some(single), _) => (vec![single], true),
        (None, Some(single)) => (vec![single], false),
        (None, None) => {
            return Err(ComicError::Validation(
                "No prompts provided in request".into(),
            ))
        }
    };

    let mut prompts = Vec::with_capacity(raw.len());
    for (index, value) in raw.into_iter().enumerate() {
        let prompt = value.as_str().ok_or_else(|| {
            ComicError::Validation(format!("Invalid prompt at index {}: must be a string", index))
        })?;
        let prompt = prompt.trim();
        if !prompt.is_empty() {
            prompts.push(prompt.to_string());
        }
    }

    if prompts.is_empty() {
        return Err(ComicError::Validation("Empty prompts array".into()));
    }

    Ok(GenerationRequest::new(prompts, batch))
}

/// Single-theme form used by the plot route: `prompt` must be a non-blank string.
pub fn validate_theme(body: &Value) -> Result<String> {
    match field(body, "prompt") {
        Some(Value::String(prompt)) if !prompt.trim().is_empty() => Ok(prompt.trim().to_string()),
        _ => Err(ComicError::Validation(
            "Invalid or missing prompt in request".into(),
        )),
    }
}

fn field<'a>(body: &'a Value, name: &str) -> Option<&'a Value> {
    body.get(name).filter(|value| is_set(value))
}

fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
