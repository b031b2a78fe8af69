//! Model response validation - business capability layer
//!
//! Turns the raw text the model returns into a typed [`GeneratedPaper`],
//! rejecting anything that does not match the expected shape. Checks
//! are purely structural: question counts are not reconciled against
//! the requested distribution, the model's best effort is trusted.

use regex::Regex;
use serde_json::Value;

use crate::error::ResponseError;
use crate::models::paper::GeneratedPaper;

/// Fields every generated question must carry a non-empty value for.
const QUESTION_FIELDS: [&str; 4] = ["unit", "marks", "blooms_taxonomy_level", "question_text"];

/// Parses and shape-checks a raw model reply.
pub fn parse_model_response(response_text: &str) -> Result<GeneratedPaper, ResponseError> {
    if response_text.is_empty() {
        return Err(ResponseError::EmptyResponse);
    }

    let cleaned = strip_code_fences(response_text);
    if cleaned.is_empty() {
        return Err(ResponseError::EmptyAfterCleaning);
    }

    let parsed: Value =
        serde_json::from_str(&cleaned).map_err(|e| ResponseError::JsonParseFailed(e.to_string()))?;

    validate_shape(&parsed)?;

    // Shape is verified, so the typed conversion only normalizes
    // number-or-string fields.
    serde_json::from_value(parsed).map_err(|e| ResponseError::JsonParseFailed(e.to_string()))
}

/// Removes every ```json / ``` marker. The model sometimes wraps its
/// output in a fenced block despite the JSON response mime type.
fn strip_code_fences(text: &str) -> String {
    match Regex::new(r"```json\n?|```") {
        Ok(re) => re.replace_all(text, "").trim().to_string(),
        Err(_) => text.trim().to_string(),
    }
}

fn validate_shape(parsed: &Value) -> Result<(), ResponseError> {
    // Arrays fall through to the sections check and fail there.
    if !parsed.is_object() && !parsed.is_array() {
        return Err(ResponseError::NotAnObject);
    }

    let sections = parsed
        .get("sections")
        .and_then(Value::as_array)
        .ok_or(ResponseError::SectionsNotArray)?;

    for section in sections {
        let name_present = !is_falsy(section.get("section_name"));
        let marks_numeric = section
            .get("marks_per_question")
            .map(Value::is_number)
            .unwrap_or(false);
        let questions = match section.get("questions").and_then(Value::as_array) {
            Some(questions) if name_present && marks_numeric => questions,
            _ => return Err(ResponseError::InvalidSection),
        };

        for question in questions {
            let complete = QUESTION_FIELDS
                .iter()
                .all(|field| !is_falsy(question.get(*field)));
            if !complete {
                return Err(ResponseError::InvalidQuestion);
            }
        }
    }

    Ok(())
}

// Missing-value test with loose-truthiness semantics: absent, null,
// false, empty string and numeric zero all count as missing.
fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Some(_) => false,
    }
}
