//! Prompt construction - business capability layer
//!
//! Renders a validated request into the instruction text and the
//! response schema sent to the model. Everything here is a pure
//! function of its arguments, so the exact wording is pinned by tests.

use serde_json::{json, Value};

use crate::models::request::MarkDistribution;

/// Renders the distribution as a comma-joined clause, e.g.
/// "3 questions of 2 marks, 2 questions of 4 marks".
///
/// Zero-count classes are omitted and "question" stays singular for a
/// count of one. The fallback phrase only shows up for an all-zero
/// distribution, which validation already rules out.
pub fn build_mark_distribution(distribution: &MarkDistribution) -> String {
    let mut parts = Vec::new();
    for (weight, count) in distribution.by_weight() {
        if count > 0 {
            let plural = if count != 1 { "s" } else { "" };
            parts.push(format!("{} question{} of {} marks", count, plural, weight));
        }
    }

    if parts.is_empty() {
        "No questions specified".to_string()
    } else {
        parts.join(", ")
    }
}

/// Composes the full instruction text for the model.
pub fn build_prompt(
    title: &str,
    subtitle: Option<&str>,
    date: &str,
    units: u32,
    mark_distribution: &str,
) -> String {
    let subtitle_text = subtitle
        .map(|s| format!("\n- Subtitle: {}", s))
        .unwrap_or_default();

    format!(
        "You are an expert academic curriculum designer. \
         Generate a formal university exam paper based STRICTLY on the uploaded syllabus or document. \
         Do not use external knowledge. \
         Exam Metadata:\
         Title: {}{}\
         Date: {}\
         Total Units to Cover: {}\
         Required Distribution: {}\
         Strict Constraints:\
         Grounding: Every question must be directly answerable using ONLY the provided text.\
         Unit Mapping: Identify the {} units by analyzing the document's chapters, modules, or major headings. \
         Distribute the generated questions evenly across these identified units.\
         Cognitive Alignment: Map Bloom's Taxonomy to the mark weight. \
         Low-mark questions must target 'Remember' or 'Understand'. \
         High-mark questions must target 'Analyze', 'Evaluate', or 'Create'.\
         Mathematical Accuracy: You MUST generate the exact quantity of questions requested for each mark category.\
         Output Format: Group questions into Sections based on their mark value.",
        title, subtitle_text, date, units, mark_distribution, units
    )
}

/// The structural contract the model's reply must satisfy, attached to
/// the generation call as a response schema.
pub fn response_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "sections": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "section_name": { "type": "string" },
                        "marks_per_question": { "type": "number" },
                        "questions": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "unit": { "type": "string" },
                                    "marks": { "type": "string" },
                                    "blooms_taxonomy_level": { "type": "string" },
                                    "question_text": { "type": "string" }
                                },
                                "required": ["unit", "marks", "blooms_taxonomy_level", "question_text"]
                            }
                        }
                    },
                    "required": ["section_name", "marks_per_question", "questions"]
                }
            }
        },
        "required": ["sections"]
    })
}
