use serde::{Deserialize, Serialize};

/// A single generated exam question.
///
/// `unit` and `marks` are kept as text. The response schema asks the
/// model for strings but numbers show up anyway, so both are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    #[serde(deserialize_with = "deserialize_label")]
    pub unit: String,
    #[serde(deserialize_with = "deserialize_label")]
    pub marks: String,
    pub blooms_taxonomy_level: String,
    pub question_text: String,
}

/// One titled group of equally weighted questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub section_name: String,
    pub marks_per_question: f64,
    pub questions: Vec<Question>,
}

/// The structured paper a validated model response parses into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPaper {
    pub sections: Vec<Section>,
}

impl GeneratedPaper {
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }
}

/// Terminal result of one generation attempt.
///
/// Serializes to the envelope callers consume:
/// `{"success":true,"data":{...}}` or `{"success":false,"error":"..."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Success(GeneratedPaper),
    Failure(String),
}

impl GenerationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Success(_))
    }

    pub fn paper(&self) -> Option<&GeneratedPaper> {
        match self {
            GenerationOutcome::Success(paper) => Some(paper),
            GenerationOutcome::Failure(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            GenerationOutcome::Success(_) => None,
            GenerationOutcome::Failure(message) => Some(message),
        }
    }
}

impl Serialize for GenerationOutcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        match self {
            GenerationOutcome::Success(paper) => {
                let mut state = serializer.serialize_struct("GenerationOutcome", 2)?;
                state.serialize_field("success", &true)?;
                state.serialize_field("data", paper)?;
                state.end()
            }
            GenerationOutcome::Failure(message) => {
                let mut state = serializer.serialize_struct("GenerationOutcome", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", message)?;
                state.end()
            }
        }
    }
}

/// Paper body handed to persistence.
///
/// Generated papers carry sections, quick saves carry a flat question
/// list, manually authored papers carry raw editor HTML.
#[derive(Debug, Clone, PartialEq)]
pub enum PaperContent {
    Sectioned(GeneratedPaper),
    Flat(Vec<Question>),
    Html(String),
}

/// One row of the questions table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRow {
    #[serde(deserialize_with = "deserialize_label")]
    pub paper_id: String,
    pub unit_number: u32,
    pub marks: u32,
    pub blooms_level: String,
    pub question_text: String,
}

/// One row of the papers table, with its questions when selected.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaperRecord {
    #[serde(deserialize_with = "deserialize_label")]
    pub id: String,
    pub teacher_id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub total_marks: u64,
    pub created_at: String,
    #[serde(default)]
    pub content_html: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionRow>,
}

// Accepts a string or a number and keeps it as text. Database ids and
// model-emitted labels both come through here.
fn deserialize_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct LabelVisitor;

    impl<'de> Visitor<'de> for LabelVisitor {
        type Value = String;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(LabelVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_accepts_numeric_unit_and_marks() {
        let question: Question = serde_json::from_value(json!({
            "unit": 3,
            "marks": "16",
            "blooms_taxonomy_level": "Analyze",
            "question_text": "Compare paging and segmentation."
        }))
        .unwrap();
        assert_eq!(question.unit, "3");
        assert_eq!(question.marks, "16");
    }

    #[test]
    fn test_success_outcome_envelope() {
        let paper = GeneratedPaper {
            sections: vec![Section {
                section_name: "Section A".to_string(),
                marks_per_question: 2.0,
                questions: vec![],
            }],
        };
        let value = serde_json::to_value(GenerationOutcome::Success(paper)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "data": { "sections": [
                    { "section_name": "Section A", "marks_per_question": 2.0, "questions": [] }
                ]}
            })
        );
    }

    #[test]
    fn test_failure_outcome_envelope() {
        let value =
            serde_json::to_value(GenerationOutcome::Failure("Date is required".to_string()))
                .unwrap();
        assert_eq!(value, json!({ "success": false, "error": "Date is required" }));
    }

    #[test]
    fn test_paper_record_accepts_numeric_id() {
        let record: PaperRecord = serde_json::from_value(json!({
            "id": 42,
            "teacher_id": "t-1",
            "title": "CS101 Final",
            "total_marks": 60,
            "created_at": "2025-05-20T10:30:00+00:00",
            "questions": [{
                "paper_id": 42,
                "unit_number": 1,
                "marks": 2,
                "blooms_level": "Remember",
                "question_text": "Define a process."
            }]
        }))
        .unwrap();
        assert_eq!(record.id, "42");
        assert_eq!(record.questions.len(), 1);
        assert_eq!(record.questions[0].paper_id, "42");
        assert!(record.content_html.is_none());
    }
}
