//! Paper persistence service
//!
//! Saves, lists and deletes exam papers through the database client.
//! Every operation is scoped to the configured teacher identity and the
//! failure wording of the original actions is preserved verbatim.

use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use crate::clients::SupabaseClient;
use crate::config::Config;
use crate::error::{AppResult, ConfigError, DbError};
use crate::models::{GeneratedPaper, PaperContent, PaperRecord, Question, QuestionRow};

/// Paper persistence service
pub struct PaperStore {
    client: SupabaseClient,
    teacher_id: String,
}

impl PaperStore {
    /// Creates a store from configuration.
    ///
    /// Fails when the database URL or service key is absent so the
    /// caller can decide to keep running without persistence.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        if !config.persistence_configured() {
            return Err(ConfigError::MissingSupabaseCredentials);
        }
        Ok(Self {
            client: SupabaseClient::new(config),
            teacher_id: config.teacher_id.clone(),
        })
    }

    /// Saves one paper and its flattened question rows.
    ///
    /// Manually authored papers keep their HTML body on the paper row
    /// and produce no question rows. The other shapes are flattened into
    /// one row per question under the freshly inserted paper id.
    ///
    /// # Returns
    /// The id of the stored paper row.
    pub async fn save_paper(
        &self,
        title: &str,
        total_marks: u64,
        content: &PaperContent,
    ) -> AppResult<String> {
        let mut row = json!({
            "teacher_id": self.teacher_id,
            "title": title,
            "total_marks": total_marks,
        });
        if let PaperContent::Html(html) = content {
            row["content_html"] = Value::String(html.clone());
        }

        let stored = self
            .client
            .insert_returning("papers", &row)
            .await
            .map_err(|e| DbError::InsertPaperFailed(db_message(e)))?;
        let paper_id = id_text(&stored);
        debug!("paper row stored with id {}", paper_id);

        let rows = flatten_rows(&paper_id, content);
        if !rows.is_empty() {
            self.client
                .insert("questions", &json!(rows))
                .await
                .map_err(|e| DbError::InsertQuestionsFailed(db_message(e)))?;
            debug!("{} question rows stored", rows.len());
        }

        Ok(paper_id)
    }

    /// Lists every paper of the configured teacher, newest first, with
    /// its question rows embedded.
    pub async fn history(&self) -> AppResult<Vec<PaperRecord>> {
        let teacher_filter = format!("eq.{}", self.teacher_id);
        let body = self
            .client
            .select(
                "papers",
                &[
                    ("select", "*,questions(*)"),
                    ("teacher_id", teacher_filter.as_str()),
                    ("order", "created_at.desc"),
                ],
            )
            .await
            .map_err(|e| DbError::FetchPapersFailed(db_message(e)))?;

        let papers: Vec<PaperRecord> =
            serde_json::from_value(body).map_err(|e| DbError::FetchPapersFailed(e.to_string()))?;
        Ok(papers)
    }

    /// Deletes one paper by id, scoped to the configured teacher.
    ///
    /// The store cascades the delete to the paper's question rows.
    pub async fn delete_paper(&self, paper_id: &str) -> AppResult<()> {
        let id_filter = format!("eq.{}", paper_id);
        let teacher_filter = format!("eq.{}", self.teacher_id);
        self.client
            .delete(
                "papers",
                &[
                    ("id", id_filter.as_str()),
                    ("teacher_id", teacher_filter.as_str()),
                ],
            )
            .await
            .map_err(|e| DbError::DeletePaperFailed(db_message(e)))?;

        Ok(())
    }
}

// ========== row flattening ==========

/// Flattens a paper body into question rows for the given paper id.
///
/// Sectioned and flat payloads yield one row per question, manual HTML
/// papers yield none.
pub fn flatten_rows(paper_id: &str, content: &PaperContent) -> Vec<QuestionRow> {
    match content {
        PaperContent::Sectioned(paper) => sectioned_rows(paper_id, paper),
        PaperContent::Flat(questions) => question_rows(paper_id, questions),
        PaperContent::Html(_) => Vec::new(),
    }
}

fn sectioned_rows(paper_id: &str, paper: &GeneratedPaper) -> Vec<QuestionRow> {
    paper
        .sections
        .iter()
        .flat_map(|section| question_rows(paper_id, &section.questions))
        .collect()
}

fn question_rows(paper_id: &str, questions: &[Question]) -> Vec<QuestionRow> {
    questions
        .iter()
        .map(|question| QuestionRow {
            paper_id: paper_id.to_string(),
            unit_number: unit_number(&question.unit),
            marks: lenient_marks(&question.marks),
            blooms_level: question.blooms_taxonomy_level.clone(),
            question_text: question.question_text.clone(),
        })
        .collect()
}

/// First run of decimal digits anywhere in the unit label, else 0.
fn unit_number(unit: &str) -> u32 {
    if let Ok(re) = Regex::new(r"\d+") {
        if let Some(found) = re.find(unit) {
            return found.as_str().parse().unwrap_or(0);
        }
    }
    0
}

/// Leading decimal digits of the trimmed marks label, else 0.
fn lenient_marks(marks: &str) -> u32 {
    let digits: String = marks
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

// ========== helpers ==========

// The id column type differs between deployments, so the stored id is
// read as a string or a number and kept as text.
fn id_text(row: &Value) -> String {
    match row.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(id)) => id.to_string(),
        _ => String::new(),
    }
}

/// Bare driver message embedded into the action-level wording.
fn db_message(error: DbError) -> String {
    match error {
        DbError::BadStatus { message, .. } => message,
        DbError::RequestFailed { source, .. } => source.to_string(),
        DbError::DecodeFailed { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
