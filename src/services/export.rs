//! Paper rendering and Word export
//!
//! Renders papers into printable HTML and wraps the result in the
//! namespaced envelope Microsoft Word accepts as a `.doc` file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use tracing::debug;

use crate::models::{GeneratedPaper, PaperContent, PaperRecord, QuestionRow};
use crate::services::paper_store::flatten_rows;

const WORD_HEADER: &str = "<html xmlns:o='urn:schemas-microsoft-com:office:office' xmlns:w='urn:schemas-microsoft-com:office:word' xmlns='http://www.w3.org/TR/REC-html40'><head><meta charset='utf-8'></head><body>";
const WORD_FOOTER: &str = "</body></html>";

/// Renders a paper body into printable HTML.
///
/// Sectioned papers keep their section names and number their questions
/// globally across sections. Flat question lists are regrouped by mark
/// value. Manually authored papers pass their stored HTML through
/// unchanged.
pub fn render_paper_html(
    title: &str,
    subtitle: Option<&str>,
    date: &str,
    total_marks: u64,
    content: &PaperContent,
) -> String {
    match content {
        PaperContent::Html(html) => html.clone(),
        PaperContent::Sectioned(paper) => sectioned_html(title, subtitle, date, total_marks, paper),
        PaperContent::Flat(_) => {
            let rows = flatten_rows("", content);
            grouped_html(title, subtitle, total_marks, &rows)
        }
    }
}

/// Renders a stored paper row, preferring its saved HTML body.
pub fn render_record_html(record: &PaperRecord) -> String {
    if let Some(html) = &record.content_html {
        return html.clone();
    }
    grouped_html(
        &record.title,
        record.subtitle.as_deref(),
        record.total_marks,
        &record.questions,
    )
}

/// Wraps rendered HTML in the Word document envelope.
///
/// The leading byte-order mark makes Word decode the file as UTF-8.
pub fn word_document(html: &str) -> String {
    format!("\u{feff}{}{}{}", WORD_HEADER, html, WORD_FOOTER)
}

/// Download file name: every non-alphanumeric character becomes an
/// underscore, the rest is lowercased, `.doc` appended.
pub fn export_file_name(title: &str) -> String {
    let sanitized = if let Ok(re) = Regex::new(r"[^a-zA-Z0-9]") {
        re.replace_all(title, "_").to_string()
    } else {
        title.to_string()
    };
    format!("{}.doc", sanitized.to_lowercase())
}

/// Writes one rendered paper as a `.doc` file into the exports folder.
///
/// # Returns
/// The path of the written file.
pub async fn export_to_word(dir: &Path, title: &str, html: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create exports folder: {}", dir.display()))?;

    let path = dir.join(export_file_name(title));
    tokio::fs::write(&path, word_document(html))
        .await
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    debug!("export written to {}", path.display());
    Ok(path)
}

// ========== HTML builders ==========

fn header_html(title: &str, subtitle: Option<&str>) -> String {
    let mut html = format!("<h1 style=\"text-align:center\">{}</h1>", title);
    if let Some(subtitle) = subtitle {
        if !subtitle.is_empty() {
            html.push_str(&format!(
                "<h2 style=\"text-align:center\">{}</h2>",
                subtitle
            ));
        }
    }
    html
}

fn sectioned_html(
    title: &str,
    subtitle: Option<&str>,
    date: &str,
    total_marks: u64,
    paper: &GeneratedPaper,
) -> String {
    let mut html = header_html(title, subtitle);
    html.push_str(&format!("<p>Date: {}</p>", date));
    html.push_str(&format!("<p>Total Marks: {}</p>", total_marks));

    // question numbers run on across section boundaries
    let mut number = 0;
    for section in &paper.sections {
        html.push_str(&format!("<h2>{}</h2>", section.section_name));
        for question in &section.questions {
            number += 1;
            html.push_str(&format!("<p>{}. {}</p>", number, question.question_text));
            html.push_str(&format!(
                "<p><strong>Unit:</strong> {} | <strong>Marks:</strong> {} | <strong>Bloom's Level:</strong> {}</p>",
                question.unit, question.marks, question.blooms_taxonomy_level
            ));
        }
    }
    html
}

fn grouped_html(
    title: &str,
    subtitle: Option<&str>,
    total_marks: u64,
    rows: &[QuestionRow],
) -> String {
    let mut groups: BTreeMap<u32, Vec<&QuestionRow>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.marks).or_default().push(row);
    }

    let mut html = header_html(title, subtitle);
    html.push_str(&format!("<p>Total Marks: {}</p>", total_marks));

    for (marks, questions) in &groups {
        html.push_str(&format!("<h3>Section ({} Marks)</h3><ul>", marks));
        for question in questions {
            html.push_str(&format!("<li>{}</li>", question.question_text));
        }
        html.push_str("</ul>");
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Question, Section};
    use tokio_test::assert_ok;

    fn sample_paper() -> GeneratedPaper {
        GeneratedPaper {
            sections: vec![
                Section {
                    section_name: "Section A (2 Marks Each)".to_string(),
                    marks_per_question: 2.0,
                    questions: vec![
                        Question {
                            unit: "1".to_string(),
                            marks: "2".to_string(),
                            blooms_taxonomy_level: "Remember".to_string(),
                            question_text: "Define a process.".to_string(),
                        },
                        Question {
                            unit: "2".to_string(),
                            marks: "2".to_string(),
                            blooms_taxonomy_level: "Understand".to_string(),
                            question_text: "Explain context switching.".to_string(),
                        },
                    ],
                },
                Section {
                    section_name: "Section B (16 Marks Each)".to_string(),
                    marks_per_question: 16.0,
                    questions: vec![Question {
                        unit: "4".to_string(),
                        marks: "16".to_string(),
                        blooms_taxonomy_level: "Create".to_string(),
                        question_text: "Design a fair scheduler.".to_string(),
                    }],
                },
            ],
        }
    }

    #[test]
    fn test_sectioned_html_numbers_questions_globally() {
        let html = render_paper_html(
            "OS Final",
            Some("Semester IV"),
            "2025-05-20",
            20,
            &PaperContent::Sectioned(sample_paper()),
        );

        assert!(html.contains("<h1 style=\"text-align:center\">OS Final</h1>"));
        assert!(html.contains("Semester IV"));
        assert!(html.contains("<p>Date: 2025-05-20</p>"));
        assert!(html.contains("<p>Total Marks: 20</p>"));
        assert!(html.contains("<h2>Section A (2 Marks Each)</h2>"));
        assert!(html.contains("<p>1. Define a process.</p>"));
        assert!(html.contains("<p>2. Explain context switching.</p>"));
        // numbering continues into the second section
        assert!(html.contains("<p>3. Design a fair scheduler.</p>"));
        assert!(html.contains(
            "<strong>Unit:</strong> 4 | <strong>Marks:</strong> 16 | <strong>Bloom's Level:</strong> Create"
        ));
    }

    #[test]
    fn test_flat_questions_group_by_ascending_marks() {
        let questions = vec![
            Question {
                unit: "3".to_string(),
                marks: "16".to_string(),
                blooms_taxonomy_level: "Evaluate".to_string(),
                question_text: "Critique the design.".to_string(),
            },
            Question {
                unit: "1".to_string(),
                marks: "2".to_string(),
                blooms_taxonomy_level: "Remember".to_string(),
                question_text: "List the states.".to_string(),
            },
        ];
        let html = render_paper_html("Quiz", None, "", 18, &PaperContent::Flat(questions));

        let low = html.find("Section (2 Marks)").unwrap();
        let high = html.find("Section (16 Marks)").unwrap();
        assert!(low < high);
        assert!(html.contains("<li>List the states.</li>"));
        assert!(html.contains("<li>Critique the design.</li>"));
        assert!(html.contains("<p>Total Marks: 18</p>"));
        assert!(!html.contains("Date:"));
    }

    #[test]
    fn test_manual_html_passes_through() {
        let html = render_paper_html(
            "Anything",
            None,
            "2025-01-01",
            10,
            &PaperContent::Html("<h1>My Quiz</h1><p>Q1</p>".to_string()),
        );
        assert_eq!(html, "<h1>My Quiz</h1><p>Q1</p>");
    }

    #[test]
    fn test_record_prefers_stored_html() {
        let record = PaperRecord {
            id: "1".to_string(),
            teacher_id: "t-1".to_string(),
            title: "Stored".to_string(),
            subtitle: None,
            total_marks: 10,
            created_at: "2025-05-20T00:00:00+00:00".to_string(),
            content_html: Some("<p>saved body</p>".to_string()),
            questions: vec![],
        };
        assert_eq!(render_record_html(&record), "<p>saved body</p>");
    }

    #[test]
    fn test_record_without_html_groups_rows() {
        let record = PaperRecord {
            id: "2".to_string(),
            teacher_id: "t-1".to_string(),
            title: "Rows".to_string(),
            subtitle: Some("Makeup".to_string()),
            total_marks: 4,
            created_at: "2025-05-20T00:00:00+00:00".to_string(),
            content_html: None,
            questions: vec![QuestionRow {
                paper_id: "2".to_string(),
                unit_number: 1,
                marks: 4,
                blooms_level: "Apply".to_string(),
                question_text: "Apply the formula.".to_string(),
            }],
        };
        let html = render_record_html(&record);
        assert!(html.contains("Makeup"));
        assert!(html.contains("<h3>Section (4 Marks)</h3>"));
        assert!(html.contains("<li>Apply the formula.</li>"));
    }

    #[test]
    fn test_word_document_envelope() {
        let doc = word_document("<p>hi</p>");
        assert!(doc.starts_with('\u{feff}'));
        assert!(doc.contains("xmlns:w='urn:schemas-microsoft-com:office:word'"));
        assert!(doc.contains("<body><p>hi</p></body></html>"));
    }

    #[test]
    fn test_export_file_name_sanitization() {
        assert_eq!(export_file_name("CS101 Final Exam!"), "cs101_final_exam_.doc");
        assert_eq!(export_file_name("Paper"), "paper.doc");
        assert_eq!(export_file_name("a/b\\c"), "a_b_c.doc");
    }

    #[tokio::test]
    async fn test_export_writes_doc_file() {
        let dir = std::env::temp_dir().join(format!(
            "paper-exports-{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));

        let path = assert_ok!(export_to_word(&dir, "My Paper", "<p>body</p>").await);
        assert_eq!(path.file_name().unwrap().to_string_lossy(), "my_paper.doc");

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(written.starts_with('\u{feff}'));
        assert!(written.contains("<p>body</p>"));

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
