use crate::error::FormError;
use crate::models::form::{FileUpload, FormFields};

/// Upload size ceiling in bytes
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Media type syllabus uploads are transmitted with
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Question-count form fields paired with their mark weight, in the
/// order they are validated and rendered
pub const MARK_FIELDS: [(&str, u32); 4] = [("q2m", 2), ("q4m", 4), ("q8m", 8), ("q16m", 16)];

/// How many questions to generate at each mark weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkDistribution {
    pub two_mark: u32,
    pub four_mark: u32,
    pub eight_mark: u32,
    pub sixteen_mark: u32,
}

impl MarkDistribution {
    /// Counts paired with their mark weight, lowest weight first.
    pub fn by_weight(&self) -> [(u32, u32); 4] {
        [
            (2, self.two_mark),
            (4, self.four_mark),
            (8, self.eight_mark),
            (16, self.sixteen_mark),
        ]
    }

    pub fn total_questions(&self) -> u64 {
        self.by_weight().iter().map(|(_, count)| u64::from(*count)).sum()
    }

    /// Totals widen to u64; a single count may legally be as large as
    /// `u32::MAX`, which already pushes `16 * count` past 32 bits.
    pub fn total_marks(&self) -> u64 {
        self.by_weight()
            .iter()
            .map(|(weight, count)| u64::from(*weight) * u64::from(*count))
            .sum()
    }
}

/// A fully validated paper generation request.
///
/// Built once per submission by [`GenerationRequest::from_form`] and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub file: FileUpload,
    pub title: String,
    pub subtitle: Option<String>,
    pub date: String,
    pub units: u32,
    pub distribution: MarkDistribution,
}

impl GenerationRequest {
    /// Validates raw form fields into a typed request.
    ///
    /// Checks run in a fixed order and the first violation wins, so a
    /// submission with several problems reports the earliest one.
    pub fn from_form(mut fields: FormFields) -> Result<Self, FormError> {
        let file = fields.take_file("file").ok_or(FormError::MissingFile)?;
        let title = required_text(&fields, "title").ok_or(FormError::MissingTitle)?;
        let date = required_text(&fields, "date").ok_or(FormError::MissingDate)?;

        let units = fields
            .text("units")
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|n| *n > 0)
            .ok_or(FormError::InvalidUnits)?;

        if file.mime_type != PDF_MIME_TYPE && !file.name.to_lowercase().ends_with(".pdf") {
            return Err(FormError::NotAPdf);
        }

        if file.size() > MAX_FILE_SIZE {
            return Err(FormError::FileTooLarge {
                limit_mb: MAX_FILE_SIZE / 1024 / 1024,
            });
        }

        let mut counts = [0u32; 4];
        for (slot, (field, _)) in counts.iter_mut().zip(MARK_FIELDS) {
            *slot = parse_question_count(fields.text(field), field)?;
        }
        let distribution = MarkDistribution {
            two_mark: counts[0],
            four_mark: counts[1],
            eight_mark: counts[2],
            sixteen_mark: counts[3],
        };

        if distribution.total_questions() == 0 {
            return Err(FormError::NoQuestionsRequested);
        }

        let subtitle = fields
            .text("subtitle")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            file,
            title,
            subtitle,
            date,
            units,
            distribution,
        })
    }
}

fn required_text(fields: &FormFields, name: &str) -> Option<String> {
    fields
        .text(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Absent or blank counts default to zero, anything else must parse as
/// a non-negative integer. Parsing straight into u32 rejects values
/// past `u32::MAX` instead of wrapping them.
fn parse_question_count(value: Option<&str>, field: &'static str) -> Result<u32, FormError> {
    let raw = match value {
        Some(raw) => raw.trim(),
        None => return Ok(0),
    };
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>()
        .map_err(|_| FormError::InvalidQuestionCount { field })
}
