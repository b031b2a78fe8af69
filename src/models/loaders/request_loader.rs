use crate::models::form::{FileUpload, FormFields};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Question counts as written in a request file.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DistributionSpec {
    #[serde(default)]
    pub q2m: i64,
    #[serde(default)]
    pub q4m: i64,
    #[serde(default)]
    pub q8m: i64,
    #[serde(default)]
    pub q16m: i64,
}

/// One paper generation request loaded from a TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestSpec {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub date: String,
    pub units: i64,
    /// Syllabus PDF path, relative to the request file
    pub pdf: String,
    #[serde(default)]
    pub distribution: DistributionSpec,
    #[serde(skip)]
    pub file_path: Option<String>,
}

impl RequestSpec {
    /// Sum of marks across the requested distribution, in u64 so large
    /// counts cannot wrap. Counts outside the range form validation
    /// accepts contribute nothing.
    pub fn total_marks(&self) -> u64 {
        let d = &self.distribution;
        [(2u64, d.q2m), (4, d.q4m), (8, d.q8m), (16, d.q16m)]
            .iter()
            .map(|(weight, count)| weight * u64::from(u32::try_from(*count).unwrap_or(0)))
            .sum()
    }

    /// Reads the referenced PDF and lays the request out as form fields.
    ///
    /// Every value goes through the same validation path a live
    /// submission would, so a bad request file is reported with the
    /// same messages.
    pub async fn to_form_fields(&self) -> Result<FormFields> {
        let pdf_path = self.resolve(&self.pdf);
        let bytes = fs::read(&pdf_path)
            .await
            .with_context(|| format!("failed to read PDF file: {}", pdf_path.display()))?;

        let file_name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.pdf.clone());
        let mime_type = if file_name.to_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "application/octet-stream"
        };

        let mut fields = FormFields::new()
            .with_file("file", FileUpload::new(file_name, mime_type, bytes))
            .with_text("title", self.title.as_str())
            .with_text("date", self.date.as_str())
            .with_text("units", self.units.to_string())
            .with_text("q2m", self.distribution.q2m.to_string())
            .with_text("q4m", self.distribution.q4m.to_string())
            .with_text("q8m", self.distribution.q8m.to_string())
            .with_text("q16m", self.distribution.q16m.to_string());
        if let Some(subtitle) = &self.subtitle {
            fields.set_text("subtitle", subtitle.as_str());
        }
        Ok(fields)
    }

    /// Resolves a path from the request file against its folder.
    fn resolve(&self, relative: &str) -> PathBuf {
        let candidate = Path::new(relative);
        if candidate.is_absolute() {
            return candidate.to_path_buf();
        }
        match self.file_path.as_deref().and_then(|p| Path::new(p).parent()) {
            Some(base) => base.join(candidate),
            None => candidate.to_path_buf(),
        }
    }
}

/// A hand-written paper loaded from a TOML file.
///
/// Points at an HTML body authored elsewhere, which is saved as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct ManualSpec {
    pub title: String,
    pub total_marks: u64,
    /// HTML body path, relative to the TOML file
    pub html: String,
    #[serde(skip)]
    pub file_path: Option<String>,
}

impl ManualSpec {
    pub async fn read_html(&self) -> Result<String> {
        let html_path = match self.file_path.as_deref().and_then(|p| Path::new(p).parent()) {
            Some(base) if !Path::new(&self.html).is_absolute() => base.join(&self.html),
            _ => PathBuf::from(&self.html),
        };
        fs::read_to_string(&html_path)
            .await
            .with_context(|| format!("failed to read HTML file: {}", html_path.display()))
    }
}

/// Loads a single request TOML file.
pub async fn load_request_file(path: &Path) -> Result<RequestSpec> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read request file: {}", path.display()))?;

    let mut spec: RequestSpec = toml::from_str(&content)
        .with_context(|| format!("failed to parse request file: {}", path.display()))?;

    spec.file_path = Some(path.to_string_lossy().to_string());

    Ok(spec)
}

/// Loads every .toml request in a folder, skipping files that fail to parse.
pub async fn load_all_request_files(folder_path: &str) -> Result<Vec<RequestSpec>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("requests folder does not exist: {}", folder_path);
    }

    let mut specs = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("failed to read requests folder: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            tracing::info!(
                "loading request: {}",
                path.file_name().unwrap_or_default().to_string_lossy()
            );

            match load_request_file(&path).await {
                Ok(spec) => specs.push(spec),
                Err(e) => {
                    tracing::warn!("failed to load {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(specs)
}

/// Loads a manual paper TOML file.
pub async fn load_manual_file(path: &Path) -> Result<ManualSpec> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read manual paper file: {}", path.display()))?;

    let mut spec: ManualSpec = toml::from_str(&content)
        .with_context(|| format!("failed to parse manual paper file: {}", path.display()))?;

    spec.file_path = Some(path.to_string_lossy().to_string());

    Ok(spec)
}
