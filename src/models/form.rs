use std::collections::HashMap;

/// An uploaded file as it arrives in a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Client-supplied file name
    pub name: String,
    /// Declared media type, e.g. "application/pdf"
    pub mime_type: String,
    /// Raw file bytes
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A single form field value, either text or an uploaded file.
#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File(FileUpload),
}

/// Loosely typed multipart form data.
///
/// Shaped like the submission it models: a field may be absent, hold
/// text, or hold a file, and the accessors return `None` whenever the
/// kind does not match. Validation decides what that means.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    values: HashMap<String, FormValue>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), FormValue::Text(value.into()));
    }

    pub fn set_file(&mut self, name: impl Into<String>, file: FileUpload) {
        self.values.insert(name.into(), FormValue::File(file));
    }

    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_text(name, value);
        self
    }

    pub fn with_file(mut self, name: impl Into<String>, file: FileUpload) -> Self {
        self.set_file(name, file);
        self
    }

    /// Text value of a field, `None` when absent or file-typed.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(FormValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// File value of a field, `None` when absent or text-typed.
    pub fn file(&self, name: &str) -> Option<&FileUpload> {
        match self.values.get(name) {
            Some(FormValue::File(file)) => Some(file),
            _ => None,
        }
    }

    /// Removes and returns a file field, leaving text values untouched.
    pub fn take_file(&mut self, name: &str) -> Option<FileUpload> {
        match self.values.remove(name) {
            Some(FormValue::File(file)) => Some(file),
            Some(other) => {
                self.values.insert(name.to_string(), other);
                None
            }
            None => None,
        }
    }
}
