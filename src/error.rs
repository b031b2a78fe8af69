use thiserror::Error;

/// Top-level application error.
///
/// Every pipeline stage reports through one of the domain-specific
/// error kinds below. The wrapper is transparent so that the message a
/// stage produces is exactly the message the caller sees.
#[derive(Debug, Error)]
pub enum AppError {
    /// Startup configuration problems
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Form field validation failures
    #[error(transparent)]
    Form(#[from] FormError),
    /// Scratch file staging failures
    #[error(transparent)]
    Scratch(#[from] ScratchError),
    /// Model API boundary failures
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Model response validation failures
    #[error(transparent)]
    Response(#[from] ResponseError),
    /// Database persistence failures
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Startup configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The model API key is absent, generation cannot run
    #[error("GEMINI_API_KEY environment variable is not configured")]
    MissingApiKey,
    /// Persistence credentials are absent
    #[error("Missing Supabase environment variables")]
    MissingSupabaseCredentials,
}

/// Validation errors for an incoming generation form.
///
/// Display strings double as the user-facing failure messages, so they
/// are written as full sentences rather than debug text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    /// No file part was supplied
    #[error("PDF file is required")]
    MissingFile,
    /// Title field absent or blank
    #[error("Title is required")]
    MissingTitle,
    /// Date field absent or blank
    #[error("Date is required")]
    MissingDate,
    /// Units field absent, unparseable or not positive
    #[error("Units must be a positive integer")]
    InvalidUnits,
    /// Supplied file is neither PDF-typed nor .pdf-named
    #[error("File must be a PDF")]
    NotAPdf,
    /// Supplied file is larger than the upload ceiling
    #[error("File size exceeds maximum allowed size of {limit_mb}MB")]
    FileTooLarge { limit_mb: u64 },
    /// A question-count field failed to parse as a non-negative integer
    #[error("{field} must be a non-negative integer")]
    InvalidQuestionCount { field: &'static str },
    /// All question counts were zero
    #[error("At least one question type must be specified")]
    NoQuestionsRequested,
}

/// Scratch file staging errors.
#[derive(Debug, Error)]
pub enum ScratchError {
    /// Creating the scratch directory failed
    #[error("failed to create scratch directory {path}: {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Writing the staged upload failed
    #[error("failed to stage file at {path}: {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Reading a staged file back failed
    #[error("failed to read staged file {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Model API boundary errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The HTTP request itself failed
    #[error("model request failed ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The API answered with a non-success status
    #[error("model API returned status {status} ({endpoint}): {body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// The API answered 2xx but the payload lacks a required field
    #[error("model API response is missing {what} ({endpoint})")]
    MalformedReply {
        endpoint: String,
        what: &'static str,
    },
}

/// Model response validation errors.
///
/// Display strings double as the user-facing failure messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    /// The model returned no text at all
    #[error("Empty or invalid response from AI model")]
    EmptyResponse,
    /// Nothing remained once code fences were stripped
    #[error("Empty response after cleaning")]
    EmptyAfterCleaning,
    /// The cleaned text is not valid JSON
    #[error("Failed to parse JSON response: {0}")]
    JsonParseFailed(String),
    /// Parsed payload is not a JSON object
    #[error("Invalid response format: expected an object")]
    NotAnObject,
    /// The sections member is absent or not an array
    #[error("Invalid response format: sections must be an array")]
    SectionsNotArray,
    /// A section lacks one of its required members
    #[error("Invalid section format: missing required fields")]
    InvalidSection,
    /// A question lacks one of its required members
    #[error("Invalid question format: missing required fields")]
    InvalidQuestion,
}

/// Database persistence errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The HTTP request itself failed
    #[error("database request failed ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// The REST endpoint answered with a non-success status
    #[error("database returned status {status} ({endpoint}): {message}")]
    BadStatus {
        endpoint: String,
        status: u16,
        message: String,
    },
    /// The response body could not be decoded
    #[error("database response could not be decoded ({endpoint}): {source}")]
    DecodeFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// Inserting the paper row failed
    #[error("Failed to insert paper: {0}")]
    InsertPaperFailed(String),
    /// Inserting the question rows failed
    #[error("Failed to insert questions: {0}")]
    InsertQuestionsFailed(String),
    /// Fetching the paper history failed
    #[error("Failed to fetch papers: {0}")]
    FetchPapersFailed(String),
    /// Deleting a paper failed
    #[error("Failed to delete paper: {0}")]
    DeletePaperFailed(String),
}

// ========== convenience constructors ==========

impl AppError {
    /// Model HTTP request error
    pub fn model_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Model(ModelError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// Scratch write error
    pub fn stage_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Scratch(ScratchError::WriteFailed {
            path: path.into(),
            source,
        })
    }

    /// Staged file read error
    pub fn staged_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::Scratch(ScratchError::ReadFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result type alias ==========

/// Application result type
pub type AppResult<T> = Result<T, AppError>;
