use crate::error::ConfigError;

/// Runtime configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of papers generated concurrently
    pub max_concurrent_papers: usize,
    /// Folder scanned for request TOML files
    pub requests_folder: String,
    /// Folder receiving exported Word files
    pub exports_folder: String,
    /// Directory where uploads are staged before transmission
    pub scratch_dir: String,
    /// Whether to log generated question text in full
    pub verbose_logging: bool,
    /// Output log file
    pub output_log_file: String,
    // --- Gemini API ---
    pub gemini_api_key: String,
    pub gemini_api_base_url: String,
    pub gemini_model_name: String,
    // --- Supabase persistence ---
    pub supabase_url: String,
    pub supabase_service_key: String,
    /// Teacher account that owns saved papers
    pub teacher_id: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_papers: 4,
            requests_folder: "requests".to_string(),
            exports_folder: "exports".to_string(),
            scratch_dir: std::env::temp_dir().to_string_lossy().to_string(),
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            gemini_api_key: String::new(),
            gemini_api_base_url: "https://generativelanguage.googleapis.com".to_string(),
            gemini_model_name: "gemini-2.5-flash".to_string(),
            supabase_url: String::new(),
            supabase_service_key: String::new(),
            teacher_id: String::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_papers: std::env::var("MAX_CONCURRENT_PAPERS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_concurrent_papers),
            requests_folder: std::env::var("REQUESTS_FOLDER").unwrap_or(default.requests_folder),
            exports_folder: std::env::var("EXPORTS_FOLDER").unwrap_or(default.exports_folder),
            scratch_dir: std::env::var("SCRATCH_DIR").unwrap_or(default.scratch_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            gemini_api_key: std::env::var("GEMINI_API_KEY").unwrap_or(default.gemini_api_key),
            gemini_api_base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(default.gemini_api_base_url),
            gemini_model_name: std::env::var("GEMINI_MODEL_NAME").unwrap_or(default.gemini_model_name),
            supabase_url: std::env::var("SUPABASE_URL").unwrap_or(default.supabase_url),
            supabase_service_key: std::env::var("SUPABASE_SERVICE_ROLE_KEY").unwrap_or(default.supabase_service_key),
            teacher_id: std::env::var("TEACHER_ID").unwrap_or(default.teacher_id),
        }
    }

    /// Checks the settings generation cannot run without.
    ///
    /// Persistence settings are not part of this check; without them
    /// the app runs in export-only mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gemini_api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(())
    }

    /// True when all Supabase settings needed for saving papers are present.
    pub fn persistence_configured(&self) -> bool {
        !self.supabase_url.trim().is_empty()
            && !self.supabase_service_key.trim().is_empty()
            && !self.teacher_id.trim().is_empty()
    }
}
