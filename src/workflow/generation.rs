//! Paper generation flow - workflow layer
//!
//! Defines the complete processing of one generation request:
//! 1. validate the form fields into a typed request
//! 2. stage the uploaded document in scratch storage
//! 3. upload the staged file to the model boundary
//! 4. build the prompt and request the paper
//! 5. parse and validate the reply
//!
//! Whatever happens after staging, the staged file is removed exactly
//! once before the outcome is returned.

use std::sync::Arc;

use tracing::{info, warn};

use crate::clients::DocumentModel;
use crate::config::Config;
use crate::error::{AppError, AppResult, ConfigError};
use crate::infrastructure::{ScratchStore, StagedFile};
use crate::models::{
    FormFields, GeneratedPaper, GenerationOutcome, GenerationRequest, PDF_MIME_TYPE,
};
use crate::services::prompt_builder::{build_mark_distribution, build_prompt, response_schema};
use crate::services::response_parser::parse_model_response;
use crate::utils::logging;

/// Fallback wording for errors that carry no message of their own
const UNKNOWN_ERROR: &str = "An unknown error occurred while generating the paper";

/// Paper generation flow
///
/// - orchestrates one request from raw form fields to an outcome
/// - owns no scarce resources, only capabilities
/// - never panics on bad input, every problem folds into the outcome
pub struct GenerationFlow {
    model: Arc<dyn DocumentModel>,
    scratch: ScratchStore,
    api_key_present: bool,
    verbose_logging: bool,
}

impl GenerationFlow {
    /// Creates a flow over the given model boundary.
    pub fn new(config: &Config, model: Arc<dyn DocumentModel>) -> Self {
        Self {
            model,
            scratch: ScratchStore::new(&config.scratch_dir),
            api_key_present: !config.gemini_api_key.trim().is_empty(),
            verbose_logging: config.verbose_logging,
        }
    }

    /// Runs one request end to end.
    ///
    /// Never returns an error: every failure is folded into the outcome
    /// so one bad request cannot abort a batch.
    pub async fn run(&self, fields: FormFields, paper_index: usize) -> GenerationOutcome {
        // ========== step 1: validate the form ==========
        let request = match GenerationRequest::from_form(fields) {
            Ok(request) => request,
            Err(e) => {
                warn!("[paper {}] ⚠️ invalid request: {}", paper_index, e);
                return GenerationOutcome::Failure(e.to_string());
            }
        };
        self.log_request(paper_index, &request);

        // the key is checked per request so a misconfigured environment
        // surfaces as a normal failure outcome
        if !self.api_key_present {
            let message = ConfigError::MissingApiKey.to_string();
            warn!("[paper {}] ⚠️ {}", paper_index, message);
            return GenerationOutcome::Failure(message);
        }

        // ========== step 2: stage the upload ==========
        let staged = match self
            .scratch
            .stage(&request.file.name, &request.file.bytes)
            .await
        {
            Ok(staged) => staged,
            Err(e) => {
                warn!("[paper {}] ⚠️ staging failed: {}", paper_index, e);
                return GenerationOutcome::Failure(failure_message(&e));
            }
        };

        // ========== steps 3-5: model round trip ==========
        let result = self.generate(&request, &staged, paper_index).await;

        // the staged upload is removed exactly once, success or not
        staged.discard().await;

        match result {
            Ok(paper) => {
                info!(
                    "[paper {}] ✅ paper generated: {} sections, {} questions",
                    paper_index,
                    paper.sections.len(),
                    paper.question_count()
                );
                GenerationOutcome::Success(paper)
            }
            Err(e) => {
                let message = failure_message(&e);
                // status bodies can be huge, keep the console line short
                warn!(
                    "[paper {}] ⚠️ generation failed: {}",
                    paper_index,
                    logging::truncate_text(&message, 200)
                );
                GenerationOutcome::Failure(message)
            }
        }
    }

    /// Uploads the staged document and asks the model for the paper.
    async fn generate(
        &self,
        request: &GenerationRequest,
        staged: &StagedFile,
        paper_index: usize,
    ) -> AppResult<GeneratedPaper> {
        info!(
            "[paper {}] 📤 uploading document to the model service...",
            paper_index
        );
        let remote = self.model.upload_file(staged.path(), PDF_MIME_TYPE).await?;

        info!("[paper {}] 🤖 requesting the exam paper...", paper_index);
        let clause = build_mark_distribution(&request.distribution);
        let prompt = build_prompt(
            &request.title,
            request.subtitle.as_deref(),
            &request.date,
            request.units,
            &clause,
        );
        let raw = self
            .model
            .generate(&remote, &prompt, &response_schema())
            .await?;

        let paper = parse_model_response(&raw)?;

        if self.verbose_logging {
            self.log_sections(paper_index, &paper);
        }

        Ok(paper)
    }

    // ========== log helpers ==========

    fn log_request(&self, paper_index: usize, request: &GenerationRequest) {
        info!(
            "[paper {}] ✓ request valid: \"{}\" ({} questions, {} marks total)",
            paper_index,
            request.title,
            request.distribution.total_questions(),
            request.distribution.total_marks()
        );
    }

    fn log_sections(&self, paper_index: usize, paper: &GeneratedPaper) {
        for section in &paper.sections {
            info!(
                "[paper {}]   {} - {} questions",
                paper_index,
                section.section_name,
                section.questions.len()
            );
        }
    }
}

/// Failure text for the outcome envelope. Errors without a message of
/// their own fall back to a fixed phrase.
fn failure_message(error: &AppError) -> String {
    let message = error.to_string();
    if message.is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}
