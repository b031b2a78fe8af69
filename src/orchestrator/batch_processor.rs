//! Batch paper processor - orchestration layer
//!
//! ## Responsibilities
//!
//! This module is the entry point of the application: it owns the
//! lifecycle, loads work, and drives the generation flow.
//!
//! ## Core functions
//!
//! 1. **Initialization**: run log, model client, flow, optional paper store
//! 2. **Batch loading**: scan the requests folder for TOML request files
//! 3. **Concurrency control**: a Semaphore caps parallel generations
//! 4. **Batched processing**: one batch finishes before the next starts
//! 5. **Result handling**: save finished papers, export them to Word
//! 6. **Global statistics**: aggregate success and failure counts
//!
//! ## Design notes
//!
//! - **Top-level orchestration**: per-request details live in the workflow
//! - **Degraded mode**: without database credentials papers are only exported
//! - **Downward delegation**: orchestrator → workflow → services

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::clients::{DocumentModel, GeminiClient};
use crate::config::Config;
use crate::models::{
    load_all_request_files, load_manual_file, GenerationOutcome, PaperContent, RequestSpec,
};
use crate::services::{export_to_word, render_paper_html, render_record_html, PaperStore};
use crate::utils::logging;
use crate::workflow::GenerationFlow;

/// Application main structure
pub struct App {
    config: Config,
    flow: Arc<GenerationFlow>,
    store: Option<Arc<PaperStore>>,
}

impl App {
    /// Initializes the application.
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file)?;

        log_startup(&config);

        if let Err(e) = config.validate() {
            warn!("⚠️ {} - generation requests will fail", e);
        }

        let model: Arc<dyn DocumentModel> = Arc::new(GeminiClient::new(&config));
        let flow = Arc::new(GenerationFlow::new(&config, model));

        let store = match PaperStore::from_config(&config) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!("⚠️ {} - papers will not be saved", e);
                None
            }
        };

        Ok(Self {
            config,
            flow,
            store,
        })
    }

    /// Runs the batch generation mode.
    pub async fn run(&self) -> Result<()> {
        let requests = self.load_requests().await?;

        if requests.is_empty() {
            warn!("⚠️ no request files found, nothing to do");
            return Ok(());
        }

        let total = requests.len();
        log_requests_loaded(total, self.config.max_concurrent_papers);

        let stats = self.process_all_requests(requests).await?;

        print_final_stats(&stats, &self.config);

        Ok(())
    }

    /// Prints every stored paper of the configured teacher.
    pub async fn show_history(&self) -> Result<()> {
        let store = self.require_store()?;
        let papers = store.history().await?;

        if papers.is_empty() {
            info!("no stored papers found");
            return Ok(());
        }

        info!("📚 {} stored paper(s):", papers.len());
        for paper in &papers {
            info!(
                "  [{}] \"{}\" - {} marks, {} questions, created {}",
                paper.id,
                paper.title,
                paper.total_marks,
                paper.questions.len(),
                paper.created_at
            );
        }
        Ok(())
    }

    /// Renders one stored paper and writes it as a Word file.
    pub async fn export_stored(&self, paper_id: &str) -> Result<()> {
        let store = self.require_store()?;
        let papers = store.history().await?;
        let record = papers
            .iter()
            .find(|p| p.id == paper_id)
            .with_context(|| format!("no stored paper with id {}", paper_id))?;

        let html = render_record_html(record);
        let path =
            export_to_word(Path::new(&self.config.exports_folder), &record.title, &html).await?;

        info!("📄 exported paper {} to {}", paper_id, path.display());
        Ok(())
    }

    /// Deletes one stored paper.
    pub async fn delete_stored(&self, paper_id: &str) -> Result<()> {
        let store = self.require_store()?;
        store.delete_paper(paper_id).await?;

        info!("🗑️ deleted paper {}", paper_id);
        Ok(())
    }

    /// Saves a hand-written paper described by a manual TOML file.
    pub async fn save_manual(&self, path: &str) -> Result<()> {
        let store = self.require_store()?;
        let spec = load_manual_file(Path::new(path)).await?;
        let html = spec.read_html().await?;

        let content = PaperContent::Html(html);
        let paper_id = store
            .save_paper(&spec.title, spec.total_marks, &content)
            .await?;

        info!(
            "💾 saved manual paper \"{}\" as paper {}",
            spec.title, paper_id
        );
        Ok(())
    }

    fn require_store(&self) -> Result<&Arc<PaperStore>> {
        self.store
            .as_ref()
            .context("Missing Supabase environment variables")
    }

    /// Loads the request files.
    async fn load_requests(&self) -> Result<Vec<RequestSpec>> {
        info!("\n📁 scanning for request files...");
        load_all_request_files(&self.config.requests_folder).await
    }

    /// Processes every request in bounded batches.
    async fn process_all_requests(&self, requests: Vec<RequestSpec>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_papers));
        let total = requests.len();
        let mut stats = ProcessingStats {
            total,
            ..Default::default()
        };

        for batch_start in (0..total).step_by(self.config.max_concurrent_papers) {
            let batch_end = (batch_start + self.config.max_concurrent_papers).min(total);
            let batch = &requests[batch_start..batch_end];
            let batch_num = (batch_start / self.config.max_concurrent_papers) + 1;
            let total_batches = (total + self.config.max_concurrent_papers - 1)
                / self.config.max_concurrent_papers;

            log_batch_start(batch_num, total_batches, batch_start + 1, batch_end, total);

            let batch_result = self
                .process_batch(batch, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(batch_num, &batch_result);
        }

        Ok(stats)
    }

    /// Processes one batch concurrently.
    async fn process_batch(
        &self,
        batch: &[RequestSpec],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut handles = Vec::new();

        for (idx, spec) in batch.iter().enumerate() {
            let paper_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;

            let flow = self.flow.clone();
            let store = self.store.clone();
            let exports_folder = self.config.exports_folder.clone();
            let log_file = self.config.output_log_file.clone();
            let spec = spec.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                process_request(flow, store, &exports_folder, &log_file, spec, paper_index).await
            });
            handles.push((paper_index, handle));
        }

        let mut result = BatchResult::default();

        for (paper_index, handle) in handles {
            match handle.await {
                Ok(true) => result.success += 1,
                Ok(false) => result.failed += 1,
                Err(e) => {
                    error!("[paper {}] ❌ task failed: {}", paper_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// Processes one request: generate, save, export.
///
/// # Returns
/// Whether the request made it all the way to an exported file.
async fn process_request(
    flow: Arc<GenerationFlow>,
    store: Option<Arc<PaperStore>>,
    exports_folder: &str,
    log_file: &str,
    spec: RequestSpec,
    paper_index: usize,
) -> bool {
    info!("\n[paper {}] {}", paper_index, "─".repeat(30));
    info!("[paper {}] 📝 processing \"{}\"", paper_index, spec.title);

    let fields = match spec.to_form_fields().await {
        Ok(fields) => fields,
        Err(e) => {
            error!("[paper {}] ❌ cannot prepare request: {:#}", paper_index, e);
            return false;
        }
    };

    let outcome = flow.run(fields, paper_index).await;
    log_outcome(log_file, &spec.title, &outcome);

    let paper = match outcome {
        GenerationOutcome::Success(paper) => paper,
        GenerationOutcome::Failure(_) => {
            error!("[paper {}] ❌ \"{}\" failed", paper_index, spec.title);
            return false;
        }
    };

    let total_marks = spec.total_marks();
    let content = PaperContent::Sectioned(paper);

    if let Some(store) = &store {
        match store.save_paper(&spec.title, total_marks, &content).await {
            Ok(paper_id) => info!("[paper {}] 💾 saved as paper {}", paper_index, paper_id),
            Err(e) => warn!("[paper {}] ⚠️ save failed: {}", paper_index, e),
        }
    }

    let html = render_paper_html(
        &spec.title,
        spec.subtitle.as_deref(),
        &spec.date,
        total_marks,
        &content,
    );
    match export_to_word(Path::new(exports_folder), &spec.title, &html).await {
        Ok(path) => {
            info!("[paper {}] 📄 exported to {}", paper_index, path.display());
            true
        }
        Err(e) => {
            error!("[paper {}] ❌ export failed: {:#}", paper_index, e);
            false
        }
    }
}

/// Appends the outcome envelope to the run log.
fn log_outcome(log_file: &str, title: &str, outcome: &GenerationOutcome) {
    if let Ok(envelope) = serde_json::to_string(outcome) {
        if let Err(e) = logging::append_line(log_file, &format!("{}: {}", title, envelope)) {
            warn!("failed to append run log: {}", e);
        }
    }
}

/// Run statistics
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// One batch's result
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

// ========== log helpers ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 exam paper generator - batch mode");
    info!("📊 max concurrent papers: {}", config.max_concurrent_papers);
    info!("📁 requests folder: {}", config.requests_folder);
    info!("{}", "=".repeat(60));
}

fn log_requests_loaded(total: usize, max_concurrent: usize) {
    info!("✓ found {} request file(s)", total);
    info!("📋 processing in batches of {}\n", max_concurrent);
}

fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 batch {}/{}", batch_num, total_batches);
    info!("📄 papers {}-{} of {}", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, result: &BatchResult) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ batch {} complete: {}/{} succeeded",
        batch_num,
        result.success,
        result.success + result.failed
    );
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &ProcessingStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 run complete");
    info!(
        "finished at: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ succeeded: {}/{}", stats.success, stats.total);
    info!("❌ failed: {}", stats.failed);
    info!("{}", "=".repeat(60));
    info!("\nrun log saved to: {}", config.output_log_file);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_without_persistence_credentials() {
        let log = std::env::temp_dir().join(format!(
            "run-log-{}.txt",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let config = Config {
            output_log_file: log.to_string_lossy().to_string(),
            gemini_api_key: "test-key".to_string(),
            ..Config::default()
        };

        let app = App::initialize(config).await.unwrap();
        assert!(app.store.is_none());
        assert!(log.exists());

        let _ = std::fs::remove_file(&log);
    }
}
