use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use generate_paper::clients::{DocumentModel, GeminiClient, RemoteFile};
use generate_paper::error::ModelError;
use generate_paper::models::{load_all_request_files, FileUpload, FormFields};
use generate_paper::services::PaperStore;
use generate_paper::utils::logging;
use generate_paper::{AppResult, Config, GenerationFlow};

/// Stand-in model that replies with a fixed payload.
struct ScriptedModel {
    fail_upload: bool,
    reply: String,
}

#[async_trait]
impl DocumentModel for ScriptedModel {
    async fn upload_file(&self, path: &Path, mime_type: &str) -> AppResult<RemoteFile> {
        if self.fail_upload {
            return Err(ModelError::BadStatus {
                endpoint: "upload".to_string(),
                status: 503,
                body: "service unavailable".to_string(),
            }
            .into());
        }
        assert!(path.exists(), "staged file should exist during upload");
        Ok(RemoteFile {
            uri: "files/scripted".to_string(),
            mime_type: mime_type.to_string(),
        })
    }

    async fn generate(
        &self,
        _file: &RemoteFile,
        prompt: &str,
        response_schema: &Value,
    ) -> AppResult<String> {
        assert!(prompt.contains("expert academic curriculum designer"));
        assert!(response_schema.get("properties").is_some());
        Ok(self.reply.clone())
    }
}

fn test_config(tag: &str) -> Config {
    let scratch = std::env::temp_dir().join(format!(
        "pipeline-{}-{}",
        tag,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    Config {
        gemini_api_key: "test-key".to_string(),
        scratch_dir: scratch.to_string_lossy().to_string(),
        ..Config::default()
    }
}

fn valid_form() -> FormFields {
    FormFields::new()
        .with_file(
            "file",
            FileUpload::new("os-syllabus.pdf", "application/pdf", b"%PDF-1.4 stub".to_vec()),
        )
        .with_text("title", "Operating Systems Model Exam")
        .with_text("subtitle", "Semester IV")
        .with_text("date", "2025-11-20")
        .with_text("units", "5")
        .with_text("q2m", "2")
        .with_text("q8m", "1")
}

fn scripted_reply() -> String {
    serde_json::json!({
        "title": "Operating Systems Model Exam",
        "sections": [
            {
                "section_name": "Section A",
                "marks_per_question": 2,
                "questions": [
                    {
                        "unit": "Unit 1",
                        "marks": 2,
                        "blooms_taxonomy_level": "Remember",
                        "question_text": "Define a process control block."
                    },
                    {
                        "unit": "Unit 2",
                        "marks": "2",
                        "blooms_taxonomy_level": "Understand",
                        "question_text": "Explain the cost of a context switch."
                    }
                ]
            },
            {
                "section_name": "Section B",
                "marks_per_question": 8,
                "questions": [
                    {
                        "unit": "Unit 3",
                        "marks": 8,
                        "blooms_taxonomy_level": "Apply",
                        "question_text": "Design a scheduling policy for a mixed workload."
                    }
                ]
            }
        ]
    })
    .to_string()
}

fn scratch_is_empty(config: &Config) -> bool {
    match std::fs::read_dir(&config.scratch_dir) {
        Ok(entries) => entries.count() == 0,
        Err(_) => true,
    }
}

#[tokio::test]
async fn test_full_pipeline_produces_a_paper() {
    let config = test_config("success");
    let model = Arc::new(ScriptedModel {
        fail_upload: false,
        reply: scripted_reply(),
    });
    let flow = GenerationFlow::new(&config, model);

    let outcome = flow.run(valid_form(), 1).await;
    let paper = outcome.paper().expect("generation should succeed");

    assert_eq!(paper.sections.len(), 2);
    assert_eq!(paper.question_count(), 3);

    let first = &paper.sections[0];
    assert_eq!(first.section_name, "Section A");
    assert_eq!(first.marks_per_question, 2.0);
    assert_eq!(first.questions[0].unit, "Unit 1");
    assert_eq!(first.questions[1].marks, "2");
    assert_eq!(
        paper.sections[1].questions[0].question_text,
        "Design a scheduling policy for a mixed workload."
    );

    assert!(scratch_is_empty(&config), "staged upload should be removed");
    let _ = std::fs::remove_dir_all(&config.scratch_dir);
}

#[tokio::test]
async fn test_upload_failure_becomes_failure_outcome() {
    let config = test_config("upload-fail");
    let model = Arc::new(ScriptedModel {
        fail_upload: true,
        reply: String::new(),
    });
    let flow = GenerationFlow::new(&config, model);

    let outcome = flow.run(valid_form(), 1).await;
    let message = outcome.error_message().expect("outcome should be a failure");

    assert!(
        message.contains("model API returned status 503"),
        "unexpected message: {message}"
    );
    assert!(scratch_is_empty(&config), "staged upload should be removed");
    let _ = std::fs::remove_dir_all(&config.scratch_dir);
}

#[tokio::test]
async fn test_missing_api_key_failure_envelope() {
    let config = Config {
        gemini_api_key: String::new(),
        ..test_config("no-key")
    };
    let model = Arc::new(ScriptedModel {
        fail_upload: false,
        reply: scripted_reply(),
    });
    let flow = GenerationFlow::new(&config, model);

    let outcome = flow.run(valid_form(), 1).await;
    let envelope = serde_json::to_value(&outcome).unwrap();

    assert_eq!(envelope["success"], serde_json::json!(false));
    assert_eq!(
        envelope["error"],
        serde_json::json!("GEMINI_API_KEY environment variable is not configured")
    );
}

#[tokio::test]
async fn test_success_envelope_carries_the_paper() {
    let config = test_config("envelope");
    let model = Arc::new(ScriptedModel {
        fail_upload: false,
        reply: scripted_reply(),
    });
    let flow = GenerationFlow::new(&config, model);

    let outcome = flow.run(valid_form(), 1).await;
    let envelope = serde_json::to_value(&outcome).unwrap();

    assert_eq!(envelope["success"], serde_json::json!(true));
    assert_eq!(envelope["data"]["sections"].as_array().unwrap().len(), 2);
    assert_eq!(
        envelope["data"]["sections"][0]["questions"][0]["question_text"],
        serde_json::json!("Define a process control block.")
    );

    let _ = std::fs::remove_dir_all(&config.scratch_dir);
}

#[tokio::test]
#[ignore] // needs a live API key, run manually: cargo test -- --ignored
async fn test_live_generation_from_requests_folder() {
    logging::init();
    let config = Config::from_env();

    let requests = load_all_request_files(&config.requests_folder)
        .await
        .expect("request folder should load");
    let spec = requests.first().expect("requests folder is empty");
    let fields = spec
        .to_form_fields()
        .await
        .expect("request PDF should be readable");

    let model: Arc<dyn DocumentModel> = Arc::new(GeminiClient::new(&config));
    let flow = GenerationFlow::new(&config, model);

    let outcome = flow.run(fields, 1).await;
    println!(
        "outcome: {}",
        serde_json::to_string(&outcome).unwrap_or_default()
    );
    assert!(outcome.is_success(), "live generation should succeed");
}

#[tokio::test]
#[ignore] // needs live Supabase credentials
async fn test_live_history() {
    logging::init();
    let config = Config::from_env();

    let store = PaperStore::from_config(&config).expect("Supabase credentials should be set");
    let papers = store.history().await.expect("history fetch should succeed");
    println!("found {} stored paper(s)", papers.len());
}
