//! Gemini REST API client
//!
//! Wraps the two calls the generation pipeline needs: uploading a
//! staged document and generating content grounded on it. Speaks the
//! plain HTTP API via reqwest, no SDK.

use std::path::Path;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult, ModelError};

/// Opaque handle to a document the model service has accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub uri: String,
    pub mime_type: String,
}

/// Document-grounded generation capability.
///
/// The pipeline depends on exactly these two operations.
#[async_trait]
pub trait DocumentModel: Send + Sync {
    /// Pushes a staged file to the model service and returns an opaque
    /// reference for later generation calls.
    async fn upload_file(&self, path: &Path, mime_type: &str) -> AppResult<RemoteFile>;

    /// Generates content grounded on an uploaded document, returning
    /// the raw response text. Absent text comes back as "".
    async fn generate(
        &self,
        file: &RemoteFile,
        prompt: &str,
        response_schema: &Value,
    ) -> AppResult<String>;
}

/// Gemini API client
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model_name: String,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.gemini_api_base_url.trim_end_matches('/').to_string(),
            api_key: config.gemini_api_key.clone(),
            model_name: config.gemini_model_name.clone(),
        }
    }

    /// First candidate's text parts joined together, "" when absent.
    fn response_text(body: &Value) -> String {
        body.get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .and_then(|candidate| candidate.get("content"))
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl DocumentModel for GeminiClient {
    async fn upload_file(&self, path: &Path, mime_type: &str) -> AppResult<RemoteFile> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::staged_read_failed(path.display().to_string(), e))?;

        let endpoint = format!("{}/upload/v1beta/files", self.base_url);
        debug!("uploading {} bytes to {}", bytes.len(), endpoint);

        let response = self
            .http
            .post(format!("{}?key={}", endpoint, self.api_key))
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await
            .map_err(|e| AppError::model_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::BadStatus {
                endpoint,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::model_request_failed(&endpoint, e))?;

        let uri = match body
            .get("file")
            .and_then(|file| file.get("uri"))
            .and_then(Value::as_str)
        {
            Some(uri) => uri.to_string(),
            None => {
                return Err(ModelError::MalformedReply {
                    endpoint,
                    what: "file.uri",
                }
                .into())
            }
        };

        let mime_type = body
            .get("file")
            .and_then(|file| file.get("mimeType"))
            .and_then(Value::as_str)
            .unwrap_or(mime_type)
            .to_string();

        debug!("upload accepted: {}", uri);

        Ok(RemoteFile { uri, mime_type })
    }

    async fn generate(
        &self,
        file: &RemoteFile,
        prompt: &str,
        response_schema: &Value,
    ) -> AppResult<String> {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        );

        let request_body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "fileData": {
                            "fileUri": file.uri.as_str(),
                            "mimeType": file.mime_type.as_str()
                        }
                    },
                    { "text": prompt }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema
            }
        });

        debug!("calling {} ({} prompt chars)", endpoint, prompt.len());

        let response = self
            .http
            .post(format!("{}?key={}", endpoint, self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AppError::model_request_failed(&endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::BadStatus {
                endpoint,
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::model_request_failed(&endpoint, e))?;

        Ok(Self::response_text(&body))
    }
}
