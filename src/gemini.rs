use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::error::InferenceError;

// Structures matching the Gemini REST API (v1beta files + generateContent)

#[derive(Deserialize, Debug)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    pub uri: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Serialize, Debug)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Debug)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Part {
    Text { text: String },
    FileData { file_data: FileData },
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn file(file: &UploadedFile, mime_type: &str) -> Self {
        Part::FileData {
            file_data: FileData {
                mime_type: mime_type.to_string(),
                file_uri: file.uri.clone(),
            },
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Deserialize, Debug)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
pub struct CandidatePart {
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateResponse {
    /// Trimmed text of the first candidate's first part.
    pub fn first_text(&self) -> Result<String, InferenceError> {
        let candidate = self.candidates.first().ok_or(InferenceError::NoCandidates)?;
        let text = candidate
            .content
            .as_ref()
            .and_then(|content| content.parts.first())
            .and_then(|part| part.text.as_deref())
            .ok_or(InferenceError::NoCandidates)?;
        Ok(text.trim().to_string())
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Uploads raw image bytes to the provider's file store.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
    ) -> Result<UploadedFile, InferenceError> {
        let url = format!("{}/upload/v1beta/files", self.api_base);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("X-Goog-Upload-Protocol", "raw")
            .header("Content-Type", mime_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Gemini file upload failed");
            return Err(InferenceError::Provider { status: status.as_u16(), body });
        }

        let uploaded = response.json::<UploadResponse>().await?;
        debug!(name = %uploaded.file.name, "Uploaded image to Gemini");
        Ok(uploaded.file)
    }

    #[instrument(skip(self, parts), fields(model = %self.model, parts = parts.len()))]
    pub async fn generate_content(&self, parts: Vec<Part>) -> Result<GenerateResponse, InferenceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        );

        let request_payload = GenerateRequest {
            contents: vec![Content { role: "user", parts }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(%status, %body, "Gemini generateContent failed");
            return Err(InferenceError::Provider { status: status.as_u16(), body });
        }

        let generated = response.json::<GenerateResponse>().await?;
        debug!(candidates = generated.candidates.len(), "Received Gemini response");
        Ok(generated)
    }
}
