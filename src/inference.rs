use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::InferenceError;
use crate::gemini::{GeminiClient, Part};
use crate::prompts::{IMAGE_INSTRUCTION, PART_SEPARATOR, TEXT_INSTRUCTION};

/// Image types the multimodal model accepts from the upload control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    /// Fallback when a browser sends no content type: look at the file name.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageMime::Jpeg),
            "png" => Some(ImageMime::Png),
            _ => None,
        }
    }
}

impl FromStr for ImageMime {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image/jpeg" => Ok(ImageMime::Jpeg),
            "image/png" => Ok(ImageMime::Png),
            other => Err(InferenceError::UnsupportedMediaType(other.to_string())),
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user submission, decided once at the input boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceRequest {
    Text { text: String },
    Image { bytes: Vec<u8>, mime_type: String },
}

impl InferenceRequest {
    /// An uploaded image wins over typed text; neither yields `None`.
    pub fn from_input(text: Option<String>, image: Option<(Vec<u8>, String)>) -> Option<Self> {
        if let Some((bytes, mime_type)) = image {
            return Some(InferenceRequest::Image { bytes, mime_type });
        }
        text.filter(|t| !t.trim().is_empty())
            .map(|text| InferenceRequest::Text { text })
    }
}

/// Front door to the multimodal model. The `String`-returning operations never fail;
/// `respond` keeps the structured error for callers that want it.
#[derive(Clone)]
pub struct InferenceGateway {
    client: GeminiClient,
}

impl InferenceGateway {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    pub async fn classify_image(&self, bytes: Vec<u8>, mime_type: &str) -> String {
        self.respond(InferenceRequest::Image {
            bytes,
            mime_type: mime_type.to_string(),
        })
        .await
        .unwrap_or_else(|e| e.user_message())
    }

    pub async fn answer_text(&self, query: &str) -> String {
        self.respond(InferenceRequest::Text {
            text: query.to_string(),
        })
        .await
        .unwrap_or_else(|e| e.user_message())
    }

    pub async fn respond(&self, request: InferenceRequest) -> Result<String, InferenceError> {
        let result = match request {
            InferenceRequest::Image { bytes, mime_type } => {
                let mime: ImageMime = mime_type.parse()?;
                info!(%mime, len = bytes.len(), "Classifying uploaded image");
                let file = self.client.upload_file(bytes, mime.as_str()).await?;
                let parts = vec![
                    Part::file(&file, mime.as_str()),
                    Part::text(PART_SEPARATOR),
                    Part::text(IMAGE_INSTRUCTION),
                ];
                self.client.generate_content(parts).await
            }
            InferenceRequest::Text { text } => {
                info!(len = text.len(), "Answering text query");
                let parts = vec![
                    Part::text(text),
                    Part::text(PART_SEPARATOR),
                    Part::text(TEXT_INSTRUCTION),
                ];
                self.client.generate_content(parts).await
            }
        };

        let text = result.and_then(|response| response.first_text());
        if let Err(e) = &text {
            warn!(kind = ?e.kind(), error = %e, "Inference request failed");
        }
        text
    }
}
