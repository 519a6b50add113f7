use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::error::CentersError;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self { role: "system".to_string(), content: content.to_string() }
    }

    pub fn user(content: &str) -> Self {
        Self { role: "user".to_string(), content: content.to_string() }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_base: &str, api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Single chat completion; returns the first choice's content verbatim.
    /// No choices, or a first choice without content, is `EmptyChoices`.
    #[instrument(skip(self, messages), fields(model = %self.model))]
    pub async fn complete(&self, messages: &[ChatMessage], max_tokens: u32) -> Result<String, CentersError> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.api_base))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(%status, %body, "OpenAI API request failed");
            return Err(CentersError::Provider { status: status.as_u16(), body });
        }

        let chat_response: ChatResponse = response.json().await?;
        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or(CentersError::EmptyChoices)?
            .message
            .content
            .ok_or(CentersError::EmptyChoices)?;
        debug!(len = content.len(), "Received OpenAI completion");
        Ok(content)
    }
}
