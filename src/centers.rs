use tracing::{info, warn};

use crate::error::CentersError;
use crate::location::LocationInput;
use crate::openai::{ChatMessage, OpenAIClient};
use crate::prompts::{centers_request, CENTERS_SYSTEM_PROMPT};

/// Asks the chat-completion model for recycling centers near a location.
#[derive(Clone)]
pub struct RecyclingCenterFinder {
    client: OpenAIClient,
    max_tokens: u32,
}

impl RecyclingCenterFinder {
    pub fn new(client: OpenAIClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }

    /// Total version: any failure becomes display text.
    pub async fn find_centers(&self, city: &str, state: &str, postcode: &str) -> String {
        self.lookup(&LocationInput::new(city, state, postcode))
            .await
            .unwrap_or_else(|e| e.user_message())
    }

    pub async fn lookup(&self, location: &LocationInput) -> Result<String, CentersError> {
        if !location.is_complete() {
            return Err(CentersError::MissingFields);
        }

        info!(city = %location.city, state = %location.state, postcode = %location.postcode, "Looking up recycling centers");
        let messages = [
            ChatMessage::system(CENTERS_SYSTEM_PROMPT),
            ChatMessage::user(&centers_request(&location.city, &location.state, &location.postcode)),
        ];

        self.client
            .complete(&messages, self.max_tokens)
            .await
            .inspect_err(|e| warn!(kind = ?e.kind(), error = %e, "Recycling center lookup failed"))
    }
}

/// Line shown above a successful listing.
pub fn listing_preamble(location: &LocationInput) -> String {
    format!(
        "Based on your location in {}, {}, {}, here are some local recycling centers you might consider:",
        location.city, location.state, location.postcode
    )
}
