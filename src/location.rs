use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::LocationError;

pub const UNKNOWN_CITY: &str = "Unknown City";
pub const UNKNOWN_STATE: &str = "Unknown State";
pub const UNKNOWN_POSTCODE: &str = "Unknown Postcode";

/// Where the recycling-center search should look. Always defined; fields may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInput {
    pub city: String,
    pub state: String,
    pub postcode: String,
}

impl LocationInput {
    pub fn new(city: impl Into<String>, state: impl Into<String>, postcode: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            postcode: postcode.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.city.is_empty() && !self.state.is_empty() && !self.postcode.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    #[default]
    Manual,
    Automatic,
}

// ipinfo-style payload; every field is optional.
#[derive(Deserialize, Debug, Default)]
struct GeoResponse {
    city: Option<String>,
    region: Option<String>,
    postal: Option<String>,
}

impl From<GeoResponse> for LocationInput {
    fn from(geo: GeoResponse) -> Self {
        LocationInput {
            city: geo.city.unwrap_or_else(|| UNKNOWN_CITY.to_string()),
            state: geo.region.unwrap_or_else(|| UNKNOWN_STATE.to_string()),
            postcode: geo.postal.unwrap_or_else(|| UNKNOWN_POSTCODE.to_string()),
        }
    }
}

/// IP-based location lookup. One request per call, no retries.
#[derive(Clone)]
pub struct LocationResolver {
    client: Client,
    lookup_url: String,
}

impl LocationResolver {
    pub fn new(lookup_url: &str) -> Self {
        Self {
            client: Client::new(),
            lookup_url: lookup_url.to_string(),
        }
    }

    #[instrument(skip(self), fields(url = %self.lookup_url))]
    pub async fn detect(&self) -> Result<LocationInput, LocationError> {
        let response = self.client.get(&self.lookup_url).send().await?;

        if !response.status().is_success() {
            return Err(LocationError::Provider {
                status: response.status().as_u16(),
            });
        }

        let location = LocationInput::from(response.json::<GeoResponse>().await?);
        info!(city = %location.city, state = %location.state, "Detected location");
        Ok(location)
    }
}
