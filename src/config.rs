use std::env;

use crate::constants;
use crate::error::ConfigError;

/// Runtime settings. The two provider keys are required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub openai_api_key: String,
    pub openai_api_base: String,
    pub openai_model: String,
    pub centers_max_tokens: u32,
    pub geolocation_url: String,
    pub templates_dir: String,
    pub static_dir: String,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up a .env file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(|name| env::var(name).ok())
    }

    pub fn load<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = required(&lookup, "GEMINI_API_KEY", "Gemini_key")?;
        let openai_api_key = required(&lookup, "OPENAI_API_KEY", "OpenAI_Api_Key")?;

        Ok(Self {
            gemini_api_key,
            gemini_api_base: constants::GEMINI_API_BASE.clone(),
            gemini_model: constants::GEMINI_MODEL.clone(),
            openai_api_key,
            openai_api_base: constants::OPENAI_API_BASE.clone(),
            openai_model: constants::OPENAI_MODEL.clone(),
            centers_max_tokens: constants::CENTERS_MAX_TOKENS,
            geolocation_url: constants::GEOLOCATION_URL.clone(),
            templates_dir: constants::TEMPLATES_DIR.clone(),
            static_dir: constants::STATIC_DIR.clone(),
        })
    }
}

fn required<F>(lookup: &F, name: &'static str, alias: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .or_else(|| lookup(alias))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingKey { name, alias })
}
