// Endpoint and model defaults, overridable from the environment (or a .env file).

use std::env;
use std::time::Duration;

lazy_static::lazy_static! {
    pub static ref GEMINI_API_BASE: String = env::var("GEMINI_API_BASE").unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
    pub static ref GEMINI_MODEL: String = env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
    pub static ref OPENAI_API_BASE: String = env::var("OPENAI_API_BASE").unwrap_or_else(|_| "https://api.openai.com".to_string());
    pub static ref OPENAI_MODEL: String = env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()); // Or "gpt-3.5-turbo"
    pub static ref GEOLOCATION_URL: String = env::var("GEOLOCATION_URL").unwrap_or_else(|_| "https://ipinfo.io/json".to_string());
    pub static ref TEMPLATES_DIR: String = env::var("WASTEWISE_TEMPLATES_DIR").unwrap_or_else(|_| "templates".to_string());
    pub static ref STATIC_DIR: String = env::var("WASTEWISE_STATIC_DIR").unwrap_or_else(|_| "static".to_string());
}

/// Upper bound on the recycling-center listing length.
pub const CENTERS_MAX_TOKENS: u32 = 500;

/// Canned queries behind the quick-action buttons, in display order.
pub const QUICK_QUERIES: [&str; 3] = [
    "What can I recycle?",
    "How do I sort my waste?",
    "Nearest recycling center",
];

/// Sessions untouched for this long are dropped when the next session is created.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
