pub mod centers;
pub mod chat;
pub mod config;
pub mod constants;
pub mod error;
pub mod gemini;
pub mod greeting;
pub mod inference;
pub mod location;
pub mod openai;
pub mod prompts;
pub mod session;
pub mod web_server;

pub use chat::Assistant;
pub use config::Config;
pub use session::{ChatSession, ChatTurn, Speaker};
