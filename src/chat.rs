// Session-level actions shared by the web UI and the terminal chat.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use crate::centers::{listing_preamble, RecyclingCenterFinder};
use crate::config::Config;
use crate::constants::QUICK_QUERIES;
use crate::error::CentersError;
use crate::gemini::GeminiClient;
use crate::greeting;
use crate::inference::{ImageMime, InferenceGateway, InferenceRequest};
use crate::location::{LocationInput, LocationMode, LocationResolver};
use crate::openai::OpenAIClient;
use crate::session::{ChatSession, ChatTurn, Notice, Speaker};

pub const EMPTY_SUBMISSION_MESSAGE: &str = "Please upload an image or enter a question.";
pub const IMAGE_TURN_TEXT: &str = "Uploaded an image";

/// A file picked in the upload control, before its type has been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

impl ImageUpload {
    /// Declared content type, or one guessed from the file name when the client sent none.
    pub fn mime_type(&self) -> String {
        match self.content_type.as_deref() {
            Some(ct) if !ct.is_empty() && ct != "application/octet-stream" => ct.to_string(),
            _ => self
                .file_name
                .as_deref()
                .and_then(ImageMime::from_file_name)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string()),
        }
    }
}

/// The three remote collaborators, wired once at startup and shared by every session.
#[derive(Clone)]
pub struct Assistant {
    gateway: InferenceGateway,
    finder: RecyclingCenterFinder,
    locator: LocationResolver,
}

impl Assistant {
    pub fn new(gateway: InferenceGateway, finder: RecyclingCenterFinder, locator: LocationResolver) -> Self {
        Self { gateway, finder, locator }
    }

    pub fn from_config(config: &Config) -> Self {
        let gemini = GeminiClient::new(&config.gemini_api_base, &config.gemini_api_key, &config.gemini_model);
        let openai = OpenAIClient::new(&config.openai_api_base, &config.openai_api_key, &config.openai_model);
        Self::new(
            InferenceGateway::new(gemini),
            RecyclingCenterFinder::new(openai, config.centers_max_tokens),
            LocationResolver::new(&config.geolocation_url),
        )
    }

    pub fn gateway(&self) -> &InferenceGateway {
        &self.gateway
    }

    pub fn finder(&self) -> &RecyclingCenterFinder {
        &self.finder
    }

    /// Send control: an image wins over text; an empty form only raises a warning.
    pub async fn submit(&self, session: &mut ChatSession, text: Option<String>, upload: Option<ImageUpload>) {
        let image = upload.map(|u| {
            let mime = u.mime_type();
            (u.bytes, mime)
        });

        match InferenceRequest::from_input(text, image) {
            Some(InferenceRequest::Image { bytes, mime_type }) => {
                let reply = self.gateway.classify_image(bytes, &mime_type).await;
                session.record_exchange(ChatTurn::new(Speaker::UserImage, IMAGE_TURN_TEXT), reply);
            }
            Some(InferenceRequest::Text { text }) => self.ask(session, &text).await,
            None => session.notify_pane(Notice::warning(EMPTY_SUBMISSION_MESSAGE)),
        }
    }

    pub async fn ask(&self, session: &mut ChatSession, query: &str) {
        let reply = self.gateway.answer_text(query).await;
        session.record_exchange(ChatTurn::new(Speaker::User, query), reply);
    }

    /// Runs quick action `index`. Returns false for an index with no button.
    pub async fn quick_action(&self, session: &mut ChatSession, index: usize) -> bool {
        match QUICK_QUERIES.get(index) {
            Some(query) => {
                info!(index, query, "Quick action");
                self.ask(session, query).await;
                true
            }
            None => false,
        }
    }

    /// Applies the location panel form. Automatic mode performs one IP lookup and
    /// ignores `manual`; the page renders the detected location from the session.
    pub async fn set_location(&self, session: &mut ChatSession, mode: LocationMode, manual: LocationInput) {
        session.location_mode = mode;
        match mode {
            LocationMode::Manual => session.location = manual,
            LocationMode::Automatic => match self.locator.detect().await {
                Ok(detected) => session.location = detected,
                Err(e) => {
                    session.location = LocationInput::default();
                    session.notify_sidebar(Notice::error(e.user_message()));
                }
            },
        }
    }

    pub async fn find_centers(&self, session: &mut ChatSession) {
        let location = session.location.clone();
        match self.finder.lookup(&location).await {
            Ok(listing) => {
                session.notify_sidebar(Notice::info(listing_preamble(&location)));
                session.notify_sidebar(Notice::info(listing));
            }
            Err(e @ CentersError::MissingFields) => session.notify_sidebar(Notice::warning(e.user_message())),
            Err(e) => session.notify_sidebar(Notice::error(e.user_message())),
        }
    }
}

/// Lines understood by the terminal chat.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalCommand {
    Ask(String),
    Image(String),
    Quick(usize),
    Centers(LocationInput),
    Quit,
    Empty,
    Unknown(String),
}

impl TerminalCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return TerminalCommand::Empty;
        }
        if !line.starts_with('/') {
            return TerminalCommand::Ask(line.to_string());
        }

        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();
        match command {
            "/quit" | "/exit" => TerminalCommand::Quit,
            "/image" if !rest.is_empty() => TerminalCommand::Image(rest.to_string()),
            "/quick" => match rest.parse::<usize>() {
                Ok(n) if n >= 1 => TerminalCommand::Quick(n - 1),
                _ => TerminalCommand::Unknown(line.to_string()),
            },
            "/centers" => {
                let fields: Vec<&str> = rest.split(',').map(str::trim).collect();
                let field = |i: usize| fields.get(i).copied().unwrap_or_default();
                TerminalCommand::Centers(LocationInput::new(field(0), field(1), field(2)))
            }
            _ => TerminalCommand::Unknown(line.to_string()),
        }
    }
}

fn print_help() {
    println!("Ask a recycling question, or use:");
    println!("  /image <path>                       classify a .jpg/.jpeg/.png photo");
    println!("  /centers <city>, <state>, <postcode> find nearby recycling centers");
    for (i, query) in QUICK_QUERIES.iter().enumerate() {
        println!("  /quick {}                            {}", i + 1, query);
    }
    println!("  /quit");
}

/// Interactive terminal session over stdin/stdout; one ChatSession for the whole run.
pub async fn run_terminal_chat(assistant: &Assistant) -> Result<()> {
    info!("Starting terminal chat...");
    let mut session = ChatSession::new();
    if let Some(greeting) = session.take_greeting(greeting::current_hour()) {
        println!("{}", greeting);
    }
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };

        let shown = session.turns().len();
        match TerminalCommand::parse(&line) {
            TerminalCommand::Quit => break,
            TerminalCommand::Empty => continue,
            TerminalCommand::Ask(query) => assistant.ask(&mut session, &query).await,
            TerminalCommand::Quick(index) => {
                if !assistant.quick_action(&mut session, index).await {
                    println!("No quick action {}.", index + 1);
                }
            }
            TerminalCommand::Image(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    let upload = ImageUpload { bytes, content_type: None, file_name: Some(path) };
                    assistant.submit(&mut session, None, Some(upload)).await;
                }
                Err(e) => println!("Could not read {}: {}", path, e),
            },
            TerminalCommand::Centers(location) => {
                assistant
                    .set_location(&mut session, LocationMode::Manual, location)
                    .await;
                assistant.find_centers(&mut session).await;
            }
            TerminalCommand::Unknown(_) => print_help(),
        }

        for turn in &session.turns()[shown..] {
            println!("{}: {}", turn.speaker.label(), turn.text);
        }
        for notice in session.take_pane_notices().into_iter().chain(session.take_sidebar_notices()) {
            println!("{}", notice.text);
        }
    }

    info!(turns = session.turns().len(), "Terminal chat finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_terminal_commands() {
        assert_eq!(TerminalCommand::parse("  "), TerminalCommand::Empty);
        assert_eq!(
            TerminalCommand::parse("Is styrofoam recyclable?"),
            TerminalCommand::Ask("Is styrofoam recyclable?".into())
        );
        assert_eq!(TerminalCommand::parse("/quit"), TerminalCommand::Quit);
        assert_eq!(TerminalCommand::parse("/image ./can.png"), TerminalCommand::Image("./can.png".into()));
        assert_eq!(TerminalCommand::parse("/quick 2"), TerminalCommand::Quick(1));
        assert!(matches!(TerminalCommand::parse("/quick 0"), TerminalCommand::Unknown(_)));
        assert_eq!(
            TerminalCommand::parse("/centers Klang, Selangor, 42000"),
            TerminalCommand::Centers(LocationInput::new("Klang", "Selangor", "42000"))
        );
        assert_eq!(
            TerminalCommand::parse("/centers Klang"),
            TerminalCommand::Centers(LocationInput::new("Klang", "", ""))
        );
    }

    #[test]
    fn test_upload_mime_type() {
        let upload = |ct: Option<&str>, name: Option<&str>| ImageUpload {
            bytes: vec![0],
            content_type: ct.map(String::from),
            file_name: name.map(String::from),
        };
        assert_eq!(upload(Some("image/png"), Some("a.jpg")).mime_type(), "image/png");
        assert_eq!(upload(None, Some("a.jpg")).mime_type(), "image/jpeg");
        assert_eq!(upload(Some("application/octet-stream"), Some("a.png")).mime_type(), "image/png");
        assert_eq!(upload(Some("image/gif"), Some("a.gif")).mime_type(), "image/gif");
        assert_eq!(upload(None, None).mime_type(), "application/octet-stream");
    }
}
