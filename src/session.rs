use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::constants::SESSION_IDLE_TTL;
use crate::greeting;
use crate::location::{LocationInput, LocationMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Speaker {
    User,
    UserImage,
    Assistant,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::User => "You",
            Speaker::UserImage => "You (Image)",
            Speaker::Assistant => "Assistant",
        }
    }

    pub fn is_user(&self) -> bool {
        !matches!(self, Speaker::Assistant)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatTurn {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self { speaker, text: text.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// One-shot message shown on the next render, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

/// State for one browser (or terminal) session. Nothing here outlives the process.
#[derive(Debug, Default)]
pub struct ChatSession {
    turns: Vec<ChatTurn>,
    greeted: bool,
    pub location_panel_open: bool,
    pub location_mode: LocationMode,
    pub location: LocationInput,
    pane_notices: Vec<Notice>,
    sidebar_notices: Vec<Notice>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn greeted(&self) -> bool {
        self.greeted
    }

    /// Appends a user turn and the reply to it. The log only ever grows in pairs.
    pub fn record_exchange(&mut self, user: ChatTurn, reply: impl Into<String>) {
        debug_assert!(user.speaker.is_user());
        self.turns.push(user);
        self.turns.push(ChatTurn::new(Speaker::Assistant, reply));
    }

    /// Greeting for the first render of the session; `None` afterwards.
    pub fn take_greeting(&mut self, hour: u32) -> Option<&'static str> {
        if self.greeted {
            return None;
        }
        self.greeted = true;
        Some(greeting::greet(hour))
    }

    pub fn toggle_location_panel(&mut self) -> bool {
        self.location_panel_open = !self.location_panel_open;
        self.location_panel_open
    }

    pub fn notify_pane(&mut self, notice: Notice) {
        self.pane_notices.push(notice);
    }

    pub fn notify_sidebar(&mut self, notice: Notice) {
        self.sidebar_notices.push(notice);
    }

    pub fn take_pane_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.pane_notices)
    }

    pub fn take_sidebar_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.sidebar_notices)
    }
}

pub type SharedSession = Arc<Mutex<ChatSession>>;

struct StoredSession {
    session: SharedSession,
    last_seen: Instant,
}

impl StoredSession {
    // A handler holding a clone is mid-request; never evict under it.
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.session) > 1
    }
}

/// In-memory sessions keyed by id. Each session has its own lock, so a slow
/// provider call only holds up the session that made it. Sessions idle for
/// longer than the TTL are dropped whenever a new one is created.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_idle_ttl(SESSION_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        let idle_ttl = self.idle_ttl;
        sessions.retain(|_, stored| stored.in_use() || now.duration_since(stored.last_seen) < idle_ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, remaining = sessions.len(), "Evicted idle sessions");
        }

        sessions.insert(
            id,
            StoredSession {
                session: Arc::new(Mutex::new(ChatSession::new())),
                last_seen: now,
            },
        );
        id
    }

    /// Looks a session up and marks it as seen.
    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(id)?;
        stored.last_seen = Instant::now();
        Some(stored.session.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
