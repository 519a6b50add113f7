use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router, serve,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::chat::{Assistant, ImageUpload};
use crate::constants::QUICK_QUERIES;
use crate::greeting;
use crate::location::{LocationInput, LocationMode};
use crate::session::{ChatSession, SessionStore, SharedSession};

// Phone photos routinely exceed axum's 2 MB default.
const UPLOAD_LIMIT_BYTES: usize = 20 * 1024 * 1024;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    templates: Arc<AutoReloader>,
    pub sessions: SessionStore,
    assistant: Assistant,
}

impl AppState {
    pub fn new(templates_dir: &str, assistant: Assistant) -> Self {
        Self {
            templates: Arc::new(create_minijinja_env(templates_dir)),
            sessions: SessionStore::new(),
            assistant,
        }
    }
}

#[derive(Error, Debug)]
pub enum WebError {
    #[error("unknown session")]
    UnknownSession,

    #[error("no quick action at index {0}")]
    NoSuchQuickAction(usize),

    #[error("bad upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            // Sessions vanish on restart; start a fresh one rather than erroring.
            WebError::UnknownSession => Redirect::to("/").into_response(),
            WebError::NoSuchQuickAction(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            WebError::Multipart(e) => {
                warn!("Rejected upload: {}", e);
                (e.status(), e.body_text()).into_response()
            }
            WebError::Template(e) => {
                error!("Failed to get or render template: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, Html(format!("Internal Server Error: {}", e))).into_response()
            }
        }
    }
}

// Minijinja Environment setup
fn create_minijinja_env(templates_dir: &str) -> AutoReloader {
    let dir = templates_dir.to_string();
    AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        env.set_loader(path_loader(&dir));
        // Watch the templates directory for changes
        notifier.watch_path(&dir, true);
        Ok(env)
    })
}

#[derive(Serialize)]
struct TurnView<'a> {
    label: &'static str,
    is_user: bool,
    text: &'a str,
}

#[derive(Serialize)]
struct QuickActionView {
    index: usize,
    query: &'static str,
}

fn render_session(state: &AppState, id: Uuid, session: &mut ChatSession) -> Result<String, WebError> {
    let greeting = session.take_greeting(greeting::current_hour());
    let pane_notices = session.take_pane_notices();
    let sidebar_notices = session.take_sidebar_notices();

    let turns: Vec<TurnView> = session
        .turns()
        .iter()
        .map(|turn| TurnView {
            label: turn.speaker.label(),
            is_user: turn.speaker.is_user(),
            text: &turn.text,
        })
        .collect();
    let quick_actions: Vec<QuickActionView> = QUICK_QUERIES
        .iter()
        .enumerate()
        .map(|(index, query)| QuickActionView { index, query })
        .collect();

    let automatic = session.location_mode == LocationMode::Automatic;

    let env = state.templates.acquire_env()?;
    let tmpl = env.get_template("index.html")?;
    let html = tmpl.render(minijinja::context! {
        title => "Waste Management Chatbot",
        session_id => id.to_string(),
        greeting => greeting,
        turns => turns,
        quick_actions => quick_actions,
        pane_notices => pane_notices,
        sidebar_notices => sidebar_notices,
        location_panel_open => session.location_panel_open,
        automatic_location => automatic,
        location_detected => automatic && session.location.is_complete(),
        location => &session.location,
    })?;
    Ok(html)
}

async fn lookup(state: &AppState, id: &Uuid) -> Result<SharedSession, WebError> {
    state.sessions.get(id).await.ok_or(WebError::UnknownSession)
}

fn back_to(id: Uuid) -> Redirect {
    Redirect::to(&format!("/session/{}", id))
}

async fn index_handler(State(state): State<AppState>) -> Redirect {
    let id = state.sessions.create().await;
    info!(%id, "New chat session");
    back_to(id)
}

async fn session_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, WebError> {
    let session = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    render_session(&state, id, &mut session).map(Html)
}

async fn send_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Redirect, WebError> {
    let session = lookup(&state, &id).await?;

    let mut text = None;
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "text" => text = Some(field.text().await?),
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                // Browsers submit an empty part when no file was chosen.
                if !bytes.is_empty() {
                    upload = Some(ImageUpload { bytes: bytes.to_vec(), content_type, file_name });
                }
            }
            other => warn!("Ignoring unexpected form field '{}'", other),
        }
    }

    let mut session = session.lock().await;
    state.assistant.submit(&mut session, text, upload).await;
    Ok(back_to(id))
}

async fn quick_action_handler(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Redirect, WebError> {
    let session = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    if !state.assistant.quick_action(&mut session, index).await {
        return Err(WebError::NoSuchQuickAction(index));
    }
    Ok(back_to(id))
}

async fn toggle_location_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, WebError> {
    let session = lookup(&state, &id).await?;
    let open = session.lock().await.toggle_location_panel();
    info!(%id, open, "Toggled location panel");
    Ok(back_to(id))
}

#[derive(Deserialize, Debug)]
pub struct LocationForm {
    #[serde(default)]
    pub mode: LocationMode,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub postcode: String,
}

async fn location_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(form): Form<LocationForm>,
) -> Result<Redirect, WebError> {
    let session = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    let manual = LocationInput::new(form.city, form.state, form.postcode);
    state.assistant.set_location(&mut session, form.mode, manual).await;
    Ok(back_to(id))
}

async fn centers_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, WebError> {
    let session = lookup(&state, &id).await?;
    let mut session = session.lock().await;
    state.assistant.find_centers(&mut session).await;
    Ok(back_to(id))
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(state: AppState, static_dir: &str) -> Router {
    // Serve static files from the configured directory
    let static_files_service = ServeDir::new(static_dir).not_found_service(tower::service_fn(
        |_req: axum::extract::Request| async {
            Ok::<_, std::convert::Infallible>((StatusCode::NOT_FOUND, "Not Found").into_response())
        },
    ));

    Router::new()
        .route("/", get(index_handler))
        .route("/healthz", get(health_handler))
        .route("/session/:id", get(session_handler))
        .route("/session/:id/send", post(send_handler))
        .route("/session/:id/quick/:index", post(quick_action_handler))
        .route("/session/:id/location/toggle", post(toggle_location_handler))
        .route("/session/:id/location", post(location_handler))
        .route("/session/:id/centers", post(centers_handler))
        .nest_service("/static", static_files_service)
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(port: u16, state: AppState, static_dir: &str) -> Result<()> {
    let app = router(state, static_dir);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    Ok(())
}
