//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{
    ChatRequest, CreateSessionResponse, DraftRequest, ErrorResponse, PanelRequest,
    QueuedResponse, RouteRequest, SuccessResponse,
};
use super::AppState;
use crate::runtime::{SessionError, SseEvent};
use crate::session::SessionSnapshot;
use crate::state_machine::Event;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Landing page
        .route("/", get(serve_page))
        // Static assets (embedded or filesystem fallback)
        .route("/assets/*path", get(serve_static))
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        // SSE streaming
        .route("/api/sessions/:id/stream", get(stream_session))
        // Operator actions
        .route("/api/sessions/:id/chat", post(send_chat))
        .route("/api/sessions/:id/route", post(route_query))
        .route("/api/sessions/:id/panel", post(set_panel))
        .route("/api/sessions/:id/draft", post(set_draft))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Landing Page
// ============================================================

async fn serve_page() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - Landing page not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Session Lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let (session_id, snapshot) = state.sessions.create().await;
    Json(CreateSessionResponse {
        session_id,
        snapshot,
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state.sessions.snapshot(&id).await?;
    Ok(Json(snapshot))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.remove(&id).await?;
    Ok(Json(SuccessResponse { ok: true }))
}

// ============================================================
// SSE Streaming
// ============================================================

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (snapshot, broadcast_rx) = state.sessions.subscribe(&id).await?;
    Ok(sse_stream(SseEvent::Init { snapshot }, broadcast_rx))
}

// ============================================================
// Operator Actions
// ============================================================

async fn send_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    state.sessions.send_event(&id, Event::submit(req.text)).await?;
    Ok(Json(QueuedResponse { queued: true }))
}

async fn route_query(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RouteRequest>,
) -> Result<Json<QueuedResponse>, AppError> {
    state.sessions.send_event(&id, Event::route(req.query)).await?;
    Ok(Json(QueuedResponse { queued: true }))
}

async fn set_panel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PanelRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    state
        .sessions
        .send_event(&id, Event::SetPanel { open: req.open })
        .await?;
    Ok(Json(SuccessResponse { ok: true }))
}

async fn set_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DraftRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    if req.chat.is_none() && req.search.is_none() {
        return Err(AppError::BadRequest(
            "Draft update needs `chat` or `search`".to_string(),
        ));
    }
    state
        .sessions
        .send_event(
            &id,
            Event::SetDraft {
                chat: req.chat,
                search: req.search,
            },
        )
        .await?;
    Ok(Json(SuccessResponse { ok: true }))
}

async fn get_version() -> &'static str {
    concat!("ayfj-nexus ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::NotFound(_) => AppError::NotFound(e.to_string()),
            SessionError::Closed(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
