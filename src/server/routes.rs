//! Axum route handlers for the MindMate HTTP server.
//!
//! # Routes
//!
//! - `GET  /health`                            — liveness probe
//! - `POST /functions/counseling-chat`         — buffered counseling reply
//! - `POST /functions/counseling-chat/stream`  — SSE counseling reply
//! - `POST /functions/socratic-questions`      — 0–2 suggested questions
//! - `POST /sessions`                          — persist a completed session
//! - `GET  /sessions`                          — owner's rows + trend summary
//!
//! The AI endpoints never surface raw transport errors: 429 and 402 pass
//! through with user-facing Chinese bodies, and every other failure returns
//! HTTP 200 carrying both an `error` field and safe fallback content so the
//! caller can always render something.

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::sse::{Event, Sse},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;

use crate::catalog::Emotion;
use crate::chat::WireMessage;
use crate::history::{daily_summaries, session_dates, trend_of, NewSession, SessionStore};
use crate::llm::fallback::{fallback_greeting, FALLBACK_QUESTIONS, FALLBACK_REPLY};
use crate::llm::{GatewayClient, GatewayError, StreamChunk, StreamReceiver};
use crate::prompt::{
    build_counseling_prompt, build_socratic_prompt, extract_questions, initial_greeting_turn,
    PromptInput,
};

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Session history store.
    pub store: Arc<Mutex<SessionStore>>,
    /// AI gateway client.
    pub gateway: Arc<GatewayClient>,
}

impl AppState {
    pub fn new(store: SessionStore, gateway: GatewayClient) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            gateway: Arc::new(gateway),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/functions/counseling-chat", post(counseling_chat_handler))
        .route(
            "/functions/counseling-chat/stream",
            post(counseling_chat_stream_handler),
        )
        .route("/functions/socratic-questions", post(socratic_questions_handler))
        .route("/sessions", post(save_session_handler).get(list_sessions_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health — liveness probe.
async fn health_handler() -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "mindmate",
    }))
}

// ---------------------------------------------------------------------------
// Counseling chat
// ---------------------------------------------------------------------------

/// Request body shared by the buffered and streaming counseling endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CounselingRequest {
    #[serde(default)]
    pub messages: Vec<WireMessage>,
    /// Emotion id; unknown values fall back to the generic label.
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub automatic_thought: Option<String>,
    #[serde(default)]
    pub distortions: Vec<String>,
    #[serde(default = "default_intensity")]
    pub emotion_intensity: u8,
    #[serde(default)]
    pub body_sensation: Option<String>,
    #[serde(default)]
    pub is_initial: bool,
}

fn default_intensity() -> u8 {
    5
}

impl CounselingRequest {
    fn emotion(&self) -> Option<Emotion> {
        self.emotion.as_deref().and_then(|s| s.parse().ok())
    }

    fn prompt_input(&self) -> PromptInput {
        PromptInput {
            emotion: self.emotion(),
            intensity: self.emotion_intensity,
            body_sensation: self.body_sensation.clone(),
            automatic_thought: self.automatic_thought.clone(),
            distortions: self.distortions.clone(),
            is_initial: self.is_initial,
        }
    }

    /// The turns sent to the gateway: for the proactive greeting the history
    /// is replaced by a single synthetic user turn.
    fn turns(&self) -> Vec<WireMessage> {
        if self.is_initial {
            vec![WireMessage::user(initial_greeting_turn(self.emotion()))]
        } else {
            self.messages.clone()
        }
    }

    fn fallback_message(&self) -> String {
        if self.is_initial {
            fallback_greeting(self.emotion())
        } else {
            FALLBACK_REPLY.to_string()
        }
    }
}

/// POST /functions/counseling-chat — buffered reply.
async fn counseling_chat_handler(
    State(state): State<AppState>,
    Json(request): Json<CounselingRequest>,
) -> (StatusCode, Json<Value>) {
    let system = build_counseling_prompt(&request.prompt_input());

    match state.gateway.complete(&system, &request.turns(), 300, 0.8).await {
        Ok(message) => (StatusCode::OK, Json(serde_json::json!({ "message": message }))),
        Err(error) => counseling_error_response(&request, error),
    }
}

fn counseling_error_response(
    request: &CounselingRequest,
    error: GatewayError,
) -> (StatusCode, Json<Value>) {
    match error {
        GatewayError::RateLimited => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({ "error": error.user_message() })),
        ),
        GatewayError::QuotaExhausted => (
            StatusCode::PAYMENT_REQUIRED,
            Json(serde_json::json!({ "error": error.user_message() })),
        ),
        other => {
            tracing::warn!("counseling chat degraded to fallback: {}", other);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "error": other.user_message(),
                    "message": request.fallback_message(),
                })),
            )
        }
    }
}

/// POST /functions/counseling-chat/stream — SSE reply.
///
/// Emits `data: {"content": "<fragment>"}` frames terminated by
/// `data: [DONE]`. When the upstream call fails before any fragment was
/// delivered, a single fallback-content frame is emitted instead so the
/// stream never ends empty.
async fn counseling_chat_stream_handler(
    State(state): State<AppState>,
    Json(request): Json<CounselingRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let system = build_counseling_prompt(&request.prompt_input());
    let turns = request.turns();
    let fallback = request.fallback_message();
    let gateway = Arc::clone(&state.gateway);

    let (tx, rx) = tokio::sync::mpsc::channel::<Event>(32);
    tokio::spawn(async move {
        let mut sent_any = false;
        match gateway.stream(&system, &turns, 300, 0.8).await {
            Ok(mut chunks) => loop {
                match chunks.next().await {
                    Some(StreamChunk::TextDelta { text }) => {
                        sent_any = true;
                        if tx.send(content_event(&text)).await.is_err() {
                            return;
                        }
                    }
                    Some(StreamChunk::Error { message }) => {
                        tracing::warn!("counseling stream failed: {}", message);
                        if !sent_any {
                            let _ = tx.send(content_event(&fallback)).await;
                        }
                        break;
                    }
                    Some(StreamChunk::Done { .. }) | None => break,
                }
            },
            Err(error) => {
                tracing::warn!("counseling stream degraded to fallback: {}", error);
                let _ = tx.send(content_event(&fallback)).await;
            }
        }
        let _ = tx.send(Event::default().data("[DONE]")).await;
    });

    let stream = futures::stream::unfold(rx, |mut rx| async move {
        rx.recv().await.map(|event| (Ok::<_, Infallible>(event), rx))
    });
    Sse::new(stream)
}

fn content_event(text: &str) -> Event {
    Event::default().data(serde_json::json!({ "content": text }).to_string())
}

// ---------------------------------------------------------------------------
// Socratic questions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocraticRequest {
    #[serde(default)]
    pub thought: String,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub distortions: Vec<String>,
    #[serde(default = "default_intensity")]
    pub emotion_intensity: u8,
}

/// POST /functions/socratic-questions — 0–2 guiding questions, each ending
/// in a full-width question mark.
async fn socratic_questions_handler(
    State(state): State<AppState>,
    Json(request): Json<SocraticRequest>,
) -> (StatusCode, Json<Value>) {
    let emotion = request.emotion.as_deref().and_then(|s| s.parse::<Emotion>().ok());
    let system = build_socratic_prompt(emotion, &request.distortions, request.emotion_intensity);
    let turns = vec![WireMessage::user(format!("我的想法是：{}", request.thought))];

    match state.gateway.complete(&system, &turns, 200, 0.7).await {
        Ok(reply) => {
            let questions = extract_questions(&reply);
            (StatusCode::OK, Json(serde_json::json!({ "questions": questions })))
        }
        Err(GatewayError::RateLimited) => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({ "error": GatewayError::RateLimited.user_message() })),
        ),
        Err(GatewayError::QuotaExhausted) => (
            StatusCode::PAYMENT_REQUIRED,
            Json(serde_json::json!({ "error": GatewayError::QuotaExhausted.user_message() })),
        ),
        Err(error) => {
            tracing::warn!("socratic questions degraded to fallback: {}", error);
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "error": error.user_message(),
                    "questions": FALLBACK_QUESTIONS,
                })),
            )
        }
    }
}

// ---------------------------------------------------------------------------
// Session history
// ---------------------------------------------------------------------------

/// POST /sessions — persist one completed session.
async fn save_session_handler(
    State(state): State<AppState>,
    Json(row): Json<NewSession>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    let store = state.store.lock().map_err(|_| lock_poisoned())?;
    match store.insert(&row) {
        Ok(stored) => Ok((
            StatusCode::CREATED,
            Json(serde_json::to_value(stored).unwrap_or_default()),
        )),
        Err(error) => {
            tracing::error!("session insert failed: {}", error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "保存失败" })),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// GET /sessions — one owner's rows in a date range, newest first, plus
/// daily summaries, calendar dates and the trend direction.
async fn list_sessions_handler(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let store = state.store.lock().map_err(|_| lock_poisoned())?;
    let sessions = store
        .select_range(&query.user_id, query.start, query.end)
        .map_err(|error| {
            tracing::error!("session query failed: {}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "查询失败" })),
            )
        })?;

    let daily = daily_summaries(&sessions, query.start.date_naive(), query.end.date_naive());
    let trend = trend_of(&daily);
    let dates = session_dates(&sessions);

    Ok(Json(serde_json::json!({
        "sessions": sessions,
        "daily": daily,
        "trend": trend,
        "dates": dates,
    })))
}

fn lock_poisoned() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "error": "Store lock poisoned" })),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
