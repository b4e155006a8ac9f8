use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::AppState;
use crate::chat::{ChatReply, ChatRequest, SessionSummary};
use crate::client::ClientId;
use crate::error::ChatError;
use crate::emotion::Emotion;
use crate::session::{EmotionUpdate, OutboundEvent};
use crate::telemetry::TelemetrySnapshot;

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = match self {
            ChatError::MissingMessage | ChatError::MissingSession => StatusCode::BAD_REQUEST,
            ChatError::Responder(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": "drchat" }))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ChatError> {
    state.chat.handle(request).await.map(Json)
}

pub async fn history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<serde_json::Value> {
    let messages = state.chat.history().messages(&session_id);
    Json(json!({ "messages": messages }))
}

/// Drops a session's transcript. Deleting an unknown session is not an error.
pub async fn delete_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<serde_json::Value> {
    let removed = state.chat.history().remove(&session_id);
    if removed {
        info!("Chat history deleted for session {}", session_id);
    }
    Json(json!({ "success": true, "deleted": removed }))
}

#[derive(Debug, Deserialize)]
pub struct SessionsQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub async fn sessions_by_query(
    State(state): State<AppState>,
    Query(query): Query<SessionsQuery>,
) -> Json<Vec<SessionSummary>> {
    let sessions = query
        .user_id
        .map(|user_id| state.chat.history().sessions_for_user(&user_id))
        .unwrap_or_default();
    Json(sessions)
}

pub async fn sessions_by_path(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Json<Vec<SessionSummary>> {
    Json(state.chat.history().sessions_for_user(&user_id))
}

/// Unknown or unparsable ids read as Neutral, like an emotion-channel query.
pub async fn client_emotion(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
) -> Json<OutboundEvent> {
    let event = match client_id.parse::<ClientId>() {
        Ok(id) => state.dispatcher.on_query(&id),
        Err(_) => OutboundEvent::EmotionUpdate(EmotionUpdate::current(Emotion::default())),
    };
    Json(event)
}

pub async fn emotion_stats(State(state): State<AppState>) -> Json<TelemetrySnapshot> {
    Json(state.telemetry.borrow().clone())
}
