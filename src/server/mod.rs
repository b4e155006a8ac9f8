//! HTTP and WebSocket surface.

pub mod http;
pub mod ws;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::chat::ChatService;
use crate::session::SessionDispatcher;
use crate::telemetry::TelemetrySnapshot;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<SessionDispatcher>,
    pub chat: Arc<ChatService>,
    pub telemetry: watch::Receiver<TelemetrySnapshot>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::health))
        .route("/api/chat", post(http::chat))
        .route(
            "/api/history/:session_id",
            get(http::history).delete(http::delete_history),
        )
        .route("/api/sessions", get(http::sessions_by_query))
        .route("/api/sessions/:user_id", get(http::sessions_by_path))
        .route("/api/emotion/stats", get(http::emotion_stats))
        .route("/api/emotion/client/:client_id", get(http::client_emotion))
        .route("/ws", get(ws::ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("drchat listening on {}", addr);
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
