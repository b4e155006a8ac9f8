use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, warn};

use super::AppState;
use crate::client::ClientId;
use crate::session::{InboundMessage, OutboundEvent, SessionDispatcher};

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// One task per connection. Frames are awaited one at a time, so a client's
/// samples reach its tracker in arrival order.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let client_id = ClientId::new();
    let (mut sender, mut receiver) = socket.split();

    let ack = state.dispatcher.on_connect(client_id);
    if send_event(&mut sender, &ack).await.is_err() {
        state.dispatcher.on_disconnect(&client_id);
        return;
    }

    while let Some(message) = receiver.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(client_id = %client_id, "WebSocket receive failed: {}", e);
                break;
            }
        };

        if let Some(event) = dispatch_text(&state.dispatcher, &client_id, &text).await {
            if send_event(&mut sender, &event).await.is_err() {
                break;
            }
        }
    }

    state.dispatcher.on_disconnect(&client_id);
}

/// Decodes one inbound text message and routes it. Malformed messages are
/// logged and produce no reply.
pub async fn dispatch_text(
    dispatcher: &SessionDispatcher,
    client_id: &ClientId,
    text: &str,
) -> Option<OutboundEvent> {
    match serde_json::from_str::<InboundMessage>(text) {
        Ok(InboundMessage::VideoFrame { frame }) => dispatcher.on_frame_sample(client_id, &frame).await,
        Ok(InboundMessage::GetEmotion) => Some(dispatcher.on_query(client_id)),
        Err(e) => {
            warn!(client_id = %client_id, "Malformed message ignored: {}", e);
            None
        }
    }
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &OutboundEvent,
) -> Result<(), axum::Error> {
    let payload = match serde_json::to_string(event) {
        Ok(payload) => payload,
        Err(e) => {
            warn!("Failed to encode {}: {}", event.name(), e);
            return Ok(());
        }
    };
    sender.send(Message::Text(payload)).await
}
