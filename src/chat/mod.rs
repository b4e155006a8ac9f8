//! Text chat: validate a turn, get a reply, strip action tags, keep the transcript.

pub mod history;
pub mod prompt;
pub mod responder;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::directive::{parse_directives, Directive};
use crate::error::ChatError;
use crate::services::translate::{Inbound, PassThroughTranslator, Translator};

pub use history::{ChatHistory, ChatMessage, Sender, SessionSummary};
pub use responder::{ChatResponder, ChatTurn, KeywordResponder, LlmResponder};

const DEFAULT_EMOTION: &str = "Neutral";
const DEFAULT_HEALTH_CONTEXT: &str = "No health profile available";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub emotion: Option<String>,
    #[serde(default)]
    pub health_context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub session_id: String,
    pub response: String,
    pub actions: Vec<Directive>,
}

pub struct ChatService {
    responder: Arc<dyn ChatResponder>,
    translator: Arc<dyn Translator>,
    history: ChatHistory,
}

impl ChatService {
    pub fn new(responder: Arc<dyn ChatResponder>) -> Self {
        Self {
            responder,
            translator: Arc::new(PassThroughTranslator),
            history: ChatHistory::new(),
        }
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub async fn handle(&self, request: ChatRequest) -> Result<ChatReply, ChatError> {
        let message = request.message.trim();
        if message.is_empty() {
            return Err(ChatError::MissingMessage);
        }
        let session_id = request.session_id.trim();
        if session_id.is_empty() {
            return Err(ChatError::MissingSession);
        }

        // Translation is best-effort: a failed call leaves the text as-is.
        let inbound = self.translator.inbound(message).await.unwrap_or_else(|e| {
            warn!("Inbound translation failed: {:#}", e);
            Inbound::untouched(message)
        });

        let turn = ChatTurn {
            session_id: session_id.to_string(),
            message: inbound.text,
            emotion: request
                .emotion
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EMOTION.to_string()),
            health_context: request
                .health_context
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_HEALTH_CONTEXT.to_string()),
        };
        info!("Chat request received: {} chars, session {}", turn.message.len(), turn.session_id);

        let prior = self.history.messages(&turn.session_id);
        let raw = self
            .responder
            .respond(&turn, &prior)
            .await
            .map_err(|e| {
                warn!("Chat responder failed: {:#}", e);
                ChatError::Responder(e)
            })?;

        // Only the display text is translated back; directives stay as parsed.
        let parsed = parse_directives(&raw);
        let response = match &inbound.language {
            Some(language) => self
                .translator
                .outbound(&parsed.text, language)
                .await
                .unwrap_or_else(|e| {
                    warn!("Outbound translation to {} failed: {:#}", language, e);
                    parsed.text.clone()
                }),
            None => parsed.text.clone(),
        };

        self.history.append(
            &turn.session_id,
            [
                ChatMessage::user(message),
                ChatMessage::bot_with_actions(response.clone(), parsed.directives.clone()),
            ],
        );

        Ok(ChatReply {
            session_id: turn.session_id,
            response,
            actions: parsed.directives,
        })
    }
}
