use anyhow::Result;
use async_trait::async_trait;

use super::history::ChatMessage;
use super::prompt::completion_messages;
use crate::services::llm::LlmService;

/// One validated chat turn as seen by a responder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub session_id: String,
    pub message: String,
    pub emotion: String,
    pub health_context: String,
}

/// Produces the raw reply text for a turn. The reply may contain action tags;
/// stripping them is the chat service's job.
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn respond(&self, turn: &ChatTurn, history: &[ChatMessage]) -> Result<String>;
}

const FALLBACK_REPLIES: [&str; 12] = [
    "Hello! I'm Dr.Chat, your medical assistant. How can I help you today?",
    "I understand you're seeking medical guidance. What symptoms are you experiencing?",
    "I'm here to provide health information and support. Please tell me more about your concern.",
    "Thank you for reaching out. I can help with general health questions. What would you like to know?",
    "As a medical assistant, I'm here to listen and provide helpful information. How are you feeling?",
    "I can offer general health advice and information. What specific health topic would you like to discuss?",
    "I'm Dr.Chat, ready to assist with your health questions. Please share what's on your mind.",
    "I'm here to provide medical information and support. What health concerns do you have today?",
    "I hear that you're feeling unwell. Can you tell me more about your symptoms?",
    "I'm concerned about your wellbeing. What seems to be troubling you most right now?",
    "Please don't hesitate to share what's bothering you. I'm here to help.",
    "I'd like to understand your situation better. What symptoms have you been experiencing?",
];

const KEYWORD_REPLIES: [(&[&str], &str); 4] = [
    (
        &["depress", "sad", "upset"],
        "I'm sorry to hear you're feeling this way. It's important to talk about these feelings. Can you tell me more about what's been bothering you?",
    ),
    (
        &["fever", "temperature", "hot"],
        "I understand you're concerned about a fever. Have you been monitoring your temperature? What other symptoms are you experiencing?",
    ),
    (
        &["pain", "hurt", "ache"],
        "I'm sorry you're experiencing pain. Can you describe where it hurts and how severe it feels?",
    ),
    (
        &["tired", "fatigue", "exhausted"],
        "Feeling tired can be concerning. How long have you been experiencing this fatigue? Are you getting adequate rest?",
    ),
];

/// Canned replies chosen by keyword; works without any API key.
#[derive(Debug, Clone, Default)]
pub struct KeywordResponder;

impl KeywordResponder {
    pub fn reply_for(&self, message: &str, session_id: &str) -> &'static str {
        let lowered = message.to_lowercase();
        for (keywords, reply) in KEYWORD_REPLIES {
            if keywords.iter().any(|k| lowered.contains(k)) {
                return reply;
            }
        }
        let index = (message.chars().count() + session_id.chars().count()) % FALLBACK_REPLIES.len();
        FALLBACK_REPLIES[index]
    }
}

#[async_trait]
impl ChatResponder for KeywordResponder {
    async fn respond(&self, turn: &ChatTurn, _history: &[ChatMessage]) -> Result<String> {
        Ok(self.reply_for(&turn.message, &turn.session_id).to_string())
    }
}

pub struct LlmResponder {
    service: LlmService,
}

impl LlmResponder {
    pub fn new(service: LlmService) -> Self {
        Self { service }
    }
}

#[async_trait]
impl ChatResponder for LlmResponder {
    async fn respond(&self, turn: &ChatTurn, history: &[ChatMessage]) -> Result<String> {
        let messages = completion_messages(&turn.emotion, &turn.health_context, history, &turn.message);
        self.service.complete(&messages).await
    }
}
