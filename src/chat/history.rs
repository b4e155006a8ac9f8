use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::directive::Directive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    /// Actions the reply triggered; stripped from `text` for display.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Directive>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text.into(), Vec::new())
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text.into(), Vec::new())
    }

    pub fn bot_with_actions(text: impl Into<String>, actions: Vec<Directive>) -> Self {
        Self::new(Sender::Bot, text.into(), actions)
    }

    fn new(sender: Sender, text: String, actions: Vec<Directive>) -> Self {
        Self { sender, text, actions, timestamp: Utc::now() }
    }

    /// The message as the model originally produced it, tags included.
    pub fn with_tags(&self) -> String {
        if self.actions.is_empty() {
            return self.text.clone();
        }
        let tags: Vec<String> = self.actions.iter().map(Directive::to_tag).collect();
        if self.text.is_empty() {
            tags.join(" ")
        } else {
            format!("{} {}", self.text, tags.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: String,
    pub session_id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

/// In-memory transcripts keyed by session id. Lost on restart.
#[derive(Debug, Default)]
pub struct ChatHistory {
    sessions: DashMap<String, Vec<ChatMessage>>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, session_id: &str, messages: impl IntoIterator<Item = ChatMessage>) {
        self.sessions
            .entry(session_id.to_string())
            .or_default()
            .extend(messages);
    }

    pub fn messages(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .get(session_id)
            .map(|messages| messages.value().clone())
            .unwrap_or_default()
    }

    /// Sessions belong to a user when the session id starts with the first
    /// eight characters of the user id (clients mint ids that way).
    pub fn sessions_for_user(&self, user_id: &str) -> Vec<SessionSummary> {
        let prefix: String = user_id.chars().take(8).collect();
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut owned: Vec<(String, DateTime<Utc>)> = self
            .sessions
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| {
                let created_at = entry.value().first().map(|m| m.timestamp).unwrap_or_else(Utc::now);
                (entry.key().clone(), created_at)
            })
            .collect();
        owned.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        owned
            .into_iter()
            .enumerate()
            .map(|(i, (id, created_at))| SessionSummary {
                session_id: id.clone(),
                id,
                title: format!("Chat Session {}", i + 1),
                created_at,
            })
            .collect()
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }
}
