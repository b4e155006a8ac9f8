use serde::{Deserialize, Serialize};

use crate::client::ClientId;
use crate::emotion::{Emotion, EmotionObservation};

/// Messages a client sends over the emotion channel.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Base64 image, optionally as a `data:` URL. A missing frame decodes as
    /// empty and reads as a no-face sample.
    VideoFrame {
        #[serde(default)]
        frame: String,
    },
    GetEmotion,
}

/// Messages the core asks the transport to deliver to one client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum OutboundEvent {
    ConnectionStatus(ConnectionStatus),
    EmotionUpdate(EmotionUpdate),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::ConnectionStatus(_) => "connection_status",
            OutboundEvent::EmotionUpdate(_) => "emotion_update",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionStatus {
    pub status: ConnectionState,
    pub client_id: ClientId,
}

/// Query answers carry only `emotion`; frame answers carry everything.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionUpdate {
    pub emotion: Emotion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_emotion: Option<Emotion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub face_detected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotion_changed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl EmotionUpdate {
    pub fn current(emotion: Emotion) -> Self {
        Self {
            emotion,
            raw_emotion: None,
            face_detected: None,
            emotion_changed: None,
            suggestion: None,
        }
    }

    pub fn from_observation(observation: &EmotionObservation, suggestion: Option<&str>) -> Self {
        Self {
            emotion: observation.stable_emotion,
            raw_emotion: Some(observation.raw_emotion),
            face_detected: Some(observation.face_detected),
            emotion_changed: Some(observation.changed),
            suggestion: suggestion.map(str::to_string),
        }
    }
}
