use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of facial-emotion labels the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Emotion {
    Angry,
    Disgusted,
    Fear,
    Happy,
    Sad,
    Surprise,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown emotion label {0:?}")]
pub struct UnknownEmotion(pub String);

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Angry,
        Emotion::Disgusted,
        Emotion::Fear,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Surprise,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Angry => "Angry",
            Emotion::Disgusted => "Disgusted",
            Emotion::Fear => "Fear",
            Emotion::Happy => "Happy",
            Emotion::Sad => "Sad",
            Emotion::Surprise => "Surprise",
            Emotion::Neutral => "Neutral",
        }
    }

    /// Case-insensitive label lookup. Classifiers report `disgust`,
    /// clients expect `Disgusted`; both spellings are accepted.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let emotion = match normalized.as_str() {
            "angry" => Emotion::Angry,
            "disgust" | "disgusted" => Emotion::Disgusted,
            "fear" => Emotion::Fear,
            "happy" => Emotion::Happy,
            "sad" => Emotion::Sad,
            "surprise" => Emotion::Surprise,
            "neutral" => Emotion::Neutral,
            _ => return None,
        };
        Some(emotion)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emotion {
    type Err = UnknownEmotion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::from_label(s).ok_or_else(|| UnknownEmotion(s.to_string()))
    }
}

/// One normalized classifier output. Not retained after the tracker step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionSample {
    pub emotion: Emotion,
    pub face_detected: bool,
}

impl EmotionSample {
    pub fn detected(emotion: Emotion) -> Self {
        Self {
            emotion,
            face_detected: true,
        }
    }

    /// No face, failed decode, or failed classification.
    pub fn no_face() -> Self {
        Self {
            emotion: Emotion::Neutral,
            face_detected: false,
        }
    }
}
