use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;

// Allowed: counts, flags, emotion labels, failure kinds
// Forbidden: frame bytes, chat text, client identifiers

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TelemetryEvent {
    ClientConnected,

    ClientDisconnected,

    SampleObserved {
        face_detected: bool,
    },

    StableTransition {
        from: Emotion,
        to: Emotion,
    },

    ClassificationFailed {
        kind: FailureKind,
    },

    /// A frame arrived (or finished classifying) after its client disconnected.
    FrameDropped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    Decode,
    Unavailable,
    Upstream,
    UnknownLabel,
}
