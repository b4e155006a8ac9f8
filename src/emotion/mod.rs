//! Per-client emotion debouncing.
//!
//! Raw per-frame classifications are noisy; a single misread frame must not
//! flip what the client is told. Each client carries a small state machine that
//! only commits a new stable emotion after a run of identical raw samples.

pub mod suggestion;
pub mod tracker;
pub mod types;

pub use suggestion::suggestion_for;
pub use tracker::{ClientEmotionState, EmotionObservation, EmotionTracker, DEFAULT_DEBOUNCE_THRESHOLD};
pub use types::{Emotion, EmotionSample, UnknownEmotion};
