//! Emotion-channel telemetry.
//!
//! # SAFETY INVARIANT
//! Telemetry is a write-only side channel. Nothing in the tracker or the
//! dispatcher reads it back to make a decision.
//!
//! # PRIVACY INVARIANT
//! Events never carry frame bytes, chat text, or client identifiers. Only
//! labels, flags, and counts.

pub mod event;
pub mod metrics;
pub mod recorder;

use tokio::sync::mpsc;

pub use event::{FailureKind, TelemetryEvent};
pub use metrics::TelemetrySnapshot;
pub use recorder::TelemetryRecorder;

/// Non-blocking handle for emitting telemetry from the sample path.
/// A full channel drops the event instead of stalling a client.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySink {
    tx: Option<mpsc::Sender<TelemetryEvent>>,
}

impl TelemetrySink {
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn record(&self, event: TelemetryEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.try_send(event);
        }
    }
}

pub fn channel(capacity: usize) -> (TelemetrySink, mpsc::Receiver<TelemetryEvent>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (TelemetrySink { tx: Some(tx) }, rx)
}
