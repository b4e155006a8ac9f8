use std::sync::Arc;
use tracing::{debug, info, warn};

use super::events::{ConnectionState, ConnectionStatus, EmotionUpdate, OutboundEvent};
use crate::client::ClientId;
use crate::emotion::{suggestion_for, Emotion, EmotionSample, EmotionTracker};
use crate::error::ClassifierError;
use crate::services::classifier::Classifier;
use crate::services::frame::decode_frame;
use crate::telemetry::{FailureKind, TelemetryEvent, TelemetrySink};

/// Routes per-client lifecycle, frame and query events through the tracker
/// and returns what should be sent back to that client.
///
/// Ordering within a client is the caller's job: the transport runs one task
/// per connection and awaits each frame before reading the next. Across
/// clients every method may be called concurrently.
pub struct SessionDispatcher {
    tracker: EmotionTracker,
    classifier: Arc<dyn Classifier>,
    telemetry: TelemetrySink,
}

impl SessionDispatcher {
    pub fn new(classifier: Arc<dyn Classifier>, threshold: u32, telemetry: TelemetrySink) -> Self {
        Self {
            tracker: EmotionTracker::new(threshold),
            classifier,
            telemetry,
        }
    }

    pub fn tracker(&self) -> &EmotionTracker {
        &self.tracker
    }

    pub fn on_connect(&self, client_id: ClientId) -> OutboundEvent {
        self.tracker.register(client_id);
        self.telemetry.record(TelemetryEvent::ClientConnected);
        info!(client_id = %client_id, "Client connected");

        OutboundEvent::ConnectionStatus(ConnectionStatus {
            status: ConnectionState::Connected,
            client_id,
        })
    }

    /// Immediate and idempotent. Returns whether the client was still registered.
    pub fn on_disconnect(&self, client_id: &ClientId) -> bool {
        let removed = self.tracker.remove(client_id).is_some();
        if removed {
            self.telemetry.record(TelemetryEvent::ClientDisconnected);
            info!(client_id = %client_id, "Client disconnected");
        }
        removed
    }

    /// Classifies one raw frame and feeds it to the client's tracker.
    /// `None` when the client is not (or no longer) connected.
    pub async fn on_frame_sample(&self, client_id: &ClientId, raw_frame: &str) -> Option<OutboundEvent> {
        if !self.tracker.contains(client_id) {
            self.telemetry.record(TelemetryEvent::FrameDropped);
            debug!(client_id = %client_id, "frame for unknown client ignored");
            return None;
        }

        let sample = self.classify_frame(raw_frame).await;
        self.on_sample(client_id, sample)
    }

    /// Tracker step for an already-normalized sample.
    pub fn on_sample(&self, client_id: &ClientId, sample: EmotionSample) -> Option<OutboundEvent> {
        let Some(observation) = self.tracker.observe_if_present(client_id, sample) else {
            self.telemetry.record(TelemetryEvent::FrameDropped);
            return None;
        };

        self.telemetry.record(TelemetryEvent::SampleObserved {
            face_detected: observation.face_detected,
        });

        let suggestion = if observation.changed {
            self.telemetry.record(TelemetryEvent::StableTransition {
                from: observation.previous_stable,
                to: observation.stable_emotion,
            });
            info!(
                client_id = %client_id,
                from = %observation.previous_stable,
                to = %observation.stable_emotion,
                "Stable emotion changed"
            );
            suggestion_for(observation.stable_emotion)
        } else {
            None
        };

        Some(OutboundEvent::EmotionUpdate(EmotionUpdate::from_observation(
            &observation,
            suggestion,
        )))
    }

    /// Never fails: unknown clients read as Neutral.
    pub fn on_query(&self, client_id: &ClientId) -> OutboundEvent {
        let emotion = self.tracker.stable_emotion(client_id).unwrap_or_default();
        OutboundEvent::EmotionUpdate(EmotionUpdate::current(emotion))
    }

    /// Frame payload -> normalized sample. Every failure reads as Neutral
    /// with no face, so a flaky classifier can't stall the channel.
    pub async fn classify_frame(&self, raw_frame: &str) -> EmotionSample {
        let frame = match decode_frame(raw_frame) {
            Ok(frame) => frame,
            Err(e) => {
                debug!("Frame decode failed: {}", e);
                self.telemetry.record(TelemetryEvent::ClassificationFailed {
                    kind: FailureKind::Decode,
                });
                return EmotionSample::no_face();
            }
        };

        match self.classifier.classify(&frame).await {
            Ok(Some(classification)) => match Emotion::from_label(&classification.label) {
                Some(emotion) => EmotionSample::detected(emotion),
                None => {
                    warn!("Classifier returned unknown label {:?}", classification.label);
                    self.telemetry.record(TelemetryEvent::ClassificationFailed {
                        kind: FailureKind::UnknownLabel,
                    });
                    EmotionSample::no_face()
                }
            },
            Ok(None) => EmotionSample::no_face(),
            Err(e) => {
                let kind = match e {
                    ClassifierError::Unavailable => FailureKind::Unavailable,
                    _ => FailureKind::Upstream,
                };
                debug!("Classification failed: {}", e);
                self.telemetry.record(TelemetryEvent::ClassificationFailed { kind });
                EmotionSample::no_face()
            }
        }
    }
}
