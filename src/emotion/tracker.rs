use dashmap::DashMap;
use tracing::debug;

use super::types::{Emotion, EmotionSample};
use crate::client::ClientId;

/// Consecutive identical raw samples required before the stable state moves.
pub const DEFAULT_DEBOUNCE_THRESHOLD: u32 = 5;

/// Debounce state for one client.
///
/// `stable_emotion` only moves when `streak_count` reaches `threshold` and the
/// streaked emotion differs from it. `streak_count` returns to 0 whenever the
/// raw label changes and after every confirmation check, changed or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEmotionState {
    pub latest_emotion: Emotion,
    pub stable_emotion: Emotion,
    pub streak_count: u32,
    pub threshold: u32,
}

impl Default for ClientEmotionState {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_THRESHOLD)
    }
}

/// Outcome of feeding one sample into a [`ClientEmotionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionObservation {
    pub stable_emotion: Emotion,
    pub raw_emotion: Emotion,
    pub face_detected: bool,
    pub changed: bool,
    /// Stable emotion before this sample; equals `stable_emotion` unless `changed`.
    pub previous_stable: Emotion,
}

impl ClientEmotionState {
    pub fn new(threshold: u32) -> Self {
        Self {
            latest_emotion: Emotion::Neutral,
            stable_emotion: Emotion::Neutral,
            streak_count: 0,
            threshold,
        }
    }

    /// Pure transition: State + Sample -> Mutated State + Observation.
    pub fn observe(&mut self, sample: EmotionSample) -> EmotionObservation {
        let previous_stable = self.stable_emotion;

        if sample.emotion == self.latest_emotion {
            self.streak_count = self.streak_count.saturating_add(1);
        } else {
            self.streak_count = 0;
            self.latest_emotion = sample.emotion;
        }

        let mut changed = false;
        if self.streak_count >= self.threshold {
            if sample.emotion != self.stable_emotion {
                self.stable_emotion = sample.emotion;
                changed = true;
            }
            self.streak_count = 0;
        }

        EmotionObservation {
            stable_emotion: self.stable_emotion,
            raw_emotion: sample.emotion,
            face_detected: sample.face_detected,
            changed,
            previous_stable,
        }
    }
}

/// Process-wide registry of per-client debounce state.
///
/// Lifecycle: `register` on connect, `remove` on disconnect. Each update locks
/// only the shard holding that client's entry and never awaits while holding
/// it, so one client's sample can't observe another's half-applied step.
#[derive(Debug)]
pub struct EmotionTracker {
    clients: DashMap<ClientId, ClientEmotionState>,
    threshold: u32,
}

impl Default for EmotionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_THRESHOLD)
    }
}

impl EmotionTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            clients: DashMap::new(),
            threshold,
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Installs fresh default state, replacing whatever was there.
    pub fn register(&self, id: ClientId) {
        self.clients.insert(id, ClientEmotionState::new(self.threshold));
    }

    /// Idempotent.
    pub fn remove(&self, id: &ClientId) -> Option<ClientEmotionState> {
        self.clients.remove(id).map(|(_, state)| state)
    }

    pub fn contains(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id)
    }

    /// Steps the client's state machine, creating default state first if the
    /// client has none.
    pub fn on_sample(&self, id: ClientId, sample: EmotionSample) -> EmotionObservation {
        let threshold = self.threshold;
        let mut entry = self
            .clients
            .entry(id)
            .or_insert_with(|| ClientEmotionState::new(threshold));
        entry.observe(sample)
    }

    /// Steps the client's state machine only if the client is registered.
    /// A sample for a retired client is dropped, never resurrecting it.
    pub fn observe_if_present(&self, id: &ClientId, sample: EmotionSample) -> Option<EmotionObservation> {
        match self.clients.get_mut(id) {
            Some(mut state) => Some(state.observe(sample)),
            None => {
                debug!(client_id = %id, "sample for unregistered client dropped");
                None
            }
        }
    }

    pub fn stable_emotion(&self, id: &ClientId) -> Option<Emotion> {
        self.clients.get(id).map(|state| state.stable_emotion)
    }

    pub fn snapshot(&self, id: &ClientId) -> Option<ClientEmotionState> {
        self.clients.get(id).map(|state| state.value().clone())
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
