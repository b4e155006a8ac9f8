use std::collections::VecDeque;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::event::TelemetryEvent;
use super::metrics::{compute_snapshot, TelemetrySnapshot};

pub const PUBLISH_MS: u64 = 1_000;

/// Bounded window of recent telemetry; the oldest events fall off first.
#[derive(Debug)]
pub struct TelemetryRecorder {
    buffer: VecDeque<TelemetryEvent>,
    capacity: usize,
}

impl TelemetryRecorder {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn record(&mut self, event: TelemetryEvent) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(event);
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        compute_snapshot(&self.buffer)
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Drains the event channel and republishes the snapshot on a fixed cadence
    /// while anything changed. Returns when cancelled or when every sink is gone.
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<TelemetryEvent>,
        publish: watch::Sender<TelemetrySnapshot>,
        cancel: CancellationToken,
    ) {
        info!("Telemetry recorder started. Publish: {}ms", PUBLISH_MS);

        let mut cadence = interval(Duration::from_millis(PUBLISH_MS));
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut dirty = false;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => {
                        self.record(event);
                        dirty = true;
                    }
                    None => break,
                },
                _ = cadence.tick() => {
                    if dirty {
                        publish.send_replace(self.snapshot());
                        dirty = false;
                    }
                }
            }
        }

        publish.send_replace(self.snapshot());
        info!("Telemetry recorder stopped");
    }
}
