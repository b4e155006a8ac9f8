use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

use super::event::{FailureKind, TelemetryEvent};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub connection_stats: ConnectionStats,
    pub sample_stats: SampleStats,
    pub transition_stats: TransitionStats,
    pub failure_stats: FailureStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionStats {
    pub opened: u64,
    pub closed: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SampleStats {
    pub total: u64,
    pub no_face: u64,
    pub face_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransitionStats {
    pub total: u64,
    /// Keyed by the emotion the stable state moved to.
    pub into: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FailureStats {
    pub decode: u64,
    pub unavailable: u64,
    pub upstream: u64,
    pub unknown_label: u64,
    pub dropped_frames: u64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();

    for event in events {
        match event {
            TelemetryEvent::ClientConnected => snap.connection_stats.opened += 1,
            TelemetryEvent::ClientDisconnected => snap.connection_stats.closed += 1,
            TelemetryEvent::SampleObserved { face_detected } => {
                snap.sample_stats.total += 1;
                if !face_detected {
                    snap.sample_stats.no_face += 1;
                }
            }
            TelemetryEvent::StableTransition { to, .. } => {
                snap.transition_stats.total += 1;
                *snap.transition_stats.into.entry(to.to_string()).or_insert(0) += 1;
            }
            TelemetryEvent::ClassificationFailed { kind } => match kind {
                FailureKind::Decode => snap.failure_stats.decode += 1,
                FailureKind::Unavailable => snap.failure_stats.unavailable += 1,
                FailureKind::Upstream => snap.failure_stats.upstream += 1,
                FailureKind::UnknownLabel => snap.failure_stats.unknown_label += 1,
            },
            TelemetryEvent::FrameDropped => snap.failure_stats.dropped_frames += 1,
        }
    }

    if snap.sample_stats.total > 0 {
        let with_face = snap.sample_stats.total - snap.sample_stats.no_face;
        snap.sample_stats.face_ratio = with_face as f64 / snap.sample_stats.total as f64;
    }

    snap
}
