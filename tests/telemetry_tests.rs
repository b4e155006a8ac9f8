use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use drchat::emotion::{Emotion, EmotionSample};
use drchat::services::DisabledClassifier;
use drchat::telemetry::metrics::compute_snapshot;
use drchat::telemetry::{
    self, FailureKind, TelemetryEvent, TelemetryRecorder, TelemetrySink, TelemetrySnapshot,
};
use drchat::{ClientId, SessionDispatcher};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_snapshot_counts_each_event_kind() {
    let events: VecDeque<TelemetryEvent> = vec![
        TelemetryEvent::ClientConnected,
        TelemetryEvent::SampleObserved { face_detected: true },
        TelemetryEvent::SampleObserved { face_detected: true },
        TelemetryEvent::SampleObserved { face_detected: true },
        TelemetryEvent::SampleObserved { face_detected: false },
        TelemetryEvent::StableTransition { from: Emotion::Neutral, to: Emotion::Happy },
        TelemetryEvent::ClassificationFailed { kind: FailureKind::Decode },
        TelemetryEvent::ClassificationFailed { kind: FailureKind::UnknownLabel },
        TelemetryEvent::FrameDropped,
        TelemetryEvent::ClientDisconnected,
    ]
    .into();

    let snap = compute_snapshot(&events);
    assert_eq!(snap.connection_stats.opened, 1);
    assert_eq!(snap.connection_stats.closed, 1);
    assert_eq!(snap.sample_stats.total, 4);
    assert_eq!(snap.sample_stats.no_face, 1);
    assert!((snap.sample_stats.face_ratio - 0.75).abs() < f64::EPSILON);
    assert_eq!(snap.transition_stats.total, 1);
    assert_eq!(snap.transition_stats.into.get("Happy"), Some(&1));
    assert_eq!(snap.failure_stats.decode, 1);
    assert_eq!(snap.failure_stats.unknown_label, 1);
    assert_eq!(snap.failure_stats.upstream, 0);
    assert_eq!(snap.failure_stats.dropped_frames, 1);
}

#[tokio::test]
async fn test_empty_window_has_zero_ratio() {
    let snap = compute_snapshot(&VecDeque::new());
    assert_eq!(snap, TelemetrySnapshot::default());
    assert_eq!(snap.sample_stats.face_ratio, 0.0);
}

#[tokio::test]
async fn test_recorder_evicts_oldest_first() {
    let mut recorder = TelemetryRecorder::new(3);

    recorder.record(TelemetryEvent::ClientConnected);
    recorder.record(TelemetryEvent::FrameDropped);
    recorder.record(TelemetryEvent::FrameDropped);
    recorder.record(TelemetryEvent::FrameDropped);

    assert_eq!(recorder.len(), 3, "window is bounded");
    let snap = recorder.snapshot();
    assert_eq!(snap.connection_stats.opened, 0, "oldest event fell off");
    assert_eq!(snap.failure_stats.dropped_frames, 3);

    recorder.clear();
    assert!(recorder.is_empty());
}

#[tokio::test]
async fn test_dispatcher_emits_lifecycle_and_transition_events() {
    // 1. Wire a dispatcher to a live sink
    let (sink, mut rx) = telemetry::channel(64);
    let dispatcher = SessionDispatcher::new(Arc::new(DisabledClassifier), 2, sink);
    let id = ClientId::new();

    // 2. Connect, confirm Sad, send an undecodable frame, disconnect, late sample
    dispatcher.on_connect(id);
    for _ in 0..3 {
        dispatcher.on_sample(&id, EmotionSample::detected(Emotion::Sad));
    }
    dispatcher.on_frame_sample(&id, "###").await;
    dispatcher.on_disconnect(&id);
    dispatcher.on_sample(&id, EmotionSample::detected(Emotion::Sad));

    // 3. Drain into a recorder
    let mut recorder = TelemetryRecorder::new(64);
    while let Ok(event) = rx.try_recv() {
        recorder.record(event);
    }
    let snap = recorder.snapshot();

    assert_eq!(snap.connection_stats.opened, 1);
    assert_eq!(snap.connection_stats.closed, 1);
    assert_eq!(snap.sample_stats.total, 4, "three detections plus the failed frame");
    assert_eq!(snap.sample_stats.no_face, 1);
    assert_eq!(snap.transition_stats.into.get("Sad"), Some(&1));
    assert_eq!(snap.failure_stats.decode, 1);
    assert_eq!(snap.failure_stats.dropped_frames, 1, "late sample after disconnect");
}

#[tokio::test]
async fn test_unavailable_classifier_is_counted() {
    let (sink, mut rx) = telemetry::channel(16);
    let dispatcher = SessionDispatcher::new(Arc::new(DisabledClassifier), 5, sink);
    let id = ClientId::new();
    dispatcher.on_connect(id);

    let sample = dispatcher.classify_frame(&tiny_png()).await;
    assert_eq!(sample, EmotionSample::no_face());

    let mut events = VecDeque::new();
    while let Ok(event) = rx.try_recv() {
        events.push_back(event);
    }
    assert_eq!(compute_snapshot(&events).failure_stats.unavailable, 1);
}

#[tokio::test]
async fn test_full_sink_drops_instead_of_blocking() {
    let (sink, mut rx) = telemetry::channel(2);
    for _ in 0..10 {
        sink.record(TelemetryEvent::FrameDropped);
    }
    let mut drained = 0;
    while rx.try_recv().is_ok() {
        drained += 1;
    }
    assert_eq!(drained, 2);

    // Disabled sink is a no-op.
    TelemetrySink::disabled().record(TelemetryEvent::ClientConnected);
}

#[tokio::test]
async fn test_run_publishes_final_snapshot_on_cancel() {
    let (sink, rx) = telemetry::channel(16);
    let (tx, mut snapshots) = watch::channel(TelemetrySnapshot::default());
    let cancel = CancellationToken::new();
    let task = tokio::spawn(TelemetryRecorder::new(16).run(rx, tx, cancel.clone()));

    sink.record(TelemetryEvent::ClientConnected);
    sink.record(TelemetryEvent::SampleObserved { face_detected: false });

    // Give the recorder a moment to drain, then stop it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    task.await.unwrap();

    let snap = snapshots.borrow_and_update().clone();
    assert_eq!(snap.connection_stats.opened, 1);
    assert_eq!(snap.sample_stats.no_face, 1);
}

#[tokio::test]
async fn test_run_exits_when_all_sinks_dropped() {
    let (sink, rx) = telemetry::channel(4);
    let (tx, snapshots) = watch::channel(TelemetrySnapshot::default());
    let task = tokio::spawn(TelemetryRecorder::new(4).run(rx, tx, CancellationToken::new()));

    sink.record(TelemetryEvent::ClientDisconnected);
    drop(sink);

    tokio::time::timeout(Duration::from_secs(2), task)
        .await
        .expect("recorder should stop once the channel closes")
        .unwrap();
    assert_eq!(snapshots.borrow().connection_stats.closed, 1);
}

fn tiny_png() -> String {
    use base64::Engine;
    let mut bytes = Vec::new();
    image::DynamicImage::new_rgb8(2, 2)
        .write_to(&mut bytes, image::ImageOutputFormat::Png)
        .unwrap();
    base64::engine::general_purpose::STANDARD.encode(&bytes)
}
