use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use drchat::emotion::{suggestion_for, ClientEmotionState, Emotion, EmotionSample};
use drchat::error::ClassifierError;
use drchat::server::ws::dispatch_text;
use drchat::services::{Classification, Classifier, Frame};
use drchat::session::{ConnectionState, EmotionUpdate, OutboundEvent};
use drchat::telemetry::TelemetrySink;
use drchat::{ClientId, SessionDispatcher};

enum Reply {
    Label(&'static str),
    NoFace,
    Fail,
}

/// Plays back a fixed list of classifier answers, then reports no face.
struct ScriptedClassifier {
    script: Mutex<VecDeque<Reply>>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    fn new(script: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, _frame: &Frame) -> Result<Option<Classification>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Reply::Label(label)) => Ok(Some(Classification {
                label: label.to_string(),
                confidence: Some(0.9),
            })),
            Some(Reply::NoFace) | None => Ok(None),
            Some(Reply::Fail) => Err(ClassifierError::Status(500)),
        }
    }
}

fn png_data_url() -> String {
    let img = image::DynamicImage::new_rgb8(8, 8);
    let mut bytes = Vec::new();
    img.write_to(&mut bytes, image::ImageOutputFormat::Png).unwrap();
    format!("data:image/png;base64,{}", STANDARD.encode(&bytes))
}

fn dispatcher_with(classifier: Arc<ScriptedClassifier>) -> SessionDispatcher {
    SessionDispatcher::new(classifier, 5, TelemetrySink::disabled())
}

fn update(event: Option<OutboundEvent>) -> EmotionUpdate {
    match event {
        Some(OutboundEvent::EmotionUpdate(update)) => update,
        other => panic!("expected emotion_update, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connect_acknowledges_and_registers() {
    let dispatcher = dispatcher_with(ScriptedClassifier::new(vec![]));
    let id = ClientId::new();

    let ack = dispatcher.on_connect(id);
    match &ack {
        OutboundEvent::ConnectionStatus(status) => {
            assert_eq!(status.status, ConnectionState::Connected);
            assert_eq!(status.client_id, id);
        }
        other => panic!("expected connection_status, got {:?}", other),
    }
    assert_eq!(
        serde_json::to_value(&ack).unwrap(),
        serde_json::json!({ "event": "connection_status", "status": "connected", "client_id": id.to_string() })
    );

    let state = dispatcher.tracker().snapshot(&id).expect("registered on connect");
    assert_eq!(state, ClientEmotionState::new(5));
}

#[tokio::test]
async fn test_query_reports_stable_or_neutral() {
    let dispatcher = dispatcher_with(ScriptedClassifier::new(vec![]));
    let id = ClientId::new();

    // 1. Unknown client
    let reply = update(Some(dispatcher.on_query(&id)));
    assert_eq!(reply, EmotionUpdate::current(Emotion::Neutral));

    // 2. Registered and confirmed Happy
    dispatcher.on_connect(id);
    for _ in 0..6 {
        dispatcher.on_sample(&id, EmotionSample::detected(Emotion::Happy));
    }
    let reply = dispatcher.on_query(&id);
    assert_eq!(
        serde_json::to_value(&reply).unwrap(),
        serde_json::json!({ "event": "emotion_update", "emotion": "Happy" }),
        "query answers carry only the stable emotion"
    );
}

#[tokio::test]
async fn test_suggestion_attached_only_on_change() {
    let dispatcher = dispatcher_with(ScriptedClassifier::new(vec![]));
    let id = ClientId::new();
    dispatcher.on_connect(id);

    let replies: Vec<EmotionUpdate> = (0..8)
        .map(|_| update(dispatcher.on_sample(&id, EmotionSample::detected(Emotion::Sad))))
        .collect();

    for (i, reply) in replies.iter().enumerate() {
        assert_eq!(reply.raw_emotion, Some(Emotion::Sad));
        assert_eq!(reply.face_detected, Some(true));
        if i == 5 {
            assert_eq!(reply.emotion, Emotion::Sad);
            assert_eq!(reply.emotion_changed, Some(true));
            assert_eq!(reply.suggestion.as_deref(), suggestion_for(Emotion::Sad));
        } else {
            assert_eq!(reply.emotion_changed, Some(false), "sample {i}");
            assert_eq!(reply.suggestion, None, "sample {i}");
        }
    }
    assert_eq!(replies[4].emotion, Emotion::Neutral);
    assert_eq!(replies[7].emotion, Emotion::Sad);
}

#[tokio::test]
async fn test_change_back_to_neutral_has_no_suggestion() {
    let dispatcher = dispatcher_with(ScriptedClassifier::new(vec![]));
    let id = ClientId::new();
    dispatcher.on_connect(id);

    for _ in 0..6 {
        dispatcher.on_sample(&id, EmotionSample::detected(Emotion::Angry));
    }
    let mut last = None;
    for _ in 0..6 {
        last = Some(update(dispatcher.on_sample(&id, EmotionSample::no_face())));
    }
    let last = last.unwrap();
    assert_eq!(last.emotion, Emotion::Neutral);
    assert_eq!(last.emotion_changed, Some(true));
    assert_eq!(last.face_detected, Some(false));
    assert_eq!(last.suggestion, None);
}

#[tokio::test]
async fn test_disconnect_is_idempotent_and_final() {
    let classifier = ScriptedClassifier::new(vec![Reply::Label("happy")]);
    let dispatcher = dispatcher_with(classifier.clone());
    let id = ClientId::new();
    dispatcher.on_connect(id);

    assert!(dispatcher.on_disconnect(&id));
    assert!(!dispatcher.on_disconnect(&id), "second disconnect is a no-op");

    // Late frames and samples must not bring the client back.
    assert!(dispatcher.on_frame_sample(&id, &png_data_url()).await.is_none());
    assert_eq!(classifier.calls(), 0, "no classification for a gone client");
    assert!(dispatcher.on_sample(&id, EmotionSample::detected(Emotion::Happy)).is_none());
    assert!(!dispatcher.tracker().contains(&id));

    let reply = update(Some(dispatcher.on_query(&id)));
    assert_eq!(reply.emotion, Emotion::Neutral);
}

#[tokio::test]
async fn test_frame_sample_uses_classifier_label() {
    let classifier = ScriptedClassifier::new(vec![Reply::Label("HAPPY")]);
    let dispatcher = dispatcher_with(classifier.clone());
    let id = ClientId::new();
    dispatcher.on_connect(id);

    let reply = update(dispatcher.on_frame_sample(&id, &png_data_url()).await);
    assert_eq!(classifier.calls(), 1);
    assert_eq!(reply.raw_emotion, Some(Emotion::Happy));
    assert_eq!(reply.face_detected, Some(true));
    assert_eq!(reply.emotion, Emotion::Neutral, "one frame never moves the stable emotion");

    let state = dispatcher.tracker().snapshot(&id).unwrap();
    assert_eq!(state.latest_emotion, Emotion::Happy);
}

#[tokio::test]
async fn test_classifier_failures_degrade_to_no_face() {
    let classifier = ScriptedClassifier::new(vec![
        Reply::Fail,
        Reply::Label("contempt"),
        Reply::NoFace,
    ]);
    let dispatcher = dispatcher_with(classifier.clone());
    let id = ClientId::new();
    dispatcher.on_connect(id);
    let frame = png_data_url();

    for step in ["upstream error", "unknown label", "no face"] {
        let reply = update(dispatcher.on_frame_sample(&id, &frame).await);
        assert_eq!(reply.raw_emotion, Some(Emotion::Neutral), "{step}");
        assert_eq!(reply.face_detected, Some(false), "{step}");
        assert_eq!(reply.emotion, Emotion::Neutral, "{step}");
    }
    assert_eq!(classifier.calls(), 3);
}

#[tokio::test]
async fn test_undecodable_frame_skips_classifier() {
    let classifier = ScriptedClassifier::new(vec![Reply::Label("happy")]);
    let dispatcher = dispatcher_with(classifier.clone());
    let id = ClientId::new();
    dispatcher.on_connect(id);

    for payload in ["", "data:image/jpeg;base64,", "not base64 at all!", "aGVsbG8gd29ybGQ="] {
        let reply = update(dispatcher.on_frame_sample(&id, payload).await);
        assert_eq!(reply.raw_emotion, Some(Emotion::Neutral), "payload {payload:?}");
        assert_eq!(reply.face_detected, Some(false), "payload {payload:?}");
    }
    assert_eq!(classifier.calls(), 0, "bad frames never reach the classifier");
}

#[tokio::test]
async fn test_dispatch_text_routes_wire_messages() {
    let classifier = ScriptedClassifier::new(vec![Reply::Label("sad")]);
    let dispatcher = dispatcher_with(classifier.clone());
    let id = ClientId::new();
    dispatcher.on_connect(id);

    // 1. Query
    let reply = dispatch_text(&dispatcher, &id, r#"{"event":"get_emotion"}"#).await;
    assert_eq!(update(reply), EmotionUpdate::current(Emotion::Neutral));

    // 2. Frame
    let frame = serde_json::json!({ "event": "video_frame", "frame": png_data_url() }).to_string();
    let reply = update(dispatch_text(&dispatcher, &id, &frame).await);
    assert_eq!(reply.raw_emotion, Some(Emotion::Sad));

    // 3. Malformed and unknown messages are dropped without a reply
    assert!(dispatch_text(&dispatcher, &id, "{not json").await.is_none());
    assert!(dispatch_text(&dispatcher, &id, r#"{"event":"dance"}"#).await.is_none());
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn test_frame_message_without_payload_reads_as_no_face() {
    let classifier = ScriptedClassifier::new(vec![Reply::Label("happy")]);
    let dispatcher = dispatcher_with(classifier.clone());
    let id = ClientId::new();
    dispatcher.on_connect(id);

    let reply = update(dispatch_text(&dispatcher, &id, r#"{"event":"video_frame"}"#).await);
    assert_eq!(reply.emotion, Emotion::Neutral);
    assert_eq!(reply.raw_emotion, Some(Emotion::Neutral));
    assert_eq!(reply.face_detected, Some(false));
    assert_eq!(reply.emotion_changed, Some(false));
    assert_eq!(classifier.calls(), 0, "an empty frame never reaches the classifier");
}

/// Tiny deterministic generator so the interleaving test needs no extra crate.
fn lcg_sequence(seed: u64, len: usize) -> Vec<EmotionSample> {
    let mut x = seed;
    (0..len)
        .map(|_| {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            // Bias toward runs: most samples repeat one of two labels.
            match (x >> 33) % 10 {
                0..=5 => EmotionSample::detected(Emotion::Happy),
                6..=8 => EmotionSample::detected(Emotion::Sad),
                _ => EmotionSample::no_face(),
            }
        })
        .collect()
}

fn replay_alone(samples: &[EmotionSample]) -> Vec<Emotion> {
    let mut state = ClientEmotionState::new(5);
    samples.iter().map(|s| state.observe(*s).stable_emotion).collect()
}

#[tokio::test]
async fn test_interleaved_clients_match_isolated_replay() {
    let dispatcher = dispatcher_with(ScriptedClassifier::new(vec![]));
    let a = ClientId::new();
    let b = ClientId::new();
    dispatcher.on_connect(a);
    dispatcher.on_connect(b);

    let seq_a = lcg_sequence(7, 200);
    let seq_b = lcg_sequence(99, 200);
    let mut seen_a = Vec::new();
    let mut seen_b = Vec::new();

    for (i, (sa, sb)) in seq_a.iter().zip(&seq_b).enumerate() {
        // Alternate which client goes first.
        if i % 3 == 0 {
            seen_b.push(update(dispatcher.on_sample(&b, *sb)).emotion);
            seen_a.push(update(dispatcher.on_sample(&a, *sa)).emotion);
        } else {
            seen_a.push(update(dispatcher.on_sample(&a, *sa)).emotion);
            seen_b.push(update(dispatcher.on_sample(&b, *sb)).emotion);
        }
    }

    assert_eq!(seen_a, replay_alone(&seq_a));
    assert_eq!(seen_b, replay_alone(&seq_b));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clients_are_isolated() {
    let dispatcher = Arc::new(dispatcher_with(ScriptedClassifier::new(vec![])));

    let mut handles = Vec::new();
    for seed in 0..16u64 {
        let dispatcher = dispatcher.clone();
        handles.push(tokio::spawn(async move {
            let id = ClientId::new();
            dispatcher.on_connect(id);
            let samples = lcg_sequence(seed * 31 + 1, 300);
            let mut seen = Vec::with_capacity(samples.len());
            for sample in &samples {
                seen.push(update(dispatcher.on_sample(&id, *sample)).emotion);
                tokio::task::yield_now().await;
            }
            assert!(dispatcher.on_disconnect(&id));
            (samples, seen)
        }));
    }

    for handle in handles {
        let (samples, seen) = handle.await.unwrap();
        assert_eq!(seen, replay_alone(&samples));
    }
    assert!(dispatcher.tracker().is_empty());
}
