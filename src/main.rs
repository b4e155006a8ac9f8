use anyhow::Context;
use drchat::chat::{ChatResponder, ChatService, KeywordResponder, LlmResponder};
use drchat::config::Config;
use drchat::server::{self, AppState};
use drchat::services::classifier::{Classifier, DisabledClassifier, HttpClassifier};
use drchat::services::llm::LlmService;
use drchat::services::translate::{HttpTranslator, PassThroughTranslator, Translator};
use drchat::telemetry::{self, TelemetryRecorder, TelemetrySnapshot};
use drchat::SessionDispatcher;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
    tracing::info!("drchat booting...");

    let config = Config::from_env().context("invalid configuration")?;
    let shutdown = CancellationToken::new();

    // Telemetry side channel
    let (sink, events) = telemetry::channel(config.telemetry_capacity);
    let (snapshot_tx, snapshot_rx) = watch::channel(TelemetrySnapshot::default());
    let recorder = TelemetryRecorder::new(config.telemetry_capacity);
    let recorder_task = tokio::spawn(recorder.run(events, snapshot_tx, shutdown.clone()));

    let classifier: Arc<dyn Classifier> = match &config.classifier_url {
        Some(url) => {
            tracing::info!("Emotion classifier: {}", url);
            Arc::new(HttpClassifier::new(url.clone(), config.classifier_timeout))
        }
        None => {
            tracing::warn!("DRCHAT_CLASSIFIER_URL not set; every frame will read as no face");
            Arc::new(DisabledClassifier)
        }
    };

    let responder: Arc<dyn ChatResponder> = match &config.llm {
        Some(llm) => {
            tracing::info!("Chat responder: LLM ({})", llm.model);
            Arc::new(LlmResponder::new(LlmService::new(llm)))
        }
        None => {
            tracing::info!("Chat responder: keyword (GROQ_API_KEY not set)");
            Arc::new(KeywordResponder)
        }
    };

    let translator: Arc<dyn Translator> = match &config.translate {
        Some(translate) => {
            tracing::info!("Translator: {} for {:?}", translate.base_url, translate.languages);
            Arc::new(HttpTranslator::new(
                translate.base_url.clone(),
                translate.languages.clone(),
                translate.timeout,
            ))
        }
        None => Arc::new(PassThroughTranslator),
    };

    let dispatcher = SessionDispatcher::new(classifier, config.debounce_threshold, sink);
    tracing::info!("Debounce threshold: {} samples", dispatcher.tracker().threshold());

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        chat: Arc::new(ChatService::new(responder).with_translator(translator)),
        telemetry: snapshot_rx,
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Shutdown requested (Ctrl+C)");
                ctrl_c.cancel();
            }
            Err(e) => tracing::warn!("Ctrl+C handler unavailable: {}", e),
        }
    });

    let served = server::serve(listener, state, shutdown.clone()).await;
    shutdown.cancel();
    let _ = recorder_task.await;

    served.context("server error")?;
    tracing::info!("drchat stopped");
    Ok(())
}
