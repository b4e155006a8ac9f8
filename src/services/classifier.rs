use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::frame::Frame;
use crate::error::ClassifierError;

/// Raw facial-emotion classification, before label normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub label: String,
    pub confidence: Option<f32>,
}

/// Opaque facial-emotion classifier.
///
/// `Ok(None)` means the frame was analysed and no face was found; `Err` means
/// the analysis itself failed. Callers degrade both to a no-detection sample.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, frame: &Frame) -> Result<Option<Classification>, ClassifierError>;
}

/// Stands in when no classifier endpoint is configured.
#[derive(Debug, Clone, Default)]
pub struct DisabledClassifier;

#[async_trait]
impl Classifier for DisabledClassifier {
    async fn classify(&self, _frame: &Frame) -> Result<Option<Classification>, ClassifierError> {
        Err(ClassifierError::Unavailable)
    }
}

#[derive(Deserialize)]
struct AnalysisResponse {
    #[serde(default)]
    dominant_emotion: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    face_detected: Option<bool>,
}

/// Posts frame bytes to an external analysis service that answers with
/// `{"dominant_emotion": "...", "confidence": 0.9, "face_detected": true}`.
#[derive(Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, frame: &Frame) -> Result<Option<Classification>, ClassifierError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(frame.bytes.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClassifierError::Status(response.status().as_u16()));
        }

        let analysis: AnalysisResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::Malformed(e.to_string()))?;

        if analysis.face_detected == Some(false) {
            return Ok(None);
        }

        Ok(analysis.dominant_emotion.map(|label| Classification {
            label,
            confidence: analysis.confidence,
        }))
    }
}
