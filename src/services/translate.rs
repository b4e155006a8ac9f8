use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The language prompts and replies are produced in.
pub const WORKING_LANGUAGE: &str = "en";

/// A user message brought into the working language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub text: String,
    /// Set when the reply must be translated back into this language.
    pub language: Option<String>,
}

impl Inbound {
    pub fn untouched(text: impl Into<String>) -> Self {
        Self { text: text.into(), language: None }
    }
}

/// Opaque language round-trip around the chat responder.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Detects the message language and, if it is one this translator
    /// handles, returns the message in the working language.
    async fn inbound(&self, text: &str) -> Result<Inbound>;

    /// Translates a working-language reply into `language`.
    async fn outbound(&self, text: &str, language: &str) -> Result<String>;
}

/// Leaves every message as-is.
#[derive(Debug, Clone, Default)]
pub struct PassThroughTranslator;

#[async_trait]
impl Translator for PassThroughTranslator {
    async fn inbound(&self, text: &str) -> Result<Inbound> {
        Ok(Inbound::untouched(text))
    }

    async fn outbound(&self, text: &str, _language: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
    #[serde(rename = "detectedLanguage", default)]
    detected_language: Option<DetectedLanguage>,
}

#[derive(Deserialize)]
struct DetectedLanguage {
    language: String,
}

/// Client for a LibreTranslate-compatible `POST /translate` endpoint.
/// Only messages detected in one of `languages` are round-tripped.
#[derive(Clone)]
pub struct HttpTranslator {
    client: Client,
    base_url: String,
    languages: Vec<String>,
}

impl HttpTranslator {
    pub fn new(base_url: impl Into<String>, languages: Vec<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            languages,
        }
    }

    async fn translate(&self, text: &str, source: &str, target: &str) -> Result<TranslateResponse> {
        let response = self
            .client
            .post(format!("{}/translate", self.base_url))
            .json(&TranslateRequest { q: text, source, target, format: "text" })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Translation Server Error: {}", response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn inbound(&self, text: &str) -> Result<Inbound> {
        let result = self.translate(text, "auto", WORKING_LANGUAGE).await?;
        let detected = result.detected_language.map(|d| d.language);

        match detected {
            Some(language) if self.languages.iter().any(|l| *l == language) => Ok(Inbound {
                text: result.translated_text,
                language: Some(language),
            }),
            _ => Ok(Inbound::untouched(text)),
        }
    }

    async fn outbound(&self, text: &str, language: &str) -> Result<String> {
        Ok(self.translate(text, WORKING_LANGUAGE, language).await?.translated_text)
    }
}
