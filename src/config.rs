use std::net::SocketAddr;
use std::time::Duration;

use crate::emotion::DEFAULT_DEBOUNCE_THRESHOLD;
use crate::error::ConfigError;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TELEMETRY_CAPACITY: usize = 10_000;
pub const DEFAULT_TRANSLATE_LANGUAGES: &str = "ta";

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub base_url: String,
    /// Language codes whose messages are round-tripped through the working language.
    pub languages: Vec<String>,
    pub timeout: Duration,
}

/// Runtime settings, read from the process environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Consecutive identical raw samples needed to move a client's stable
    /// emotion. Latency to react is roughly threshold x frame interval.
    pub debounce_threshold: u32,
    /// `None` leaves the emotion channel running with every frame read as no-face.
    pub classifier_url: Option<String>,
    pub classifier_timeout: Duration,
    /// `None` answers chat with the keyword responder.
    pub llm: Option<LlmConfig>,
    /// `None` passes chat text through untranslated.
    pub translate: Option<TranslateConfig>,
    pub telemetry_capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = parse_var("DRCHAT_BIND", get("DRCHAT_BIND"), DEFAULT_BIND.parse().ok())?;

        let debounce_threshold: u32 = parse_var(
            "DRCHAT_DEBOUNCE_THRESHOLD",
            get("DRCHAT_DEBOUNCE_THRESHOLD"),
            Some(DEFAULT_DEBOUNCE_THRESHOLD),
        )?;
        if debounce_threshold == 0 {
            return Err(ConfigError::Invalid {
                var: "DRCHAT_DEBOUNCE_THRESHOLD",
                value: "0".to_string(),
                reason: "threshold must be at least 1".to_string(),
            });
        }

        let classifier_timeout_ms: u64 = parse_var(
            "DRCHAT_CLASSIFIER_TIMEOUT_MS",
            get("DRCHAT_CLASSIFIER_TIMEOUT_MS"),
            Some(2_000),
        )?;

        let llm = match get("GROQ_API_KEY") {
            Some(api_key) => {
                let timeout_ms: u64 =
                    parse_var("DRCHAT_LLM_TIMEOUT_MS", get("DRCHAT_LLM_TIMEOUT_MS"), Some(10_000))?;
                Some(LlmConfig {
                    base_url: get("DRCHAT_LLM_BASE_URL")
                        .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
                    api_key,
                    model: get("DRCHAT_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
                    timeout: Duration::from_millis(timeout_ms),
                })
            }
            None => None,
        };

        let translate = match get("DRCHAT_TRANSLATE_URL") {
            Some(base_url) => {
                let timeout_ms: u64 = parse_var(
                    "DRCHAT_TRANSLATE_TIMEOUT_MS",
                    get("DRCHAT_TRANSLATE_TIMEOUT_MS"),
                    Some(5_000),
                )?;
                let languages = get("DRCHAT_TRANSLATE_LANGUAGES")
                    .unwrap_or_else(|| DEFAULT_TRANSLATE_LANGUAGES.to_string())
                    .split(',')
                    .map(|l| l.trim().to_lowercase())
                    .filter(|l| !l.is_empty())
                    .collect();
                Some(TranslateConfig {
                    base_url,
                    languages,
                    timeout: Duration::from_millis(timeout_ms),
                })
            }
            None => None,
        };

        let telemetry_capacity: usize = parse_var(
            "DRCHAT_TELEMETRY_CAPACITY",
            get("DRCHAT_TELEMETRY_CAPACITY"),
            Some(DEFAULT_TELEMETRY_CAPACITY),
        )?;

        Ok(Self {
            bind_addr,
            debounce_threshold,
            classifier_url: get("DRCHAT_CLASSIFIER_URL"),
            classifier_timeout: Duration::from_millis(classifier_timeout_ms),
            llm,
            translate,
            telemetry_capacity: telemetry_capacity.max(1),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 5000)),
            debounce_threshold: DEFAULT_DEBOUNCE_THRESHOLD,
            classifier_url: None,
            classifier_timeout: Duration::from_secs(2),
            llm: None,
            translate: None,
            telemetry_capacity: DEFAULT_TELEMETRY_CAPACITY,
        }
    }
}

fn parse_var<T>(var: &'static str, raw: Option<String>, default: Option<T>) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
            value,
        }),
        None => default.ok_or_else(|| ConfigError::Invalid {
            var,
            value: String::new(),
            reason: "no value and no default".to_string(),
        }),
    }
}
