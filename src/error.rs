use thiserror::Error;

/// Failure to turn a transport frame payload into image bytes.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame payload is empty")]
    Empty,
    #[error("frame payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("frame payload is not a decodable image: {0}")]
    Image(#[from] image::ImageError),
}

/// Failure of a single classification call. Always degraded to a
/// no-detection sample by the dispatcher, never sent to a client.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier is not available")]
    Unavailable,
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("classifier returned HTTP {0}")]
    Status(u16),
    #[error("classifier response was malformed: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message missing")]
    MissingMessage,
    #[error("Session ID missing")]
    MissingSession,
    #[error("chat responder failed: {0}")]
    Responder(#[source] anyhow::Error),
}
