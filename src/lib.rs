pub mod audio;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod session;
pub mod speech;
pub mod ui;
pub mod utils;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum JarvisError {
    #[error("Transcription error: {0}")]
    TranscriptionError(String),

    #[error("TTS error: {0}")]
    SynthesisError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Handler error: {0}")]
    HandlerError(String),

    #[error("Launch error: {0}")]
    LaunchError(String),

    #[error("IO error: {0}")]
    IOError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<std::io::Error> for JarvisError {
    fn from(e: std::io::Error) -> Self {
        JarvisError::IOError(e.to_string())
    }
}

impl From<reqwest::Error> for JarvisError {
    // The request URL never reaches speech or the log
    fn from(e: reqwest::Error) -> Self {
        JarvisError::NetworkError(e.without_url().to_string())
    }
}

impl JarvisError {
    /// The wrapped diagnostic without the category prefix
    pub fn detail(&self) -> &str {
        match self {
            JarvisError::TranscriptionError(s)
            | JarvisError::SynthesisError(s)
            | JarvisError::NetworkError(s)
            | JarvisError::HandlerError(s)
            | JarvisError::LaunchError(s)
            | JarvisError::IOError(s)
            | JarvisError::ConfigError(s) => s,
        }
    }
}

pub type Result<T> = std::result::Result<T, JarvisError>;

/// Why a single microphone capture produced no transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureFailure {
    #[error("microphone unavailable: {0}")]
    DeviceError(String),

    #[error("timed out waiting for speech")]
    Timeout,

    #[error("speech was not intelligible")]
    Unintelligible,

    #[error("recognition service unreachable: {0}")]
    NetworkError(String),
}

impl CaptureFailure {
    pub fn is_device_error(&self) -> bool {
        matches!(self, CaptureFailure::DeviceError(_))
    }
}
