//! Real collaborators for a session

use super::controller::{SessionFactory, SessionParts};
use crate::config::AssistantConfig;
use crate::Result;

/// Default microphone, local Whisper model and the system handlers
#[derive(Debug, Default)]
pub struct SystemFactory;

impl SystemFactory {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(all(feature = "audio-io", feature = "whisper"))]
impl SessionFactory for SystemFactory {
    fn build(&self, config: &AssistantConfig) -> Result<SessionParts> {
        use crate::audio::CpalMicrophone;
        use crate::handlers::Handlers;
        use crate::speech::stt::WhisperTranscriber;
        use std::sync::Arc;

        let transcriber = WhisperTranscriber::new(config.stt.clone())?;
        Ok(SessionParts {
            microphone: Arc::new(CpalMicrophone::new()),
            transcriber: Arc::new(transcriber),
            handlers: Handlers::from_config(config),
        })
    }
}

#[cfg(not(all(feature = "audio-io", feature = "whisper")))]
impl SessionFactory for SystemFactory {
    fn build(&self, _config: &AssistantConfig) -> Result<SessionParts> {
        Err(crate::JarvisError::ConfigError(
            "built without the audio-io and whisper features".to_string(),
        ))
    }
}
