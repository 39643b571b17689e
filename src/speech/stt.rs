//! Speech-to-text boundary

use crate::Result;

/// Converts one captured phrase (mono samples) to text.
///
/// An empty string means nothing intelligible was heard.
pub trait Transcriber: Send + Sync {
    fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String>;
}

/// Drop non-speech markers such as `[BLANK_AUDIO]` or `(music)`
pub fn strip_annotations(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(feature = "whisper")]
pub use whisper::WhisperTranscriber;

#[cfg(feature = "whisper")]
mod whisper {
    use super::{strip_annotations, Transcriber};
    use crate::audio::resample;
    use crate::config::SttConfig;
    use crate::{JarvisError, Result};
    use tracing::{debug, info};
    use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

    const WHISPER_RATE: u32 = 16000;

    /// Local Whisper model
    pub struct WhisperTranscriber {
        config: SttConfig,
        context: WhisperContext,
    }

    impl WhisperTranscriber {
        pub fn new(config: SttConfig) -> Result<Self> {
            info!("Loading Whisper model from: {:?}", config.model_path);

            if !config.model_path.exists() {
                return Err(JarvisError::ConfigError(format!(
                    "Model file not found: {:?}",
                    config.model_path
                )));
            }

            let path = config
                .model_path
                .to_str()
                .ok_or_else(|| JarvisError::ConfigError("Invalid model path".to_string()))?;

            let context =
                WhisperContext::new_with_params(path, WhisperContextParameters::default())
                    .map_err(|e| {
                        JarvisError::TranscriptionError(format!(
                            "Failed to load Whisper model: {:?}",
                            e
                        ))
                    })?;

            info!("Whisper model loaded successfully");
            Ok(Self { config, context })
        }
    }

    impl Transcriber for WhisperTranscriber {
        fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String> {
            let samples = resample::to_rate(samples, sample_rate, WHISPER_RATE)?;
            if samples.is_empty() {
                return Ok(String::new());
            }

            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_n_threads(self.config.n_threads);
            params.set_translate(false);
            params.set_print_timestamps(false);
            params.set_print_special(false);
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_language(Some(self.config.language.as_str()));

            let mut state = self.context.create_state().map_err(|e| {
                JarvisError::TranscriptionError(format!("Failed to create state: {:?}", e))
            })?;

            state.full(params, &samples).map_err(|e| {
                JarvisError::TranscriptionError(format!("Transcription failed: {:?}", e))
            })?;

            let num_segments = state.full_n_segments().map_err(|e| {
                JarvisError::TranscriptionError(format!("Failed to get segments: {:?}", e))
            })?;

            let mut text = String::new();
            for i in 0..num_segments {
                let segment = state.full_get_segment_text(i).map_err(|e| {
                    JarvisError::TranscriptionError(format!("Failed to get segment text: {:?}", e))
                })?;
                text.push_str(&segment);
            }

            let text = strip_annotations(&text);
            debug!("Transcription result: '{}'", text);
            Ok(text)
        }
    }
}
