//! Audio Input Gate
//!
//! One capture attempt: silence speech output, open the microphone,
//! calibrate, record a phrase, transcribe. Failures come back as a
//! [`CaptureFailure`], never as a panic or another error type.

use crate::audio::input::{AudioSource, Microphone};
use crate::audio::listener::{ListenSettings, Phrase, PhraseListener};
use crate::dispatch::Transcript;
use crate::session::state::SharedSessionState;
use crate::speech::{SpeechOutput, Transcriber};
use crate::ui::indicator::IndicatorCommand;
use crate::utils::UiSender;
use crate::CaptureFailure;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptureSettings {
    pub device_index: usize,
    pub listen: ListenSettings,
}

pub struct AudioInputGate {
    speech: Arc<SpeechOutput>,
    microphone: Arc<dyn Microphone>,
    transcriber: Arc<dyn Transcriber>,
    ui: UiSender,
    state: SharedSessionState,
    settings: CaptureSettings,
}

impl AudioInputGate {
    pub fn new(
        speech: Arc<SpeechOutput>,
        microphone: Arc<dyn Microphone>,
        transcriber: Arc<dyn Transcriber>,
        ui: UiSender,
        state: SharedSessionState,
        settings: CaptureSettings,
    ) -> Self {
        Self {
            speech,
            microphone,
            transcriber,
            ui,
            state,
            settings,
        }
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Capture and transcribe one phrase.
    ///
    /// Leaves the indicator pulsing on return, except after a device error
    /// where it is halted.
    pub fn capture(&self) -> Result<Transcript, CaptureFailure> {
        let recorded = {
            // No utterance may start while the microphone is open
            let _hold = self.speech.hold_for_capture();
            self.ui
                .log(format!("Listening on device {}...", self.settings.device_index));
            self.record()
        };

        match recorded {
            Err(ref failure @ CaptureFailure::DeviceError(_)) => {
                warn!("[AUDIO] {}", failure);
                self.ui.indicator(IndicatorCommand::Halt);
            }
            _ => self.ui.indicator(IndicatorCommand::Pulse),
        }
        let phrase = recorded?;

        self.ui.log("Recognizing...");
        let text = self
            .transcriber
            .transcribe(&phrase.samples, phrase.sample_rate)
            .map_err(|e| CaptureFailure::NetworkError(e.detail().to_string()))?;

        let transcript = Transcript::new(&text);
        if transcript.is_empty() {
            debug!("Nothing intelligible in {:.2}s of audio", phrase.duration().as_secs_f32());
            return Err(CaptureFailure::Unintelligible);
        }

        self.ui.log(format!("You said: {}", text.trim()));
        Ok(transcript)
    }

    fn record(&self) -> Result<Phrase, CaptureFailure> {
        let mut source = self.microphone.open(self.settings.device_index)?;
        self.state.set_mic_open(true);
        let phrase = self.listen_on(source.as_mut());
        drop(source);
        self.state.set_mic_open(false);
        phrase
    }

    fn listen_on(&self, source: &mut dyn AudioSource) -> Result<Phrase, CaptureFailure> {
        let mut listener = PhraseListener::new(self.settings.listen.clone());
        listener.calibrate(source)?;
        self.ui.indicator(IndicatorCommand::Listening);
        listener.listen(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::listener::tests::ScriptedSource;
    use crate::speech::{Emotion, VoiceBaseline};
    use crate::utils::{ui_channel, UiEvent};
    use crate::{JarvisError, Result};
    use crossbeam_channel::Receiver;

    struct OneShotMic {
        segments: Vec<(f32, f32)>,
        fail: Option<CaptureFailure>,
    }

    impl Microphone for OneShotMic {
        fn open(&self, _device_index: usize) -> std::result::Result<Box<dyn AudioSource>, CaptureFailure> {
            if let Some(ref failure) = self.fail {
                return Err(failure.clone());
            }
            Ok(Box::new(ScriptedSource::new(16000, &self.segments)))
        }
    }

    struct FixedText(std::result::Result<String, JarvisError>);

    impl Transcriber for FixedText {
        fn transcribe(&self, _samples: &[f32], _rate: u32) -> Result<String> {
            self.0.clone()
        }
    }

    fn gate(mic: OneShotMic, text: std::result::Result<String, JarvisError>) -> (AudioInputGate, Receiver<UiEvent>) {
        let (ui, rx) = ui_channel();
        let state = SharedSessionState::new();
        let speech = Arc::new(SpeechOutput::new(
            None,
            VoiceBaseline::default(),
            ui.clone(),
            state.clone(),
        ));
        let settings = CaptureSettings {
            device_index: 2,
            listen: ListenSettings {
                dynamic_energy: false,
                ..ListenSettings::default()
            },
        };
        let gate = AudioInputGate::new(
            speech,
            Arc::new(mic),
            Arc::new(FixedText(text)),
            ui,
            state,
            settings,
        );
        (gate, rx)
    }

    fn speaking_mic() -> OneShotMic {
        OneShotMic {
            segments: vec![(1.0, 0.0), (1.0, 0.3), (1.5, 0.0)],
            fail: None,
        }
    }

    fn indicator_commands(rx: &Receiver<UiEvent>) -> Vec<IndicatorCommand> {
        rx.try_iter()
            .filter_map(|e| match e {
                UiEvent::Indicator(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_successful_capture() {
        let (gate, rx) = gate(speaking_mic(), Ok("What Time Is It?".into()));
        let transcript = gate.capture().unwrap();
        assert_eq!(transcript.as_str(), "what time is it");

        let events: Vec<UiEvent> = rx.try_iter().collect();
        assert_eq!(events[0], UiEvent::Log("Listening on device 2...".into()));
        assert!(events.contains(&UiEvent::Indicator(IndicatorCommand::Listening)));
        assert!(events.contains(&UiEvent::Log("Recognizing...".into())));
        assert!(events.contains(&UiEvent::Log("You said: What Time Is It?".into())));

        // Pulse restored after the listening phase
        let listening = events
            .iter()
            .position(|e| *e == UiEvent::Indicator(IndicatorCommand::Listening))
            .unwrap();
        let pulse = events
            .iter()
            .position(|e| *e == UiEvent::Indicator(IndicatorCommand::Pulse))
            .unwrap();
        assert!(pulse > listening);
        assert!(!gate.state.mic_open());
    }

    #[test]
    fn test_device_error_halts_indicator() {
        let mic = OneShotMic {
            segments: vec![],
            fail: Some(CaptureFailure::DeviceError("index 2".into())),
        };
        let (gate, rx) = gate(mic, Ok(String::new()));
        assert!(gate.capture().unwrap_err().is_device_error());
        assert_eq!(indicator_commands(&rx), vec![IndicatorCommand::Halt]);
    }

    #[test]
    fn test_timeout_restores_pulse() {
        let mic = OneShotMic {
            segments: vec![(7.0, 0.0)],
            fail: None,
        };
        let (gate, rx) = gate(mic, Ok("unused".into()));
        assert_eq!(gate.capture().unwrap_err(), CaptureFailure::Timeout);
        assert_eq!(
            indicator_commands(&rx),
            vec![IndicatorCommand::Listening, IndicatorCommand::Pulse]
        );
    }

    #[test]
    fn test_empty_transcription_is_unintelligible() {
        let (gate, _rx) = gate(speaking_mic(), Ok("  ".into()));
        assert_eq!(gate.capture().unwrap_err(), CaptureFailure::Unintelligible);
    }

    #[test]
    fn test_recognizer_failure_is_network_error() {
        let (gate, _rx) = gate(
            speaking_mic(),
            Err(JarvisError::NetworkError("unreachable".into())),
        );
        assert!(matches!(gate.capture(), Err(CaptureFailure::NetworkError(_))));
    }

    #[test]
    fn test_capture_between_log_only_utterances() {
        let (gate, _rx) = gate(speaking_mic(), Ok("hello".into()));
        // Playback being cut is covered by the session tests
        gate.speech.speak("before", Emotion::Normal);
        assert!(gate.capture().is_ok());
        gate.speech.speak("after", Emotion::Normal);
    }
}
