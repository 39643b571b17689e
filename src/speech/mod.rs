//! Speech input and output
//!
//! - `output`: the single-utterance controller with barge-in
//! - `synth`: text-to-speech backends
//! - `stt`: speech-to-text boundary

pub mod emotion;
pub mod output;
pub mod stt;
pub mod synth;

pub use emotion::{Emotion, VoiceBaseline, VoiceProfile};
pub use output::{CaptureHold, SpeechOutput, Utterance};
pub use stt::Transcriber;
pub use synth::{EspeakSynthesizer, Playback, Synthesizer};
