//! Audio capture
//!
//! - `input`: microphone seam and the cpal backend
//! - `listener`: ambient calibration and phrase detection
//! - `gate`: one exclusive capture attempt
//! - `resample`: rate conversion for recognition

pub mod gate;
pub mod input;
pub mod listener;
#[cfg(feature = "whisper")]
pub mod resample;

pub use gate::{AudioInputGate, CaptureSettings};
pub use input::{AudioDeviceInfo, AudioSource, Microphone};
pub use listener::{ListenSettings, Phrase, PhraseListener};

#[cfg(feature = "audio-io")]
pub use input::{list_input_devices, CpalMicrophone};
