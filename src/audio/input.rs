//! Microphone access
//!
//! [`Microphone`] opens an input device by index and yields mono sample
//! blocks. The cpal-backed implementation lives behind the `audio-io`
//! feature.

use crate::CaptureFailure;
use std::time::Duration;

/// An open input stream. Dropping it closes the device.
pub trait AudioSource {
    fn sample_rate(&self) -> u32;

    /// Next block of mono samples.
    ///
    /// `Ok(None)` means nothing arrived within `timeout`; an error means the
    /// stream has failed and the capture should be abandoned.
    fn next_chunk(&mut self, timeout: Duration) -> Result<Option<Vec<f32>>, CaptureFailure>;
}

pub trait Microphone: Send + Sync {
    fn open(&self, device_index: usize) -> Result<Box<dyn AudioSource>, CaptureFailure>;
}

/// Audio input device information
#[derive(Debug, Clone)]
pub struct AudioDeviceInfo {
    pub index: usize,
    pub name: String,
    pub is_default: bool,
}

#[cfg(feature = "audio-io")]
pub use cpal_backend::{list_input_devices, CpalMicrophone};

#[cfg(feature = "audio-io")]
mod cpal_backend {
    use super::{AudioDeviceInfo, AudioSource, Microphone};
    use crate::CaptureFailure;
    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use cpal::{Stream, StreamConfig};
    use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tracing::{debug, error, info, warn};

    /// Microphone on the default cpal host
    #[derive(Debug, Default)]
    pub struct CpalMicrophone;

    impl CpalMicrophone {
        pub fn new() -> Self {
            Self
        }
    }

    impl Microphone for CpalMicrophone {
        fn open(&self, device_index: usize) -> Result<Box<dyn AudioSource>, CaptureFailure> {
            let host = cpal::default_host();
            let device = host
                .input_devices()
                .map_err(|e| CaptureFailure::DeviceError(format!("Failed to list devices: {}", e)))?
                .nth(device_index)
                .ok_or_else(|| {
                    CaptureFailure::DeviceError(format!(
                        "Microphone index {} is incorrect",
                        device_index
                    ))
                })?;

            let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());
            let supported = device.default_input_config().map_err(|e| {
                CaptureFailure::DeviceError(format!("Failed to get input config: {}", e))
            })?;
            let config: StreamConfig = supported.into();
            let sample_rate = config.sample_rate.0;
            let channels = config.channels as usize;

            info!(
                "[AUDIO] Opening {} ({}Hz, {} channel(s))",
                device_name, sample_rate, channels
            );

            let (tx, rx) = bounded(256);
            let failed = Arc::new(AtomicBool::new(false));
            let failed_flag = Arc::clone(&failed);

            let stream = device
                .build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        let samples = if channels == 1 {
                            data.to_vec()
                        } else {
                            data.chunks(channels)
                                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                                .collect()
                        };
                        if let Err(e) = tx.try_send(samples) {
                            warn!("[AUDIO] Dropped input block: {}", e);
                        }
                    },
                    move |err| {
                        error!("[AUDIO] Input stream error: {}", err);
                        failed_flag.store(true, Ordering::SeqCst);
                    },
                    None,
                )
                .map_err(|e| {
                    CaptureFailure::DeviceError(format!("Failed to build input stream: {}", e))
                })?;

            stream.play().map_err(|e| {
                CaptureFailure::DeviceError(format!("Failed to start input stream: {}", e))
            })?;

            Ok(Box::new(CpalSource {
                _stream: stream,
                rx,
                sample_rate,
                failed,
            }))
        }
    }

    struct CpalSource {
        _stream: Stream,
        rx: Receiver<Vec<f32>>,
        sample_rate: u32,
        failed: Arc<AtomicBool>,
    }

    impl AudioSource for CpalSource {
        fn sample_rate(&self) -> u32 {
            self.sample_rate
        }

        fn next_chunk(&mut self, timeout: Duration) -> Result<Option<Vec<f32>>, CaptureFailure> {
            if self.failed.load(Ordering::SeqCst) {
                return Err(CaptureFailure::DeviceError("Input stream failed".into()));
            }
            match self.rx.recv_timeout(timeout) {
                Ok(samples) => Ok(Some(samples)),
                Err(RecvTimeoutError::Timeout) => Ok(None),
                Err(RecvTimeoutError::Disconnected) => {
                    Err(CaptureFailure::DeviceError("Input stream closed".into()))
                }
            }
        }
    }

    impl Drop for CpalSource {
        fn drop(&mut self) {
            debug!("[AUDIO] Input stream closed");
        }
    }

    /// List available audio input devices with the index `open` expects
    pub fn list_input_devices() -> Vec<AudioDeviceInfo> {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        host.input_devices()
            .map(|devices| {
                devices
                    .enumerate()
                    .filter_map(|(index, device)| {
                        let name = device.name().ok()?;
                        let is_default = default_name.as_deref() == Some(name.as_str());
                        Some(AudioDeviceInfo {
                            index,
                            name,
                            is_default,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

}
