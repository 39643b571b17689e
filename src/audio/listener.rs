//! Energy-threshold phrase detection
//!
//! Calibrates against ambient noise, waits for speech to begin, then records
//! until a pause or the phrase limit. Elapsed time is measured in samples so
//! the result does not depend on how the device batches its callbacks.

use crate::audio::input::AudioSource;
use crate::CaptureFailure;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::debug;

const POLL: Duration = Duration::from_millis(250);
/// Extra wall-clock allowance before a silent device counts as timed out
const STALL_GRACE: Duration = Duration::from_secs(1);
/// Audio kept from before the onset so the first syllable is not clipped
const PRE_ROLL_SECS: f32 = 0.3;

#[derive(Clone, Debug, PartialEq)]
pub struct ListenSettings {
    /// How long to wait for speech to begin
    pub timeout: Duration,
    /// Longest phrase recorded
    pub phrase_limit: Duration,
    /// Silence that ends a phrase
    pub pause_threshold: Duration,
    /// Ambient calibration window
    pub calibration: Duration,
    /// Starting RMS threshold
    pub energy_threshold: f32,
    /// Adapt the threshold to ambient noise during calibration
    pub dynamic_energy: bool,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(10),
            pause_threshold: Duration::from_secs_f32(1.0),
            calibration: Duration::from_secs(1),
            energy_threshold: 0.01,
            dynamic_energy: true,
        }
    }
}

/// A recorded phrase
#[derive(Clone, Debug)]
pub struct Phrase {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Phrase {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f32(self.samples.len() as f32 / self.sample_rate.max(1) as f32)
    }
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}

pub struct PhraseListener {
    settings: ListenSettings,
    threshold: f32,
}

impl PhraseListener {
    pub fn new(settings: ListenSettings) -> Self {
        let threshold = settings.energy_threshold;
        Self {
            settings,
            threshold,
        }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Adjust the energy threshold to the ambient level
    pub fn calibrate(&mut self, source: &mut dyn AudioSource) -> Result<(), CaptureFailure> {
        if !self.settings.dynamic_energy {
            return Ok(());
        }

        let rate = source.sample_rate().max(1) as f32;
        let wanted = self.settings.calibration.as_secs_f32();
        let started = Instant::now();
        let mut heard = 0.0f32;

        while heard < wanted {
            if started.elapsed() > self.settings.calibration + STALL_GRACE {
                break;
            }
            let Some(chunk) = source.next_chunk(POLL)? else {
                continue;
            };
            let secs = chunk.len() as f32 / rate;
            heard += secs;

            let damping = 0.15f32.powf(secs);
            let target = rms(&chunk) * 1.5;
            self.threshold = self.threshold * damping + target * (1.0 - damping);
        }

        debug!("[AUDIO] Calibrated energy threshold: {:.5}", self.threshold);
        Ok(())
    }

    /// Record one phrase
    pub fn listen(&self, source: &mut dyn AudioSource) -> Result<Phrase, CaptureFailure> {
        let sample_rate = source.sample_rate().max(1);
        let rate = sample_rate as f32;
        let timeout = self.settings.timeout.as_secs_f32();
        let limit = self.settings.phrase_limit.as_secs_f32();
        let pause = self.settings.pause_threshold.as_secs_f32();

        let mut pre_roll: VecDeque<Vec<f32>> = VecDeque::new();
        let mut pre_roll_len = 0usize;
        let max_pre_roll = (PRE_ROLL_SECS * rate) as usize;

        let wait_started = Instant::now();
        let mut waited = 0.0f32;

        // Wait for onset
        let mut samples = loop {
            if waited >= timeout || wait_started.elapsed() > self.settings.timeout + STALL_GRACE {
                return Err(CaptureFailure::Timeout);
            }
            let Some(chunk) = source.next_chunk(POLL)? else {
                continue;
            };
            waited += chunk.len() as f32 / rate;

            if rms(&chunk) > self.threshold {
                let mut samples: Vec<f32> = pre_roll.drain(..).flatten().collect();
                samples.extend_from_slice(&chunk);
                break samples;
            }

            pre_roll_len += chunk.len();
            pre_roll.push_back(chunk);
            while pre_roll_len > max_pre_roll {
                match pre_roll.pop_front() {
                    Some(old) => pre_roll_len -= old.len(),
                    None => break,
                }
            }
        };

        // Record until pause or limit
        let phrase_started = Instant::now();
        let mut spoken = 0.0f32;
        let mut silence = 0.0f32;
        while spoken < limit && silence < pause {
            if phrase_started.elapsed() > self.settings.phrase_limit + STALL_GRACE {
                break;
            }
            let Some(chunk) = source.next_chunk(POLL)? else {
                continue;
            };
            let secs = chunk.len() as f32 / rate;
            spoken += secs;
            if rms(&chunk) > self.threshold {
                silence = 0.0;
            } else {
                silence += secs;
            }
            samples.extend_from_slice(&chunk);
        }

        debug!(
            "[AUDIO] Phrase captured: {:.2}s",
            samples.len() as f32 / rate
        );
        Ok(Phrase {
            samples,
            sample_rate,
        })
    }
}
