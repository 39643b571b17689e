//! Emotion-driven voice modulation

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Rate and volume applied to a single utterance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceProfile {
    /// Words per minute
    pub rate: i32,
    /// 0.0 ..= 1.0
    pub volume: f32,
}

/// Emotional colouring of an utterance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    #[default]
    Normal,
    Excited,
    Happy,
    Worry,
}

impl Emotion {
    /// Rate offset relative to the baseline
    pub fn rate_offset(&self) -> i32 {
        match self {
            Emotion::Normal => 0,
            Emotion::Excited => 40,
            Emotion::Happy => 20,
            Emotion::Worry => -40,
        }
    }

    /// Absolute volume override, if any
    pub fn volume_override(&self) -> Option<f32> {
        match self {
            Emotion::Worry => Some(0.65),
            Emotion::Excited | Emotion::Happy => Some(1.0),
            Emotion::Normal => None,
        }
    }
}

impl FromStr for Emotion {
    type Err = std::convert::Infallible;

    /// Unknown names fall back to `Normal`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "excited" => Emotion::Excited,
            "happy" => Emotion::Happy,
            "worry" => Emotion::Worry,
            _ => Emotion::Normal,
        })
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Emotion::Normal => write!(f, "normal"),
            Emotion::Excited => write!(f, "excited"),
            Emotion::Happy => write!(f, "happy"),
            Emotion::Worry => write!(f, "worry"),
        }
    }
}

/// Baseline voice every utterance starts from
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoiceBaseline {
    pub rate: i32,
    pub volume: f32,
}

impl Default for VoiceBaseline {
    fn default() -> Self {
        Self {
            rate: 180,
            volume: 1.0,
        }
    }
}

impl VoiceBaseline {
    /// Profile for one utterance. Always derived from the baseline, never
    /// from the previous utterance.
    pub fn profile(&self, emotion: Emotion) -> VoiceProfile {
        VoiceProfile {
            rate: self.rate + emotion.rate_offset(),
            volume: emotion.volume_override().unwrap_or(self.volume).clamp(0.0, 1.0),
        }
    }
}
