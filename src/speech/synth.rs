//! Text-to-speech backends

use crate::config::SpeechConfig;
use crate::speech::emotion::VoiceProfile;
use crate::utils::CancelToken;
use crate::{JarvisError, Result};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, info};
use wait_timeout::ChildExt;

/// How a playback ended
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Playback {
    Completed,
    Interrupted,
}

/// A speech engine that plays text aloud.
///
/// `speak` blocks the calling thread until playback ends and must return
/// promptly once `cancel` is set.
pub trait Synthesizer: Send + Sync {
    fn id(&self) -> &str;

    fn speak(&self, text: &str, profile: VoiceProfile, cancel: &CancelToken) -> Result<Playback>;
}

/// Synthesizer backed by the `espeak-ng` command line tool
pub struct EspeakSynthesizer {
    program: String,
    voice: Option<String>,
    poll_interval: Duration,
}

impl EspeakSynthesizer {
    pub fn new(config: &SpeechConfig) -> Self {
        Self {
            program: config.program.clone(),
            voice: config.voice.clone(),
            poll_interval: Duration::from_millis(20),
        }
    }

    /// Check that the engine can be started at all
    pub fn probe(&self) -> Result<()> {
        let mut child = Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                JarvisError::SynthesisError(format!("Failed to start {}: {}", self.program, e))
            })?;

        match child.wait_timeout(Duration::from_secs(2))? {
            Some(status) if status.success() => {
                info!("Speech engine available: {}", self.program);
                Ok(())
            }
            Some(status) => Err(JarvisError::SynthesisError(format!(
                "{} exited with {}",
                self.program, status
            ))),
            None => {
                let _ = child.kill();
                let _ = child.wait();
                Err(JarvisError::SynthesisError(format!(
                    "{} did not respond",
                    self.program
                )))
            }
        }
    }

    fn command(&self, text: &str, profile: VoiceProfile) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-s")
            .arg(profile.rate.max(80).to_string())
            .arg("-a")
            .arg(((profile.volume * 100.0).round() as i32).to_string());
        if let Some(ref voice) = self.voice {
            command.arg("-v").arg(voice);
        }
        command
            .arg("--")
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}

impl Synthesizer for EspeakSynthesizer {
    fn id(&self) -> &str {
        "espeak-ng"
    }

    fn speak(&self, text: &str, profile: VoiceProfile, cancel: &CancelToken) -> Result<Playback> {
        let mut child = self.command(text, profile).spawn().map_err(|e| {
            JarvisError::SynthesisError(format!("Failed to start {}: {}", self.program, e))
        })?;

        loop {
            if cancel.is_cancelled() {
                let _ = child.kill();
                let _ = child.wait();
                debug!("Speech process killed on cancel");
                return Ok(Playback::Interrupted);
            }

            match child.wait_timeout(self.poll_interval)? {
                Some(status) if status.success() => return Ok(Playback::Completed),
                Some(status) => {
                    let output = child.wait_with_output()?;
                    let err_msg = String::from_utf8_lossy(&output.stderr);
                    return Err(JarvisError::SynthesisError(format!(
                        "espeak error ({}): {}",
                        status,
                        err_msg.trim()
                    )));
                }
                None => continue,
            }
        }
    }
}
