//! Speech Output Controller
//!
//! Owns the single active utterance. A new `speak` supersedes whatever is
//! playing; `stop` interrupts it. Playback runs on its own thread so callers
//! never wait for audio to finish.

use crate::session::state::SharedSessionState;
use crate::speech::emotion::{Emotion, VoiceBaseline, VoiceProfile};
use crate::speech::synth::{Playback, Synthesizer};
use crate::utils::{CancelToken, UiEvent, UiSender};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const INTERRUPTED_LOG: &str = "Jarvis: Interrupted/Stopped talking.";

/// One discrete unit of synthesized speech
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    pub id: Uuid,
    pub text: String,
    pub profile: VoiceProfile,
}

impl Utterance {
    pub fn new(text: impl Into<String>, profile: VoiceProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            profile,
        }
    }
}

struct ActiveUtterance {
    utterance: Utterance,
    cancel: CancelToken,
    /// Disconnects when the playback thread exits
    done: Receiver<()>,
    finished: Arc<AtomicBool>,
}

impl ActiveUtterance {
    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Slot {
    active: Option<ActiveUtterance>,
    capturing: bool,
}

pub struct SpeechOutput {
    synth: Option<Arc<dyn Synthesizer>>,
    baseline: VoiceBaseline,
    slot: Mutex<Slot>,
    capture_released: Condvar,
    ui: UiSender,
    state: SharedSessionState,
    stop_timeout: Duration,
}

impl SpeechOutput {
    /// Create a controller. `None` runs it in log-only mode.
    pub fn new(
        synth: Option<Arc<dyn Synthesizer>>,
        baseline: VoiceBaseline,
        ui: UiSender,
        state: SharedSessionState,
    ) -> Self {
        match synth {
            Some(ref s) => info!("Speech output using {}", s.id()),
            None => warn!("No speech engine, responses will only be logged"),
        }
        Self {
            synth,
            baseline,
            slot: Mutex::new(Slot::default()),
            capture_released: Condvar::new(),
            ui,
            state,
            stop_timeout: Duration::from_millis(100),
        }
    }

    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn is_log_only(&self) -> bool {
        self.synth.is_none()
    }

    /// Speak `text` with the given emotion, superseding any active utterance.
    ///
    /// Blocks only while the microphone is held for a capture, and for at
    /// most the stop timeout while a predecessor quiesces.
    pub fn speak(&self, text: impl Into<String>, emotion: Emotion) -> Uuid {
        let utterance = Utterance::new(text, self.baseline.profile(emotion));
        let id = utterance.id;

        let mut slot = self.slot.lock();
        while slot.capturing {
            self.capture_released.wait(&mut slot);
        }

        if self.interrupt(&mut slot) {
            self.ui.log(INTERRUPTED_LOG);
        }

        self.ui.log(format!("Jarvis: {}", utterance.text));

        let Some(synth) = self.synth.clone() else {
            debug!("Log-only speech: {}", utterance.text);
            return id;
        };

        let cancel = CancelToken::new();
        let finished = Arc::new(AtomicBool::new(false));
        let (done_tx, done_rx) = bounded::<()>(0);

        self.state.set_speaking(id);
        self.ui.send(UiEvent::SpeechStarted(id));

        let spawned = {
            let cancel = cancel.clone();
            let finished = Arc::clone(&finished);
            let state = self.state.clone();
            let ui = self.ui.clone();
            let text = utterance.text.clone();
            let profile = utterance.profile;

            thread::Builder::new()
                .name("jarvis-utterance".into())
                .spawn(move || {
                    let _done = done_tx;
                    match synth.speak(&text, profile, &cancel) {
                        Ok(Playback::Completed) => debug!("Utterance {} completed", id),
                        Ok(Playback::Interrupted) => debug!("Utterance {} interrupted", id),
                        Err(e) => warn!("Speech playback failed: {}", e),
                    }
                    if state.clear_speaking(id) {
                        ui.send(UiEvent::SpeechEnded(id));
                    }
                    // Only after the flag is clear, so the mic may open
                    finished.store(true, Ordering::SeqCst);
                })
        };

        if let Err(e) = spawned {
            warn!("Failed to spawn speech thread: {}", e);
            if self.state.clear_speaking(id) {
                self.ui.send(UiEvent::SpeechEnded(id));
            }
            return id;
        }

        slot.active = Some(ActiveUtterance {
            utterance,
            cancel,
            done: done_rx,
            finished,
        });
        id
    }

    /// Interrupt the active utterance. Idempotent; returns whether anything
    /// was actually playing.
    pub fn stop(&self) -> bool {
        let mut slot = self.slot.lock();
        let interrupted = self.interrupt(&mut slot);
        if interrupted {
            self.ui.log(INTERRUPTED_LOG);
        }
        interrupted
    }

    /// The utterance currently playing, if any
    pub fn active_utterance(&self) -> Option<Utterance> {
        let slot = self.slot.lock();
        slot.active
            .as_ref()
            .filter(|a| !a.is_finished())
            .map(|a| a.utterance.clone())
    }

    pub fn is_speaking(&self) -> bool {
        self.active_utterance().is_some()
    }

    /// Wait for the active utterance to finish on its own.
    ///
    /// Returns `true` if nothing is playing at return.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let done = {
            let slot = self.slot.lock();
            match slot.active {
                Some(ref active) if !active.is_finished() => active.done.clone(),
                _ => return true,
            }
        };
        matches!(
            done.recv_timeout(timeout),
            Ok(()) | Err(RecvTimeoutError::Disconnected)
        )
    }

    /// Stop speech and keep new utterances from starting until the returned
    /// guard is dropped.
    pub fn hold_for_capture(&self) -> CaptureHold<'_> {
        let mut slot = self.slot.lock();
        if self.interrupt(&mut slot) {
            self.ui.log(INTERRUPTED_LOG);
        }
        slot.capturing = true;
        CaptureHold { output: self }
    }

    fn interrupt(&self, slot: &mut Slot) -> bool {
        let Some(active) = slot.active.take() else {
            return false;
        };
        if active.is_finished() {
            return false;
        }

        let id = active.utterance.id;
        active.cancel.cancel();
        if let Err(RecvTimeoutError::Timeout) = active.done.recv_timeout(self.stop_timeout) {
            debug!("Utterance {} did not quiesce within {:?}", id, self.stop_timeout);
        }
        if self.state.clear_speaking(id) {
            self.ui.send(UiEvent::SpeechEnded(id));
        }
        true
    }
}

/// Keeps speech output closed while the microphone is open
pub struct CaptureHold<'a> {
    output: &'a SpeechOutput,
}

impl Drop for CaptureHold<'_> {
    fn drop(&mut self) {
        let mut slot = self.output.slot.lock();
        slot.capturing = false;
        self.output.capture_released.notify_all();
    }
}
