//! Session Controller
//!
//! Owns the run loop: greeting, then capture -> dispatch until cancelled.
//! The loop runs on one worker thread per session and reaches the UI only
//! through [`UiSender`].

use crate::audio::{AudioInputGate, Microphone};
use crate::config::AssistantConfig;
use crate::dispatch::{Dispatcher, Transcript};
use crate::handlers::fun::greeting;
use crate::handlers::Handlers;
use crate::session::state::{RunState, SessionPhase, SharedSessionState};
use crate::speech::{Emotion, SpeechOutput, Synthesizer, Transcriber};
use crate::ui::indicator::IndicatorCommand;
use crate::ui::state::ControlsState;
use crate::utils::{CancelToken, UiEvent, UiSender};
use crate::{CaptureFailure, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const STOPPING_LOG: &str = "Stopping Jarvis...";
pub const TIMEOUT_LOG: &str = "Timeout waiting for speech.";
pub const MIC_INDEX_ERROR: &str =
    "Error: Microphone index is incorrect. Please check the configured device index.";

/// How long the farewell may play before cleanup
const FAREWELL_GRACE: Duration = Duration::from_secs(5);
/// Pause before reopening a microphone that just failed
const DEVICE_RETRY_DELAY: Duration = Duration::from_secs(2);
const JOIN_POLL: Duration = Duration::from_millis(10);

/// Collaborators for one run of the loop
pub struct SessionParts {
    pub microphone: Arc<dyn Microphone>,
    pub transcriber: Arc<dyn Transcriber>,
    pub handlers: Handlers,
}

/// Builds the per-run collaborators. Called on the worker thread, so it may
/// block (loading a model, probing devices).
pub trait SessionFactory: Send + Sync {
    fn build(&self, config: &AssistantConfig) -> Result<SessionParts>;
}

/// Everything needed to request a stop, shared by the controller and its
/// worker
#[derive(Clone)]
struct StopSignal {
    state: SharedSessionState,
    cancel: CancelToken,
    speech: Arc<SpeechOutput>,
    ui: UiSender,
}

impl StopSignal {
    fn fire(&self) -> bool {
        let first = self.state.begin_stopping();
        if first {
            self.ui.log(STOPPING_LOG);
        }
        self.cancel.cancel();
        self.speech.stop();
        self.ui.indicator(IndicatorCommand::Halt);
        first
    }
}

pub struct SessionController {
    config: Arc<AssistantConfig>,
    factory: Arc<dyn SessionFactory>,
    signal: StopSignal,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SessionController {
    /// `synth` is ignored when speech is disabled in `config`
    pub fn new(
        config: Arc<AssistantConfig>,
        factory: Arc<dyn SessionFactory>,
        synth: Option<Arc<dyn Synthesizer>>,
        ui: UiSender,
    ) -> Self {
        let state = SharedSessionState::new();
        let synth = synth.filter(|_| config.speech.enabled);
        let speech = SpeechOutput::new(synth, config.speech.baseline(), ui.clone(), state.clone())
            .with_stop_timeout(config.speech.stop_timeout());

        Self {
            config,
            factory,
            signal: StopSignal {
                state,
                cancel: CancelToken::new(),
                speech: Arc::new(speech),
                ui,
            },
            worker: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    pub fn speech(&self) -> &Arc<SpeechOutput> {
        &self.signal.speech
    }

    pub fn state(&self) -> &SharedSessionState {
        &self.signal.state
    }

    pub fn run_state(&self) -> RunState {
        self.signal.state.run_state()
    }

    pub fn phase(&self) -> SessionPhase {
        self.signal.state.phase()
    }

    pub fn is_running(&self) -> bool {
        self.run_state().is_running()
    }

    /// Spawn the run loop. Returns `false` without side effects if a loop is
    /// already running or stopping.
    pub fn start(&self) -> bool {
        if !self.signal.state.try_begin_run() {
            warn!("Start ignored, session is {}", self.run_state());
            return false;
        }

        let mut worker = self.worker.lock();
        // The previous loop has reached Idle, so this join is short
        if let Some(previous) = worker.take() {
            if previous.join().is_err() {
                warn!("Previous session worker panicked");
            }
        }

        self.signal.cancel.reset();
        self.signal.ui.controls(ControlsState::Running);

        let run = SessionRun {
            config: Arc::clone(&self.config),
            factory: Arc::clone(&self.factory),
            signal: self.signal.clone(),
        };
        match thread::Builder::new()
            .name("jarvis-session".into())
            .spawn(move || run.run())
        {
            Ok(handle) => {
                info!("Session started");
                *worker = Some(handle);
                true
            }
            Err(e) => {
                error!("Failed to spawn session worker: {}", e);
                self.signal.state.finish_run();
                self.signal.ui.controls(ControlsState::Idle);
                false
            }
        }
    }

    /// Request the loop to stop. Idempotent; an in-flight capture finishes
    /// on its own before the loop notices.
    pub fn stop(&self) -> bool {
        self.signal.fire()
    }

    /// Stop and wait up to `timeout` for the worker to exit.
    ///
    /// Returns `true` if no worker is left running.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.stop();
        let Some(handle) = self.worker.lock().take() else {
            return true;
        };

        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                warn!("Session worker still busy after {:?}, detaching", timeout);
                return false;
            }
            thread::sleep(JOIN_POLL);
        }
        if handle.join().is_err() {
            warn!("Session worker panicked");
        }
        true
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.signal.cancel.cancel();
    }
}

/// The worker side of one session
struct SessionRun {
    config: Arc<AssistantConfig>,
    factory: Arc<dyn SessionFactory>,
    signal: StopSignal,
}

impl SessionRun {
    fn run(self) {
        let parts = match self.factory.build(&self.config) {
            Ok(parts) => parts,
            Err(e) => {
                error!("Failed to build session: {}", e);
                self.signal.ui.log(format!("Failed to start Jarvis: {}", e));
                self.finish(None);
                return;
            }
        };

        let speech = Arc::clone(&self.signal.speech);
        let gate = AudioInputGate::new(
            Arc::clone(&speech),
            parts.microphone,
            parts.transcriber,
            self.signal.ui.clone(),
            self.signal.state.clone(),
            self.config.microphone.capture_settings(),
        );
        let mut dispatcher = Dispatcher::new(Arc::clone(&speech), parts.handlers);

        let now = dispatcher.handlers().clock.now();
        speech.speak(greeting(now), Emotion::Excited);
        self.signal.ui.indicator(IndicatorCommand::Pulse);

        let reply_grace = self.config.speech.reply_grace();
        let cancel = &self.signal.cancel;
        while !cancel.is_cancelled() {
            if !speech.wait_idle(reply_grace) {
                debug!("Reply still playing after {:?}, capture will cut it", reply_grace);
            }
            if cancel.is_cancelled() {
                break;
            }

            let transcript = match gate.capture() {
                Ok(transcript) => transcript,
                Err(failure) => {
                    self.report(failure);
                    continue;
                }
            };
            if cancel.is_cancelled() {
                debug!("Discarding {:?}, session is stopping", transcript.as_str());
                break;
            }
            if transcript.is_sentinel() {
                debug!("Sentinel {:?}, listening again", transcript.as_str());
                continue;
            }

            if self.dispatch(&mut dispatcher, &transcript) {
                speech.wait_idle(FAREWELL_GRACE);
                self.signal.fire();
                break;
            }
        }

        self.finish(Some(dispatcher));
    }

    /// Returns whether the loop should end
    fn dispatch(&self, dispatcher: &mut Dispatcher, transcript: &Transcript) -> bool {
        self.signal.state.begin_dispatch();
        let result = dispatcher.dispatch(transcript);
        self.signal.state.end_dispatch();
        result.is_exit()
    }

    fn report(&self, failure: CaptureFailure) {
        let speech = &self.signal.speech;
        match failure {
            CaptureFailure::DeviceError(detail) => {
                error!("[AUDIO] {}", detail);
                let text = if detail.contains("index") {
                    MIC_INDEX_ERROR.to_string()
                } else {
                    format!("Microphone error. Please check the audio input device. Error: {}", detail)
                };
                speech.speak(text, Emotion::Worry);
                self.pause(DEVICE_RETRY_DELAY);
            }
            CaptureFailure::Timeout => self.signal.ui.log(TIMEOUT_LOG),
            CaptureFailure::Unintelligible => debug!("Capture was unintelligible"),
            CaptureFailure::NetworkError(detail) => {
                warn!("Recognition failed: {}", detail);
                speech.speak(format!("Network error: {}", detail), Emotion::Worry);
            }
        }
    }

    /// Sleep that wakes early on cancellation
    fn pause(&self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.signal.cancel.is_cancelled() && Instant::now() < deadline {
            thread::sleep(JOIN_POLL * 5);
        }
    }

    fn finish(&self, dispatcher: Option<Dispatcher>) {
        self.signal.ui.indicator(IndicatorCommand::Halt);
        if let Some(mut dispatcher) = dispatcher {
            dispatcher.release();
        }
        self.signal.state.finish_run();
        self.signal.ui.controls(ControlsState::Idle);
        self.signal.ui.send(UiEvent::SessionEnded);
        info!("Session ended");
    }
}
