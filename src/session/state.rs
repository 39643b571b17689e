//! Shared session state
//!
//! Written by the worker loop, the gate and the speech controller; read by
//! the UI and by tests. The observable [`SessionPhase`] is derived from the
//! flags so exactly one phase holds at any instant.

use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Lifecycle of the run loop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Stopping,
}

impl RunState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RunState::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    pub fn is_stopping(&self) -> bool {
        matches!(self, RunState::Stopping)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Idle => write!(f, "Idle"),
            RunState::Running => write!(f, "Running"),
            RunState::Stopping => write!(f, "Stopping"),
        }
    }
}

/// What the session is doing right now
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Running, waiting between steps
    Idle,
    Listening,
    Speaking,
    Dispatching,
    Stopping,
    /// No run loop
    Stopped,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "Idle"),
            SessionPhase::Listening => write!(f, "Listening"),
            SessionPhase::Speaking => write!(f, "Speaking"),
            SessionPhase::Dispatching => write!(f, "Dispatching"),
            SessionPhase::Stopping => write!(f, "Stopping"),
            SessionPhase::Stopped => write!(f, "Stopped"),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub run: RunState,
    pub mic_open: bool,
    /// Utterance currently playing
    pub speaking: Option<Uuid>,
    pub dispatching: bool,
    /// Transcripts routed through the dispatcher
    pub dispatch_count: u64,
    /// Loops spawned since startup
    pub loops_started: u64,
    /// Times the microphone and speech output were seen active together
    pub overlap_count: u64,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self.run {
            RunState::Idle => SessionPhase::Stopped,
            RunState::Stopping => SessionPhase::Stopping,
            RunState::Running if self.mic_open => SessionPhase::Listening,
            RunState::Running if self.speaking.is_some() => SessionPhase::Speaking,
            RunState::Running if self.dispatching => SessionPhase::Dispatching,
            RunState::Running => SessionPhase::Idle,
        }
    }

    fn check_overlap(&mut self) {
        if self.mic_open && self.speaking.is_some() {
            self.overlap_count += 1;
        }
    }
}

/// Thread-safe handle to [`SessionState`]
#[derive(Clone, Debug, Default)]
pub struct SharedSessionState {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedSessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, SessionState> {
        self.inner.read()
    }

    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, SessionState> {
        self.inner.write()
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.read().clone()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.read().phase()
    }

    pub fn run_state(&self) -> RunState {
        self.inner.read().run
    }

    /// Move Idle -> Running. Fails if a loop is running or stopping.
    pub fn try_begin_run(&self) -> bool {
        let mut state = self.inner.write();
        if !state.run.is_idle() {
            return false;
        }
        state.run = RunState::Running;
        state.loops_started += 1;
        true
    }

    /// Move Running -> Stopping. Returns whether the state changed.
    pub fn begin_stopping(&self) -> bool {
        let mut state = self.inner.write();
        if !state.run.is_running() {
            return false;
        }
        state.run = RunState::Stopping;
        true
    }

    pub fn finish_run(&self) {
        let mut state = self.inner.write();
        state.run = RunState::Idle;
        state.mic_open = false;
        state.dispatching = false;
    }

    pub fn mic_open(&self) -> bool {
        self.inner.read().mic_open
    }

    pub fn set_mic_open(&self, open: bool) {
        let mut state = self.inner.write();
        state.mic_open = open;
        state.check_overlap();
    }

    pub fn speaking(&self) -> Option<Uuid> {
        self.inner.read().speaking
    }

    pub fn set_speaking(&self, id: Uuid) {
        let mut state = self.inner.write();
        state.speaking = Some(id);
        state.check_overlap();
    }

    /// Clear the speaking flag if it still belongs to `id`
    pub fn clear_speaking(&self, id: Uuid) -> bool {
        let mut state = self.inner.write();
        if state.speaking == Some(id) {
            state.speaking = None;
            true
        } else {
            false
        }
    }

    pub fn begin_dispatch(&self) {
        let mut state = self.inner.write();
        state.dispatching = true;
        state.dispatch_count += 1;
    }

    pub fn end_dispatch(&self) {
        self.inner.write().dispatching = false;
    }

    pub fn dispatch_count(&self) -> u64 {
        self.inner.read().dispatch_count
    }

    pub fn loops_started(&self) -> u64 {
        self.inner.read().loops_started
    }

    pub fn overlap_count(&self) -> u64 {
        self.inner.read().overlap_count
    }
}
