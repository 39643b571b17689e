//! UI-side state
//!
//! Everything here is owned by the UI context and only changes through
//! [`SurfaceState::apply`].

use crate::ui::indicator::StatusIndicator;
use crate::utils::UiEvent;
use crossbeam_channel::Receiver;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::info;

const MAX_LOG_LINES: usize = 500;

/// Start/stop affordances
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlsState {
    #[default]
    Idle,
    Running,
}

impl ControlsState {
    pub fn start_enabled(&self) -> bool {
        matches!(self, ControlsState::Idle)
    }

    pub fn stop_enabled(&self) -> bool {
        matches!(self, ControlsState::Running)
    }

    pub fn start_label(&self) -> &'static str {
        match self {
            ControlsState::Idle => "Start Listening",
            ControlsState::Running => "Initializing...",
        }
    }
}

#[derive(Debug, Default)]
pub struct SurfaceState {
    pub log: VecDeque<String>,
    pub indicator: StatusIndicator,
    pub controls: ControlsState,
    pub sessions_ended: u64,
}

impl SurfaceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: UiEvent, now: Instant) {
        match event {
            UiEvent::Log(line) => self.push_log(line),
            UiEvent::Indicator(command) => self.indicator.apply(command, now),
            UiEvent::SpeechStarted(id) => self.indicator.speech_started(id),
            UiEvent::SpeechEnded(id) => self.indicator.speech_ended(id, now),
            UiEvent::Controls(controls) => self.controls = controls,
            UiEvent::SessionEnded => {
                self.controls = ControlsState::Idle;
                self.sessions_ended += 1;
            }
        }
    }

    /// Apply every queued event. Returns how many were applied.
    pub fn drain(&mut self, rx: &Receiver<UiEvent>, now: Instant) -> usize {
        let mut applied = 0;
        while let Ok(event) = rx.try_recv() {
            self.apply(event, now);
            applied += 1;
        }
        applied
    }

    fn push_log(&mut self, line: String) {
        info!("{}", line);
        if self.log.len() == MAX_LOG_LINES {
            self.log.pop_front();
        }
        self.log.push_back(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::indicator::{IndicatorCommand, IndicatorPhase};
    use crate::utils::ui_channel;

    #[test]
    fn test_controls_labels() {
        assert!(ControlsState::Idle.start_enabled());
        assert!(!ControlsState::Idle.stop_enabled());
        assert_eq!(ControlsState::Running.start_label(), "Initializing...");
        assert!(ControlsState::Running.stop_enabled());
    }

    #[test]
    fn test_drain_applies_in_order() {
        let (ui, rx) = ui_channel();
        ui.controls(ControlsState::Running);
        ui.indicator(IndicatorCommand::Pulse);
        ui.log("Jarvis: hello");
        ui.send(UiEvent::SessionEnded);

        let mut surface = SurfaceState::new();
        assert_eq!(surface.drain(&rx, Instant::now()), 4);
        assert_eq!(surface.controls, ControlsState::Idle);
        assert_eq!(surface.indicator.phase(), IndicatorPhase::Ready);
        assert_eq!(surface.log.back().map(String::as_str), Some("Jarvis: hello"));
        assert_eq!(surface.sessions_ended, 1);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut surface = SurfaceState::new();
        for i in 0..(MAX_LOG_LINES + 10) {
            surface.apply(UiEvent::Log(format!("line {}", i)), Instant::now());
        }
        assert_eq!(surface.log.len(), MAX_LOG_LINES);
        assert_eq!(surface.log.front().map(String::as_str), Some("line 10"));
    }
}
