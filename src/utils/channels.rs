//! Marshaling from worker threads to the UI context.
//!
//! The worker loop and utterance threads never touch UI state. They push
//! [`UiEvent`]s through a [`UiSender`]; the UI context drains the receiver
//! on its own schedule.

use crate::ui::indicator::IndicatorCommand;
use crate::ui::state::ControlsState;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Events delivered to the UI context
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    /// Append a line to the operator log
    Log(String),
    /// Change the status indicator phase
    Indicator(IndicatorCommand),
    /// An utterance began playback
    SpeechStarted(Uuid),
    /// An utterance ended, naturally or by interruption
    SpeechEnded(Uuid),
    /// Flip the start/stop affordances
    Controls(ControlsState),
    /// The run loop has exited and cleaned up
    SessionEnded,
}

type RepaintFn = Arc<dyn Fn() + Send + Sync>;

/// Cloneable handle used by background executions to reach the UI context
#[derive(Clone)]
pub struct UiSender {
    tx: Sender<UiEvent>,
    repaint: Option<RepaintFn>,
}

impl UiSender {
    /// Attach a callback that wakes the UI after each event
    pub fn with_repaint(mut self, repaint: impl Fn() + Send + Sync + 'static) -> Self {
        self.repaint = Some(Arc::new(repaint));
        self
    }

    pub fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            debug!("UI receiver dropped, event discarded");
            return;
        }
        if let Some(ref repaint) = self.repaint {
            repaint();
        }
    }

    pub fn log(&self, line: impl Into<String>) {
        self.send(UiEvent::Log(line.into()));
    }

    pub fn indicator(&self, command: IndicatorCommand) {
        self.send(UiEvent::Indicator(command));
    }

    pub fn controls(&self, state: ControlsState) {
        self.send(UiEvent::Controls(state));
    }
}

impl std::fmt::Debug for UiSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiSender")
            .field("repaint", &self.repaint.is_some())
            .finish()
    }
}

/// Create the UI event channel
pub fn ui_channel() -> (UiSender, Receiver<UiEvent>) {
    let (tx, rx) = unbounded();
    (UiSender { tx, repaint: None }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_events_arrive_in_order() {
        let (ui, rx) = ui_channel();
        ui.log("first");
        ui.indicator(IndicatorCommand::Pulse);
        ui.log("second");

        let events: Vec<UiEvent> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                UiEvent::Log("first".into()),
                UiEvent::Indicator(IndicatorCommand::Pulse),
                UiEvent::Log("second".into()),
            ]
        );
    }

    #[test]
    fn test_repaint_called_per_event() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let (ui, _rx) = ui_channel();
        let ui = ui.with_repaint(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        ui.log("a");
        ui.controls(ControlsState::Running);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (ui, rx) = ui_channel();
        drop(rx);
        // Must not panic
        ui.log("nobody listening");
    }
}
