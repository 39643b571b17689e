//! Headless surface
//!
//! Runs one session without a window. Log lines reach the terminal through
//! the tracing subscriber when [`SurfaceState`] applies them.

use crate::session::SessionController;
use crate::ui::state::SurfaceState;
use crate::utils::UiEvent;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{info, warn};

const POLL: Duration = Duration::from_millis(100);

/// Start a session and pump its events until it ends
pub fn run_headless(controller: &SessionController, events: &Receiver<UiEvent>) -> SurfaceState {
    let mut surface = SurfaceState::new();
    if !controller.start() {
        warn!("Session did not start");
        surface.drain(events, Instant::now());
        return surface;
    }

    loop {
        match events.recv_timeout(POLL) {
            Ok(event) => {
                let ended = event == UiEvent::SessionEnded;
                surface.apply(event, Instant::now());
                if ended {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Event channel closed");
                break;
            }
        }
    }

    surface.drain(events, Instant::now());
    info!("Headless session finished");
    surface
}
