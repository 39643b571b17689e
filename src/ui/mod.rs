//! User interface
//!
//! The egui window and the headless console share [`state::SurfaceState`],
//! which is the only place UI-side state changes.

mod app;
pub mod components;
pub mod console;
pub mod indicator;
pub mod state;
mod theme;

pub use app::{JarvisApp, CLOSE_GRACE, WINDOW_TITLE};
pub use console::run_headless;
pub use indicator::{IndicatorCommand, IndicatorPhase, StatusIndicator};
pub use state::{ControlsState, SurfaceState};
pub use theme::Theme;

use crate::config::AssistantConfig;
use crate::session::{SessionController, SessionFactory};
use crate::speech::Synthesizer;
use crate::utils::ui_channel;
use std::sync::Arc;

/// Open the assistant window and block until it closes
pub fn run(
    config: Arc<AssistantConfig>,
    factory: Arc<dyn SessionFactory>,
    synth: Option<Arc<dyn Synthesizer>>,
) -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([480.0, 360.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| {
            let ctx = cc.egui_ctx.clone();
            let (ui, events) = ui_channel();
            let ui = ui.with_repaint(move || ctx.request_repaint());
            let controller = Arc::new(SessionController::new(config, factory, synth, ui));
            Ok(Box::new(JarvisApp::new(cc, controller, events)))
        }),
    )
}
