//! Main window and eframe integration

use crate::session::SessionController;
use crate::ui::components::{Controls, ControlsAction, LogView, StatusLight};
use crate::ui::state::SurfaceState;
use crate::ui::theme::Theme;
use crate::utils::UiEvent;
use crossbeam_channel::Receiver;
use egui::{CentralPanel, RichText, TopBottomPanel};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

pub const WINDOW_TITLE: &str = "AI Voice Assistant";
/// How long closing the window waits for the session worker
pub const CLOSE_GRACE: Duration = Duration::from_millis(500);

pub struct JarvisApp {
    surface: SurfaceState,
    theme: Theme,
    events: Receiver<UiEvent>,
    controller: Arc<SessionController>,
}

impl JarvisApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        controller: Arc<SessionController>,
        events: Receiver<UiEvent>,
    ) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);
        Self::with_theme(controller, events, theme)
    }

    /// Build without an eframe context
    pub fn with_theme(
        controller: Arc<SessionController>,
        events: Receiver<UiEvent>,
        theme: Theme,
    ) -> Self {
        Self {
            surface: SurfaceState::new(),
            theme,
            events,
            controller,
        }
    }

    pub fn surface(&self) -> &SurfaceState {
        &self.surface
    }

    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    /// Apply queued events, advance the indicator and draw one frame
    pub fn frame(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.surface.drain(&self.events, now);
        self.surface.indicator.tick(now);

        let action = self.show(ctx);
        match action {
            Some(ControlsAction::Start) => {
                self.controller.start();
            }
            Some(ControlsAction::Stop) => {
                self.controller.stop();
            }
            None => {}
        }

        if let Some(deadline) = self.surface.indicator.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(Instant::now()));
        }
    }

    fn show(&mut self, ctx: &egui::Context) -> Option<ControlsAction> {
        let mut action = None;

        TopBottomPanel::bottom("controls")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(self.theme.spacing_lg),
            )
            .show(ctx, |ui| {
                action = Controls::new(self.surface.controls, &self.theme).show(ui);
            });

        CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(self.theme.spacing_lg);
                    ui.label(
                        RichText::new(WINDOW_TITLE)
                            .heading()
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.add_space(self.theme.spacing);
                    StatusLight::new(&self.surface.indicator, &self.theme).show(ui);
                    ui.add_space(self.theme.spacing);
                });
                LogView::new(&self.surface.log, &self.theme).show(ui);
            });

        action
    }
}

impl eframe::App for JarvisApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.frame(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!("Window closed, stopping session");
        self.controller.shutdown(CLOSE_GRACE);
    }
}
