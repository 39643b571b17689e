//! Start/stop buttons

use crate::ui::state::ControlsState;
use crate::ui::theme::Theme;
use egui::{Button, Color32, RichText};

pub const STOP_LABEL: &str = "Stop Listening";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlsAction {
    Start,
    Stop,
}

pub struct Controls<'a> {
    state: ControlsState,
    theme: &'a Theme,
}

impl<'a> Controls<'a> {
    pub fn new(state: ControlsState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    /// Draw both buttons. Returns the button clicked this frame, if any.
    pub fn show(self, ui: &mut egui::Ui) -> Option<ControlsAction> {
        let mut action = None;
        ui.columns(2, |columns| {
            columns[0].vertical_centered(|ui| {
                let label = self.state.start_label();
                let response = self.button(
                    ui,
                    label,
                    self.state.start_enabled(),
                    self.theme.start,
                    self.theme.start_hover,
                );
                if response.clicked() {
                    action = Some(ControlsAction::Start);
                }
            });
            columns[1].vertical_centered(|ui| {
                let response = self.button(
                    ui,
                    STOP_LABEL,
                    self.state.stop_enabled(),
                    self.theme.stop,
                    self.theme.stop_hover,
                );
                if response.clicked() {
                    action = Some(ControlsAction::Stop);
                }
            });
        });
        action
    }

    fn button(
        &self,
        ui: &mut egui::Ui,
        label: &str,
        enabled: bool,
        fill: Color32,
        hover: Color32,
    ) -> egui::Response {
        let hovered = ui.rect_contains_pointer(ui.max_rect());
        let fill = match (enabled, hovered) {
            (false, _) => fill.gamma_multiply(0.4),
            (true, true) => hover,
            (true, false) => fill,
        };

        let button = Button::new(RichText::new(label).strong().color(Color32::WHITE))
            .fill(fill)
            .rounding(self.theme.button_rounding)
            .min_size(self.theme.button_size);
        let response = ui.add_enabled(enabled, button);
        response.widget_info(|| {
            egui::WidgetInfo::labeled(egui::WidgetType::Button, enabled, label)
        });
        response
    }
}
