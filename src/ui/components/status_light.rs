//! Status light
//!
//! Paints the indicator's current colour. All timing lives in
//! [`StatusIndicator`]; this only draws.

use crate::ui::indicator::{IndicatorPhase, StatusIndicator};
use crate::ui::theme::Theme;
use egui::{Sense, Vec2};

pub fn phase_label(phase: IndicatorPhase) -> &'static str {
    match phase {
        IndicatorPhase::Off => "Status: off",
        IndicatorPhase::Ready => "Status: ready",
        IndicatorPhase::Listening => "Status: listening",
        IndicatorPhase::Speaking => "Status: speaking",
    }
}

pub struct StatusLight<'a> {
    indicator: &'a StatusIndicator,
    theme: &'a Theme,
}

impl<'a> StatusLight<'a> {
    pub fn new(indicator: &'a StatusIndicator, theme: &'a Theme) -> Self {
        Self { indicator, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let size = Vec2::splat(self.theme.light_size);
        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());

        if ui.is_rect_visible(rect) {
            let color = self.indicator.color();
            ui.painter()
                .circle_filled(rect.center(), self.theme.light_size / 4.0, color);
        }

        let label = phase_label(self.indicator.phase());
        response.widget_info(|| egui::WidgetInfo::labeled(egui::WidgetType::Label, true, label));
        response
    }
}
