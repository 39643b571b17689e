//! Colors and styling for the assistant window

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};

#[derive(Clone, Debug)]
pub struct Theme {
    /// Window background
    pub bg_primary: Color32,
    /// Log box background
    pub bg_log: Color32,
    /// Button row background
    pub bg_secondary: Color32,

    pub text_primary: Color32,
    pub text_muted: Color32,

    pub start: Color32,
    pub start_hover: Color32,
    pub stop: Color32,
    pub stop_hover: Color32,

    pub button_rounding: Rounding,
    pub card_rounding: Rounding,

    /// Size of the start/stop buttons
    pub button_size: Vec2,
    /// Diameter of the status light
    pub light_size: f32,

    pub spacing: f32,
    pub spacing_lg: f32,
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg_primary: Color32::from_rgb(0x2b, 0x2b, 0x2b),
            bg_log: Color32::from_rgb(0x1e, 0x1e, 0x1e),
            bg_secondary: Color32::from_rgb(0x33, 0x33, 0x33),

            text_primary: Color32::from_rgb(0xe0, 0xe0, 0xe0),
            text_muted: Color32::from_rgb(0x9c, 0xa3, 0xaf),

            start: Color32::from_rgb(0x2e, 0xcc, 0x71),
            start_hover: Color32::from_rgb(0x27, 0xae, 0x60),
            stop: Color32::from_rgb(0xe7, 0x4c, 0x3c),
            stop_hover: Color32::from_rgb(0xc0, 0x39, 0x2b),

            button_rounding: Rounding::same(6.0),
            card_rounding: Rounding::same(8.0),

            button_size: Vec2::new(200.0, 40.0),
            light_size: 20.0,

            spacing: 10.0,
            spacing_lg: 20.0,
            spacing_sm: 6.0,
        }
    }

    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::dark();

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_log;

        visuals.widgets.noninteractive.bg_fill = self.bg_secondary;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_primary);
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_primary);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Color32::WHITE);
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);

        visuals.window_rounding = self.card_rounding;
        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.spacing_sm);
        style.spacing.button_padding = Vec2::new(self.spacing, self.spacing_sm);

        style.text_styles.insert(
            egui::TextStyle::Heading,
            FontId::new(32.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            FontId::new(14.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Monospace,
            FontId::new(14.0, FontFamily::Monospace),
        );
        style.text_styles.insert(
            egui::TextStyle::Button,
            FontId::new(14.0, FontFamily::Proportional),
        );

        ctx.set_style(style);
    }
}
