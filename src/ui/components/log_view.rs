//! Scrolling operator log

use crate::ui::theme::Theme;
use egui::{RichText, ScrollArea};
use std::collections::VecDeque;

pub struct LogView<'a> {
    lines: &'a VecDeque<String>,
    theme: &'a Theme,
}

impl<'a> LogView<'a> {
    pub fn new(lines: &'a VecDeque<String>, theme: &'a Theme) -> Self {
        Self { lines, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.bg_log)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt("log_view")
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        if self.lines.is_empty() {
                            ui.label(
                                RichText::new("Press Start Listening to begin.")
                                    .monospace()
                                    .color(self.theme.text_muted),
                            );
                            return;
                        }
                        for line in self.lines {
                            let response = ui.add(
                                egui::Label::new(
                                    RichText::new(line)
                                        .monospace()
                                        .color(self.theme.text_primary),
                                )
                                .wrap(),
                            );
                            response.widget_info(|| {
                                egui::WidgetInfo::labeled(
                                    egui::WidgetType::Label,
                                    true,
                                    format!("Log: {}", line),
                                )
                            });
                        }
                    });
            });
    }
}
