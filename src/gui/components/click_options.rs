//! Interval, mouse button and click type controls

use eframe::egui;

use crate::config::ClickSettings;
use crate::constants::validation;
use crate::gui::constants::*;
use crate::types::{ClickType, MouseButton};

/// Renders the click interval and options; returns true if changes were made
pub fn ui(ui: &mut egui::Ui, settings: &mut ClickSettings) -> bool {
    let mut changed = false;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Click Interval").strong());
        ui.add_space(ITEM_SPACING);

        let interval = &mut settings.interval;
        ui.horizontal(|ui| {
            changed |= interval_field(ui, &mut interval.hours, validation::MAX_HOURS, "hrs");
            changed |= interval_field(ui, &mut interval.minutes, validation::MAX_MINUTES, "min");
            changed |= interval_field(ui, &mut interval.seconds, validation::MAX_SECONDS, "sec");
            changed |= interval_field(ui, &mut interval.millis, validation::MAX_MILLIS, "ms");
        });

        if settings.interval.is_zero() {
            ui.colored_label(STATUS_WARNING, "Interval must be greater than zero");
        }
    });

    ui.add_space(SECTION_SPACING);

    ui.group(|ui| {
        ui.label(egui::RichText::new("Click Options").strong());
        ui.add_space(ITEM_SPACING);

        egui::Grid::new("click_options_grid")
            .num_columns(2)
            .spacing([ITEM_SPACING * 2.0, ITEM_SPACING])
            .show(ui, |ui| {
                ui.label("Mouse button:");
                egui::ComboBox::from_id_salt("mouse_button")
                    .selected_text(settings.button.label())
                    .show_ui(ui, |ui| {
                        for button in MouseButton::ALL {
                            changed |= ui
                                .selectable_value(&mut settings.button, button, button.label())
                                .changed();
                        }
                    });
                ui.end_row();

                ui.label("Click type:");
                egui::ComboBox::from_id_salt("click_type")
                    .selected_text(settings.click_type.label())
                    .show_ui(ui, |ui| {
                        for click_type in ClickType::ALL {
                            changed |= ui
                                .selectable_value(&mut settings.click_type, click_type, click_type.label())
                                .changed();
                        }
                    });
                ui.end_row();
            });
    });

    changed
}

fn interval_field(ui: &mut egui::Ui, value: &mut u32, max: u32, unit: &str) -> bool {
    let changed = ui
        .add(egui::DragValue::new(value).range(0..=max).speed(1.0))
        .changed();
    ui.label(egui::RichText::new(unit).color(TEXT_MUTED));
    changed
}
