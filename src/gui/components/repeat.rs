use eframe::egui;

use crate::config::ClickSettings;
use crate::gui::constants::*;

/// Renders the repeat mode selector; returns true if changes were made
pub fn ui(ui: &mut egui::Ui, settings: &mut ClickSettings) -> bool {
    let mut changed = false;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Click Repeat").strong());
        ui.add_space(ITEM_SPACING);

        let mut fixed = settings.uses_fixed_count();
        let mut count = settings.repeat_count;

        ui.horizontal(|ui| {
            changed |= ui.radio_value(&mut fixed, true, "Repeat").changed();
            let field = ui.add_enabled(
                fixed,
                egui::DragValue::new(&mut count).range(1..=1_000_000).speed(1.0),
            );
            changed |= field.changed();
            ui.label("times");
        });

        ui.horizontal(|ui| {
            ui.add_space(ITEM_SPACING * 3.0);
            for preset in REPEAT_PRESETS {
                if ui.add_enabled(fixed, egui::Button::new(preset.to_string()).small()).clicked() {
                    count = preset;
                    changed = true;
                }
            }
        });

        changed |= ui.radio_value(&mut fixed, false, "Repeat until stopped").changed();

        if changed {
            settings.set_repeat_count(count);
            settings.set_fixed_count(fixed);
        }
    });

    changed
}
