//! Click target selector and the saved locations viewer

use eframe::egui;

use crate::config::ClickSettings;
use crate::gui::constants::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAction {
    None,
    OpenPicker,
    DryRun,
}

pub struct TargetState {
    show_locations: bool,
}

impl TargetState {
    pub fn new() -> Self {
        Self { show_locations: false }
    }
}

impl Default for TargetState {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders the target selector; edits to the list itself go straight into
/// `settings`, picker and preview requests come back as a [`TargetAction`]
pub fn ui(
    ui: &mut egui::Ui,
    settings: &mut ClickSettings,
    state: &mut TargetState,
    changed: &mut bool,
) -> TargetAction {
    let mut action = TargetAction::None;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Click Position").strong());
        ui.add_space(ITEM_SPACING);

        let mut fixed = settings.uses_fixed_locations();
        let before = fixed;
        ui.radio_value(&mut fixed, false, "Current cursor position");
        ui.radio_value(&mut fixed, true, "Pick locations");
        if fixed != before {
            settings.set_fixed_locations(fixed);
            *changed = true;
        }

        let count = settings.locations().len();
        ui.horizontal(|ui| {
            if ui.button("\u{2316} Pick Locations").clicked() {
                action = TargetAction::OpenPicker;
            }
            if ui.add_enabled(count > 0, egui::Button::new("\u{25B6} Dry Run")).clicked() {
                action = TargetAction::DryRun;
            }
            let label = if state.show_locations { "Hide" } else { "View" };
            if ui.add_enabled(count > 0, egui::Button::new(label)).clicked() {
                state.show_locations = !state.show_locations;
            }
        });

        let summary = match count {
            0 => "No locations saved".to_string(),
            1 => "1 location saved".to_string(),
            n => format!("{n} locations saved"),
        };
        let color = if fixed && count == 0 { STATUS_WARNING } else { TEXT_MUTED };
        ui.colored_label(color, summary);

        if state.show_locations && count > 0 {
            ui.add_space(ITEM_SPACING);
            *changed |= locations_list(ui, settings);
        }
    });

    action
}

fn locations_list(ui: &mut egui::Ui, settings: &mut ClickSettings) -> bool {
    let mut remove = None;
    let mut clear = false;

    egui::ScrollArea::vertical()
        .id_salt("locations_list")
        .max_height(140.0)
        .show(ui, |ui| {
            for (index, point) in settings.locations().iter().enumerate() {
                let number = index + 1;
                ui.horizontal(|ui| {
                    ui.colored_label(dot_color(number), "\u{25CF}");
                    ui.label(format!("#{number}  X: {}  Y: {}", point.x, point.y));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("\u{2715}").on_hover_text("Remove").clicked() {
                            remove = Some(index);
                        }
                    });
                });
            }
        });

    if ui.button("Clear All").clicked() {
        clear = true;
    }

    if clear {
        settings.locations_mut().clear();
        return true;
    }
    if let Some(index) = remove {
        settings.locations_mut().remove(index);
        return true;
    }
    false
}
