//! Hotkey, notification and update settings

use eframe::egui;

use crate::config::ClickSettings;
use crate::constants::app;
use crate::controller::UpdateState;
use crate::error::HotkeyError;
use crate::gui::constants::*;
use crate::types::{FirstClick, HotkeyCombo, Modifiers};
use crate::updater::UpdateStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
    None,
    Rebind(HotkeyCombo),
    CheckUpdates,
}

/// Read-only status the panel displays
pub struct SettingsStatus<'a> {
    pub active_hotkey: Option<&'a HotkeyCombo>,
    pub hotkey_error: Option<&'a HotkeyError>,
    pub hotkey_notice: Option<&'a str>,
    pub update: &'a UpdateState,
}

pub struct SettingsPanelState {
    capturing: bool,
    combo_text: String,
    parse_error: Option<String>,
}

impl SettingsPanelState {
    pub fn new() -> Self {
        Self { capturing: false, combo_text: String::new(), parse_error: None }
    }
}

impl Default for SettingsPanelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a combo from a key press seen by the window
///
/// Super can't be observed through egui on X11; it is only reachable by
/// typing the combo.
pub fn combo_from_key(key: egui::Key, modifiers: egui::Modifiers) -> Option<HotkeyCombo> {
    let mods = Modifiers {
        ctrl: modifiers.ctrl,
        shift: modifiers.shift,
        alt: modifiers.alt,
        super_key: false,
    };
    HotkeyCombo::new(mods, key.name()).ok()
}

fn captured_combo(ui: &egui::Ui) -> Option<Result<HotkeyCombo, ()>> {
    ui.input(|i| {
        i.events.iter().find_map(|event| match event {
            egui::Event::Key { key, pressed: true, repeat: false, modifiers, .. } => {
                if *key == egui::Key::Escape && modifiers.is_none() {
                    Some(Err(()))
                } else {
                    combo_from_key(*key, *modifiers).map(Ok)
                }
            }
            _ => None,
        })
    })
}

/// Renders the settings panel; returns true if `settings` changed
pub fn ui(
    ui: &mut egui::Ui,
    settings: &mut ClickSettings,
    state: &mut SettingsPanelState,
    status: &SettingsStatus<'_>,
    action: &mut SettingsAction,
) -> bool {
    let mut changed = false;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Hotkey").strong());
        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            ui.label("Start / Stop:");
            let active = status
                .active_hotkey
                .map_or_else(|| "none".to_string(), |c| c.to_string());
            ui.label(egui::RichText::new(active).strong().color(ACCENT));
        });

        if state.capturing {
            ui.colored_label(STATUS_WARNING, "Press the new key combination (Esc to cancel)");
            match captured_combo(ui) {
                Some(Ok(combo)) => {
                    state.capturing = false;
                    state.parse_error = None;
                    *action = SettingsAction::Rebind(combo);
                }
                Some(Err(())) => state.capturing = false,
                None => {}
            }
        } else if ui.button("Record Hotkey").clicked() {
            state.capturing = true;
        }

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut state.combo_text)
                    .hint_text("e.g. Ctrl+Shift+F6")
                    .desired_width(150.0),
            );
            if ui.button("Apply").clicked() {
                match state.combo_text.parse::<HotkeyCombo>() {
                    Ok(combo) => {
                        state.parse_error = None;
                        *action = SettingsAction::Rebind(combo);
                    }
                    Err(e) => state.parse_error = Some(e.to_string()),
                }
            }
        });

        if let Some(e) = &state.parse_error {
            ui.colored_label(STATUS_STOPPED, e);
        } else if let Some(e) = status.hotkey_error {
            ui.colored_label(STATUS_STOPPED, e.to_string());
        }
        if let Some(notice) = status.hotkey_notice {
            ui.colored_label(STATUS_WARNING, notice);
        }
    });

    ui.add_space(SECTION_SPACING);

    ui.group(|ui| {
        ui.label(egui::RichText::new("Behaviour").strong());
        ui.add_space(ITEM_SPACING);

        changed |= ui
            .checkbox(&mut settings.show_toast, "Show start/stop notifications")
            .changed();
        changed |= ui
            .checkbox(&mut settings.show_osd, "Show on-screen indicator while clicking")
            .changed();

        ui.add_space(ITEM_SPACING);
        ui.label("First click:");
        changed |= ui
            .radio_value(&mut settings.first_click, FirstClick::AfterInterval, "After one interval")
            .changed();
        changed |= ui
            .radio_value(&mut settings.first_click, FirstClick::Immediate, "Immediately on start")
            .changed();
    });

    ui.add_space(SECTION_SPACING);

    ui.group(|ui| {
        ui.label(egui::RichText::new("Updates").strong());
        ui.add_space(ITEM_SPACING);

        ui.horizontal(|ui| {
            ui.label(format!("Version {}", app::VERSION));
            let checking = *status.update == UpdateState::Checking;
            if ui.add_enabled(!checking, egui::Button::new("Check for Updates")).clicked() {
                *action = SettingsAction::CheckUpdates;
            }
        });

        match status.update {
            UpdateState::NotChecked => {}
            UpdateState::Checking => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Checking...");
                });
            }
            UpdateState::Done(UpdateStatus::UpToDate) => {
                ui.colored_label(STATUS_RUNNING, "You're running the latest version");
            }
            UpdateState::Done(UpdateStatus::Available { latest, url }) => {
                ui.colored_label(STATUS_WARNING, format!("Version {latest} is available"));
                ui.hyperlink_to("Open release page", url);
            }
            UpdateState::Done(UpdateStatus::Failed(reason)) => {
                ui.colored_label(STATUS_STOPPED, "Update check failed").on_hover_text(reason);
            }
        }
    });

    changed
}
