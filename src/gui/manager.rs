//! Main window implemented with egui/eframe
//!
//! The app owns the [`AppController`] and drives it from `update`: every
//! frame polls the controller, renders it, applies the user's actions and
//! asks egui to repaint when the controller next needs attention.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use eframe::{egui, CreationContext, NativeOptions};
use tracing::{info, warn};

use super::components::settings_panel::{self, SettingsAction, SettingsPanelState, SettingsStatus};
use super::components::target::{self, TargetAction, TargetState};
use super::components::{click_options, repeat};
use super::constants::*;
use super::overlays::{self, PickerCommand, PickerView, Screen};
use crate::constants::app;
use crate::controller::AppController;

/// Everything the window needs besides the controller
pub struct GuiOptions {
    /// Root window size in pixels
    pub screen_px: (u16, u16),
    /// Set by the signal handler to request a normal close
    pub close_requested: Arc<AtomicBool>,
    pub check_updates: bool,
    /// Filled with the egui context once it exists, for background wakeups
    pub repaint_handle: Arc<OnceLock<egui::Context>>,
}

struct StatusMessage {
    text: String,
    color: egui::Color32,
}

/// Actions collected while rendering and applied afterwards
enum Action {
    Start,
    Stop,
    Target(TargetAction),
    Settings(SettingsAction),
    Picker(PickerCommand),
}

struct SlickClickApp {
    controller: AppController,
    screen_px: (u16, u16),
    close_requested: Arc<AtomicBool>,
    closing: bool,
    target_state: TargetState,
    settings_state: SettingsPanelState,
}

impl SlickClickApp {
    fn new(cc: &CreationContext<'_>, controller: AppController, options: GuiOptions) -> Self {
        info!("Initializing main window");
        cc.egui_ctx.set_visuals(theme());

        if options.repaint_handle.set(cc.egui_ctx.clone()).is_err() {
            warn!("Repaint handle was already set");
        }

        let mut app = Self {
            controller,
            screen_px: options.screen_px,
            close_requested: options.close_requested,
            closing: false,
            target_state: TargetState::new(),
            settings_state: SettingsPanelState::new(),
        };

        if options.check_updates {
            app.check_for_updates(&cc.egui_ctx);
        }
        app
    }

    fn check_for_updates(&mut self, ctx: &egui::Context) {
        let ctx = ctx.clone();
        self.controller.check_for_updates(move || ctx.request_repaint());
    }

    fn status_message(&self) -> StatusMessage {
        let engine = self.controller.engine();
        if engine.is_running() {
            StatusMessage {
                text: format!("\u{25CF}  Running  ({} clicks)", engine.clicks()),
                color: STATUS_RUNNING,
            }
        } else {
            let text = match self.controller.last_run_clicks() {
                Some(clicks) => format!("\u{25CF}  Stopped  (last run: {clicks} clicks)"),
                None => "\u{25CF}  Stopped".to_string(),
            };
            StatusMessage { text, color: STATUS_STOPPED }
        }
    }

    fn main_ui(&mut self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        ui.add_space(PADDING);
        ui.horizontal(|ui| {
            ui.heading(egui::RichText::new(app::NAME).color(ACCENT).strong());
            ui.label(egui::RichText::new(format!("v{}", app::VERSION)).small().color(TEXT_MUTED));
        });
        ui.add_space(SECTION_SPACING);

        let mut edited = self.controller.settings().clone();
        let mut changed = false;

        changed |= click_options::ui(ui, &mut edited);
        ui.add_space(SECTION_SPACING);
        changed |= repeat::ui(ui, &mut edited);
        ui.add_space(SECTION_SPACING);

        let target_action = target::ui(ui, &mut edited, &mut self.target_state, &mut changed);
        if target_action != TargetAction::None {
            actions.push(Action::Target(target_action));
        }

        ui.add_space(SECTION_SPACING);
        self.controls_ui(ui, actions);
        ui.add_space(SECTION_SPACING);
        ui.separator();

        egui::CollapsingHeader::new("Settings")
            .default_open(false)
            .show(ui, |ui| {
                let status = SettingsStatus {
                    active_hotkey: self.controller.active_hotkey(),
                    hotkey_error: self.controller.hotkey_error(),
                    hotkey_notice: self.controller.hotkey_notice(),
                    update: self.controller.update_state(),
                };
                let mut action = SettingsAction::None;
                changed |= settings_panel::ui(ui, &mut edited, &mut self.settings_state, &status, &mut action);
                if action != SettingsAction::None {
                    actions.push(Action::Settings(action));
                }
            });

        if changed {
            self.controller.update_settings(|settings| *settings = edited);
        }
    }

    fn controls_ui(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let hotkey = self
            .controller
            .active_hotkey()
            .map(|combo| format!(" ({combo})"))
            .unwrap_or_default();
        let running = self.controller.is_running();

        ui.horizontal(|ui| {
            let start = egui::Button::new(format!("\u{25B6} Start{hotkey}")).min_size(egui::vec2(140.0, 32.0));
            if ui.add_enabled(!running, start).clicked() {
                actions.push(Action::Start);
            }
            let stop = egui::Button::new(format!("\u{25A0} Stop{hotkey}")).min_size(egui::vec2(140.0, 32.0));
            if ui.add_enabled(running, stop).clicked() {
                actions.push(Action::Stop);
            }
        });

        ui.add_space(ITEM_SPACING);
        let status = self.status_message();
        ui.colored_label(status.color, status.text);
        if let Some(e) = self.controller.validation_error() {
            ui.colored_label(STATUS_WARNING, e.to_string());
        }
    }

    fn apply(&mut self, ctx: &egui::Context, actions: Vec<Action>, now: Instant) {
        for action in actions {
            match action {
                Action::Start => self.controller.start(now),
                Action::Stop => self.controller.stop(now),
                Action::Target(TargetAction::OpenPicker) => self.controller.open_picker(),
                Action::Target(TargetAction::DryRun) => self.controller.start_dry_run(now),
                Action::Target(TargetAction::None) | Action::Settings(SettingsAction::None) => {}
                Action::Settings(SettingsAction::Rebind(combo)) => {
                    // Failure is kept by the controller and shown in the panel
                    let _ = self.controller.rebind_hotkey(combo);
                }
                Action::Settings(SettingsAction::CheckUpdates) => self.check_for_updates(ctx),
                Action::Picker(PickerCommand::Capture) => {
                    self.controller.capture_location(now);
                }
                Action::Picker(PickerCommand::Undo) => self.controller.undo_location(),
                Action::Picker(PickerCommand::Close) => self.controller.close_picker(),
            }
        }
    }

    fn show_overlays(&mut self, ctx: &egui::Context, now: Instant, actions: &mut Vec<Action>) {
        let screen = Screen::new(self.screen_px.0, self.screen_px.1, ctx.pixels_per_point());

        let presenter = self.controller.presenter();
        if let Some(toast) = presenter.toast(now).cloned() {
            overlays::toast(ctx, screen, &toast);
        }
        if presenter.osd_visible() {
            let lit = presenter.osd_dot_lit(now);
            overlays::osd(ctx, screen, lit);
        }

        let picker = self.controller.picker();
        let captured = picker.markers(now);
        if picker.is_open() {
            let view = PickerView {
                cursor: picker.cursor(),
                saved: picker.saved(),
                status: picker.status(),
            };
            let commands = overlays::picker_toolbar(ctx, screen, &view);
            actions.extend(commands.into_iter().map(Action::Picker));
        }
        overlays::markers(ctx, screen, "capture", &captured);

        if let Some(preview) = self.controller.dry_run() {
            overlays::markers(ctx, screen, "dry_run", &preview.visible(now));
        }
    }

    fn schedule_repaint(&self, ctx: &egui::Context) {
        let now = Instant::now();
        let idle = Duration::from_millis(IDLE_REPAINT_MS);
        let delay = self
            .controller
            .next_wakeup(now)
            .map_or(idle, |at| at.saturating_duration_since(now).min(idle));
        ctx.request_repaint_after(delay);
    }
}

impl eframe::App for SlickClickApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // Overlay viewports are transparent; the main window paints its own panel
        [0.0, 0.0, 0.0, 0.0]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.close_requested.load(Ordering::Relaxed) && !self.closing {
            info!("Close requested by signal");
            self.closing = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        let now = Instant::now();
        self.controller.poll(now);

        let mut actions = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.main_ui(ui, &mut actions);
            });
        });
        self.show_overlays(ctx, now, &mut actions);
        self.apply(ctx, actions, now);

        self.schedule_repaint(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.shutdown();
        info!("Main window exiting");
    }
}

fn theme() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = BG_DARK;
    visuals.window_fill = BG_PANEL;
    visuals.extreme_bg_color = BG_PANEL;
    visuals.selection.bg_fill = ACCENT;
    visuals.hyperlink_color = ACCENT;
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals
}

pub fn run_gui(controller: AppController, options: GuiOptions) -> Result<()> {
    let native = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT])
            .with_title(app::NAME),
        ..Default::default()
    };

    eframe::run_native(
        app::NAME,
        native,
        Box::new(|cc| Ok(Box::new(SlickClickApp::new(cc, controller, options)))),
    )
    .map_err(|err| anyhow!("Failed to launch main window: {err}"))
}
