//! Always-on-top overlay windows: toast, OSD, markers and the picker toolbar
//!
//! Each overlay is an immediate viewport re-declared every frame it should
//! be visible; egui closes it on the first frame it isn't.

use eframe::egui;
use egui::{Align2, FontId, ViewportBuilder, ViewportId};

use crate::gui::constants::*;
use crate::location_picker::{Marker, PickerStatus};
use crate::notifications::{Toast, ToastKind};
use crate::types::Point;

/// Screen geometry in egui points
#[derive(Debug, Clone, Copy)]
pub struct Screen {
    pub size: egui::Vec2,
    pub pixels_per_point: f32,
}

impl Screen {
    pub fn new(width_px: u16, height_px: u16, pixels_per_point: f32) -> Self {
        let ppp = pixels_per_point.max(0.1);
        Self {
            size: egui::vec2(width_px as f32 / ppp, height_px as f32 / ppp),
            pixels_per_point: ppp,
        }
    }

    fn to_points(self, point: Point) -> egui::Pos2 {
        egui::pos2(point.x as f32 / self.pixels_per_point, point.y as f32 / self.pixels_per_point)
    }
}

fn overlay_builder(title: &str, position: egui::Pos2, size: egui::Vec2) -> ViewportBuilder {
    ViewportBuilder::default()
        .with_title(title)
        .with_position(position)
        .with_inner_size(size)
        .with_decorations(false)
        .with_transparent(true)
        .with_resizable(false)
        .with_taskbar(false)
        .with_always_on_top()
        .with_mouse_passthrough(true)
}

/// Bottom-right "Clicker Started/Stopped" notice
pub fn toast(ctx: &egui::Context, screen: Screen, toast: &Toast) {
    let size = egui::vec2(TOAST_WIDTH, TOAST_HEIGHT);
    let position = egui::pos2(
        screen.size.x - TOAST_WIDTH - OVERLAY_MARGIN,
        screen.size.y - TOAST_HEIGHT - OVERLAY_MARGIN * 2.0,
    );
    let color = match toast.kind {
        ToastKind::Started => STATUS_RUNNING,
        ToastKind::Stopped => ACCENT,
    };
    let text = toast.text;

    ctx.show_viewport_immediate(
        ViewportId::from_hash_of("slickclick_toast"),
        overlay_builder("SlickClick notification", position, size),
        |ctx, _class| {
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    egui::Frame::new()
                        .fill(BG_PANEL)
                        .stroke(egui::Stroke::new(2.0, color))
                        .corner_radius(8.0)
                        .inner_margin(10.0)
                        .show(ui, |ui| {
                            ui.set_min_size(ui.available_size());
                            ui.centered_and_justified(|ui| {
                                ui.label(egui::RichText::new(text).strong().size(16.0).color(color));
                            });
                        });
                });
        },
    );
}

/// Top-right indicator shown while clicking
pub fn osd(ctx: &egui::Context, screen: Screen, dot_lit: bool) {
    let size = egui::vec2(OSD_WIDTH, OSD_HEIGHT);
    let position = egui::pos2(screen.size.x - OSD_WIDTH - OVERLAY_MARGIN, OVERLAY_MARGIN);

    ctx.show_viewport_immediate(
        ViewportId::from_hash_of("slickclick_osd"),
        overlay_builder("SlickClick indicator", position, size),
        |ctx, _class| {
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    let rect = ui.max_rect();
                    let painter = ui.painter();
                    painter.rect_filled(rect, 6.0, BG_DARK.gamma_multiply(0.85));

                    let dot = egui::pos2(rect.left() + 16.0, rect.center().y);
                    let dot_color = if dot_lit { STATUS_RUNNING } else { STATUS_RUNNING.gamma_multiply(0.3) };
                    painter.circle_filled(dot, 6.0, dot_color);
                    painter.text(
                        egui::pos2(rect.left() + 30.0, rect.center().y),
                        Align2::LEFT_CENTER,
                        "CLICKING",
                        FontId::proportional(14.0),
                        TEXT_PRIMARY,
                    );
                });
        },
    );
}

/// Numbered dots at screen positions; `salt` keeps marker sets apart
pub fn markers(ctx: &egui::Context, screen: Screen, salt: &str, markers: &[Marker]) {
    let size = egui::vec2(MARKER_SIZE, MARKER_SIZE);

    for marker in markers {
        let center = screen.to_points(marker.point);
        let position = center - size / 2.0;
        let color = dot_color(marker.number);
        let label = marker.number.to_string();

        ctx.show_viewport_immediate(
            ViewportId::from_hash_of((salt, marker.number)),
            overlay_builder("SlickClick marker", position, size),
            |ctx, _class| {
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| {
                        let rect = ui.max_rect();
                        let painter = ui.painter();
                        painter.circle_filled(rect.center(), MARKER_SIZE / 2.0 - 1.0, color);
                        painter.circle_stroke(
                            rect.center(),
                            MARKER_SIZE / 2.0 - 1.0,
                            egui::Stroke::new(1.5, egui::Color32::WHITE),
                        );
                        painter.text(
                            rect.center(),
                            Align2::CENTER_CENTER,
                            &label,
                            FontId::proportional(13.0),
                            egui::Color32::WHITE,
                        );
                    });
            },
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerCommand {
    Capture,
    Undo,
    Close,
}

/// What the picker toolbar shows
pub struct PickerView {
    pub cursor: Option<Point>,
    pub saved: usize,
    pub status: PickerStatus,
}

/// Floating toolbar: Space/Enter captures, Ctrl+Z undoes, Esc closes
pub fn picker_toolbar(ctx: &egui::Context, screen: Screen, view: &PickerView) -> Vec<PickerCommand> {
    let size = egui::vec2(PICKER_WIDTH, PICKER_HEIGHT);
    let position = egui::pos2((screen.size.x - PICKER_WIDTH) / 2.0, OVERLAY_MARGIN * 2.0);

    let builder = ViewportBuilder::default()
        .with_title("SlickClick - Pick Locations")
        .with_position(position)
        .with_inner_size(size)
        .with_resizable(false)
        .with_always_on_top();

    ctx.show_viewport_immediate(
        ViewportId::from_hash_of("slickclick_picker"),
        builder,
        |ctx, _class| {
            let mut commands = Vec::new();

            ctx.input(|i| {
                if i.viewport().close_requested() || i.key_pressed(egui::Key::Escape) {
                    commands.push(PickerCommand::Close);
                }
                if i.key_pressed(egui::Key::Space) || i.key_pressed(egui::Key::Enter) {
                    commands.push(PickerCommand::Capture);
                }
                if i.modifiers.command && i.key_pressed(egui::Key::Z) {
                    commands.push(PickerCommand::Undo);
                }
            });

            egui::CentralPanel::default().show(ctx, |ui| {
                let coords = match view.cursor {
                    Some(p) => format!("X: {}   Y: {}", p.x, p.y),
                    None => "X: -   Y: -".to_string(),
                };
                ui.label(egui::RichText::new(coords).monospace().size(16.0).color(TEXT_PRIMARY));

                let status = match view.status {
                    PickerStatus::Idle => format!("{} saved", view.saved),
                    PickerStatus::Captured(marker) => {
                        format!("Saved #{} at {}", marker.number, marker.point)
                    }
                    PickerStatus::Undone { remaining } => format!("Undone, {remaining} saved"),
                };
                ui.colored_label(TEXT_MUTED, status);

                ui.add_space(ITEM_SPACING);
                ui.label(
                    egui::RichText::new("Space/Enter: save   Ctrl+Z: undo   Esc: done")
                        .small()
                        .color(TEXT_MUTED),
                );

                ui.horizontal(|ui| {
                    if ui.button("Undo").clicked() {
                        commands.push(PickerCommand::Undo);
                    }
                    if ui.button("Done").clicked() {
                        commands.push(PickerCommand::Close);
                    }
                });
            });

            commands
        },
    )
}
