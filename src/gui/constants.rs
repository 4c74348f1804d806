//! GUI-specific constants for layout, theme colours and overlay geometry

use egui::Color32;

/// Main window dimensions
pub const WINDOW_WIDTH: f32 = 440.0;
pub const WINDOW_HEIGHT: f32 = 720.0;
pub const WINDOW_MIN_WIDTH: f32 = 400.0;
pub const WINDOW_MIN_HEIGHT: f32 = 560.0;

/// Layout spacing
pub const PADDING: f32 = 8.0;
pub const SECTION_SPACING: f32 = 12.0;
pub const ITEM_SPACING: f32 = 6.0;

/// Theme
pub const BG_DARK: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x2e);
pub const BG_PANEL: Color32 = Color32::from_rgb(0x16, 0x21, 0x3e);
pub const ACCENT: Color32 = Color32::from_rgb(0xe9, 0x45, 0x60);
pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0xea, 0xea, 0xea);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x8a, 0x8a, 0x9a);

/// Status colours
pub const STATUS_RUNNING: Color32 = Color32::from_rgb(0x2e, 0xcc, 0x71);
pub const STATUS_STOPPED: Color32 = ACCENT;
pub const STATUS_WARNING: Color32 = Color32::from_rgb(0xf3, 0x9c, 0x12);

/// Marker palette, cycled by marker number
pub const DOT_COLORS: [Color32; 12] = [
    Color32::from_rgb(0xe9, 0x45, 0x60),
    Color32::from_rgb(0x2e, 0xcc, 0x71),
    Color32::from_rgb(0x34, 0x98, 0xdb),
    Color32::from_rgb(0xf1, 0xc4, 0x0f),
    Color32::from_rgb(0x9b, 0x59, 0xb6),
    Color32::from_rgb(0xe6, 0x7e, 0x22),
    Color32::from_rgb(0x1a, 0xbc, 0x9c),
    Color32::from_rgb(0xe7, 0x4c, 0x3c),
    Color32::from_rgb(0x29, 0x80, 0xb9),
    Color32::from_rgb(0x27, 0xae, 0x60),
    Color32::from_rgb(0xf3, 0x9c, 0x12),
    Color32::from_rgb(0x8e, 0x44, 0xad),
];

pub fn dot_color(number: usize) -> Color32 {
    DOT_COLORS[number.saturating_sub(1) % DOT_COLORS.len()]
}

/// Overlay geometry, in points
pub const TOAST_WIDTH: f32 = 220.0;
pub const TOAST_HEIGHT: f32 = 48.0;
pub const OSD_WIDTH: f32 = 150.0;
pub const OSD_HEIGHT: f32 = 32.0;
pub const OVERLAY_MARGIN: f32 = 24.0;
pub const MARKER_SIZE: f32 = 28.0;
pub const PICKER_WIDTH: f32 = 300.0;
pub const PICKER_HEIGHT: f32 = 130.0;

/// Fallback repaint period while idle, so close requests from signals are noticed
pub const IDLE_REPAINT_MS: u64 = 250;

/// Preset counts offered next to the repeat count field
pub const REPEAT_PRESETS: [u64; 4] = [10, 50, 100, 500];
