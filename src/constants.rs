//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Application identity
pub mod app {
    /// Display name used for window titles and the user agent
    pub const NAME: &str = "SlickClick";

    /// Version of the running build, compared against release tags
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Config and log file locations
pub mod paths {
    /// Directory under the user's config/data dir
    pub const APP_DIR: &str = "slickclick";

    /// Settings file name
    pub const CONFIG_FILENAME: &str = "config.json";

    /// Suffix of the scratch file written before the atomic rename
    pub const TEMP_SUFFIX: &str = "tmp";

    /// Append-only diagnostic log
    pub const LOG_FILENAME: &str = "slickclick.log";
}

/// Default settings values
pub mod defaults {
    /// Default click interval in milliseconds
    pub const INTERVAL_MS: u32 = 100;

    /// Default hotkey, also the fallback when the configured one can't be grabbed
    pub const HOTKEY: &str = "F6";

    /// Repeat count remembered for "finite" mode
    pub const REPEAT_COUNT: u64 = 50;
}

/// Valid ranges of the interval components
pub mod validation {
    pub const MAX_HOURS: u32 = 23;
    pub const MAX_MINUTES: u32 = 59;
    pub const MAX_SECONDS: u32 = 59;
    pub const MAX_MILLIS: u32 = 999;
}

/// Click loop timing
pub mod timing {
    /// Gap between press/release pairs of a double or triple click
    pub const MULTI_CLICK_GAP_MS: u64 = 40;

    /// Ignore repeated hotkey presses inside this window (X auto-repeat)
    pub const HOTKEY_DEBOUNCE_MS: u64 = 200;
}

/// Toast, OSD and marker timings
pub mod notifications {
    /// How long a toast stays visible
    pub const TOAST_DISPLAY_MS: u64 = 2000;

    /// OSD dot blink period
    pub const OSD_PULSE_MS: u64 = 600;

    /// Lifetime of the marker shown at a freshly captured location
    pub const CAPTURE_MARKER_MS: u64 = 1500;

    /// Dry-run markers stay this long after the last one appears
    pub const DRY_RUN_HOLD_MS: u64 = 4000;

    /// Dry-run stagger is the click interval clamped to this range
    pub const DRY_RUN_MIN_STAGGER_MS: u64 = 200;
    pub const DRY_RUN_MAX_STAGGER_MS: u64 = 1000;
}

/// Update check endpoint
pub mod update {
    pub const RELEASES_URL: &str =
        "https://api.github.com/repos/GoblinRules/SlickClick/releases/latest";

    pub const ACCEPT: &str = "application/vnd.github.v3+json";

    pub const USER_AGENT: &str = "SlickClick-UpdateChecker";

    /// Network timeout for the release request
    pub const TIMEOUT_SECS: u64 = 8;
}

/// X11 protocol constants
pub mod x11 {
    /// Core pointer button numbers
    pub const BUTTON_LEFT: u8 = 1;
    pub const BUTTON_MIDDLE: u8 = 2;
    pub const BUTTON_RIGHT: u8 = 3;

    /// XTest fake_input event types (core protocol event codes)
    pub const BUTTON_PRESS: u8 = 4;
    pub const BUTTON_RELEASE: u8 = 5;

    /// XTest "no delay" value for fake_input
    pub const CURRENT_TIME: u32 = 0;

    /// Core modifier bits (Alt is Mod1, NumLock Mod2, Super Mod4)
    pub const MASK_SHIFT: u16 = 0x0001;
    pub const MASK_LOCK: u16 = 0x0002;
    pub const MASK_CONTROL: u16 = 0x0004;
    pub const MASK_ALT: u16 = 0x0008;
    pub const MASK_NUM_LOCK: u16 = 0x0010;
    pub const MASK_SUPER: u16 = 0x0040;
}
