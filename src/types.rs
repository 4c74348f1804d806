//! Core value types shared by the engine, config and GUI

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{validation, x11};
use crate::error::HotkeyError;

/// Screen position in root-window pixels
/// Stored as `[x, y]` in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Click interval split the way the user edits it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interval {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub millis: u32,
}

impl Interval {
    pub fn new(hours: u32, minutes: u32, seconds: u32, millis: u32) -> Self {
        Self { hours, minutes, seconds, millis }
    }

    /// Decompose a millisecond count into components (hours saturate at the max)
    pub fn from_millis(total: u64) -> Self {
        let millis = (total % 1000) as u32;
        let seconds = ((total / 1000) % 60) as u32;
        let minutes = ((total / 60_000) % 60) as u32;
        let hours = (total / 3_600_000).min(validation::MAX_HOURS as u64) as u32;
        Self { hours, minutes, seconds, millis }
    }

    pub fn total_millis(&self) -> u64 {
        self.hours as u64 * 3_600_000
            + self.minutes as u64 * 60_000
            + self.seconds as u64 * 1000
            + self.millis as u64
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.total_millis())
    }

    pub fn is_zero(&self) -> bool {
        self.total_millis() == 0
    }

    /// Clamp each component to its editable range
    pub fn clamped(self) -> Self {
        Self {
            hours: self.hours.min(validation::MAX_HOURS),
            minutes: self.minutes.min(validation::MAX_MINUTES),
            seconds: self.seconds.min(validation::MAX_SECONDS),
            millis: self.millis.min(validation::MAX_MILLIS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    /// Core protocol button number
    pub fn x11_button(self) -> u8 {
        match self {
            MouseButton::Left => x11::BUTTON_LEFT,
            MouseButton::Right => x11::BUTTON_RIGHT,
            MouseButton::Middle => x11::BUTTON_MIDDLE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MouseButton::Left => "Left",
            MouseButton::Right => "Right",
            MouseButton::Middle => "Middle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClickType {
    #[default]
    Single,
    Double,
    Triple,
}

impl ClickType {
    pub const ALL: [ClickType; 3] = [ClickType::Single, ClickType::Double, ClickType::Triple];

    /// Press/release pairs emitted per tick
    pub fn presses(self) -> u32 {
        match self {
            ClickType::Single => 1,
            ClickType::Double => 2,
            ClickType::Triple => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ClickType::Single => "Single",
            ClickType::Double => "Double",
            ClickType::Triple => "Triple",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatMode {
    /// Stop automatically after `repeat_count` ticks
    FixedCount,
    #[default]
    UntilStopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TargetMode {
    /// Click wherever the cursor is at tick time
    #[default]
    AtCursor,
    /// Warp to each point in turn, round-robin
    FixedLocations(Vec<Point>),
}

impl TargetMode {
    pub fn locations(&self) -> &[Point] {
        match self {
            TargetMode::AtCursor => &[],
            TargetMode::FixedLocations(points) => points,
        }
    }
}

/// When the first click of a run happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstClick {
    /// One full interval elapses before the first click
    #[default]
    AfterInterval,
    Immediate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub super_key: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { ctrl: false, shift: false, alt: false, super_key: false };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// A global key combination: modifiers plus one non-modifier key
///
/// Text form is `Ctrl+Shift+F6`; key names are canonical upper-case names
/// (see [`canonical_key_name`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HotkeyCombo {
    pub modifiers: Modifiers,
    key: String,
}

impl HotkeyCombo {
    pub fn new(modifiers: Modifiers, key: &str) -> Result<Self, HotkeyError> {
        let key = canonical_key_name(key).ok_or_else(|| HotkeyError::UnknownKey(key.to_string()))?;
        Ok(Self { modifiers, key })
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Default for HotkeyCombo {
    fn default() -> Self {
        Self {
            modifiers: Modifiers::NONE,
            key: crate::constants::defaults::HOTKEY.to_string(),
        }
    }
}

impl fmt::Display for HotkeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift+")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt+")?;
        }
        if self.modifiers.super_key {
            f.write_str("Super+")?;
        }
        f.write_str(&self.key)
    }
}

impl FromStr for HotkeyCombo {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut modifiers = Modifiers::NONE;
        let mut key = None;

        for part in s.split('+').map(str::trim) {
            if part.is_empty() {
                return Err(HotkeyError::InvalidCombo(s.to_string()));
            }
            match part.to_ascii_uppercase().as_str() {
                "CTRL" | "CONTROL" => modifiers.ctrl = true,
                "SHIFT" => modifiers.shift = true,
                "ALT" => modifiers.alt = true,
                "SUPER" | "WIN" | "META" => modifiers.super_key = true,
                _ => {
                    if key.is_some() {
                        return Err(HotkeyError::InvalidCombo(s.to_string()));
                    }
                    key = Some(part);
                }
            }
        }

        let key = key.ok_or_else(|| HotkeyError::InvalidCombo(s.to_string()))?;
        Self::new(modifiers, key)
    }
}

impl TryFrom<String> for HotkeyCombo {
    type Error = HotkeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HotkeyCombo> for String {
    fn from(combo: HotkeyCombo) -> Self {
        combo.to_string()
    }
}

/// Normalise a key name to its canonical form, or None if it can't be a hotkey
pub fn canonical_key_name(name: &str) -> Option<String> {
    let upper = name.trim().to_ascii_uppercase();

    let aliased = match upper.as_str() {
        "RETURN" => "ENTER",
        "ESC" => "ESCAPE",
        "PAGE_UP" | "PRIOR" => "PAGEUP",
        "PAGE_DOWN" | "NEXT" => "PAGEDOWN",
        "INS" => "INSERT",
        "DEL" => "DELETE",
        "SCROLLLOCK" => "SCROLL_LOCK",
        "CAPSLOCK" => "CAPS_LOCK",
        other => other,
    };

    let valid = match aliased {
        "SPACE" | "ENTER" | "ESCAPE" | "TAB" | "INSERT" | "DELETE" | "HOME" | "END"
        | "PAGEUP" | "PAGEDOWN" | "UP" | "DOWN" | "LEFT" | "RIGHT" | "PAUSE"
        | "SCROLL_LOCK" | "CAPS_LOCK" => true,
        k if k.len() == 1 => k.chars().all(|c| c.is_ascii_alphanumeric()),
        k if k.starts_with("NUMPAD") => matches!(k[6..].parse::<u8>(), Ok(0..=9)) && k.len() == 7,
        k if k.starts_with('F') => matches!(k[1..].parse::<u8>(), Ok(1..=24)) && !k[1..].starts_with('0'),
        _ => false,
    };

    valid.then(|| aliased.to_string())
}
