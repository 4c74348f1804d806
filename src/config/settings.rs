//! Click settings record and its flat JSON file representation
//!
//! The file format uses flat key names (`interval_ms`,
//! `mouse_button`, `repeat_mode`, ...) so settings written by older builds stay
//! readable. Every key is read independently: a missing or malformed key
//! falls back to its default without discarding the rest of the file.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::constants::defaults;
use crate::error::ValidationError;
use crate::types::{
    ClickType, FirstClick, HotkeyCombo, Interval, MouseButton, Point, RepeatMode, TargetMode,
};

/// Everything the user can configure, owned by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickSettings {
    pub interval: Interval,
    pub button: MouseButton,
    pub click_type: ClickType,
    pub repeat: RepeatMode,
    /// Ticks per run in fixed-count mode, remembered while clicking until
    /// stopped (always >= 1)
    pub repeat_count: u64,
    pub target: TargetMode,
    /// Recorded locations kept while clicking at the cursor
    pub parked_locations: Vec<Point>,
    pub hotkey: HotkeyCombo,
    /// Toast on start/stop
    pub show_toast: bool,
    /// On-screen indicator while clicking
    pub show_osd: bool,
    pub first_click: FirstClick,
}

impl Default for ClickSettings {
    fn default() -> Self {
        Self {
            interval: Interval::from_millis(defaults::INTERVAL_MS as u64),
            button: MouseButton::Left,
            click_type: ClickType::Single,
            repeat: RepeatMode::UntilStopped,
            repeat_count: defaults::REPEAT_COUNT,
            target: TargetMode::AtCursor,
            parked_locations: Vec::new(),
            hotkey: HotkeyCombo::default(),
            show_toast: true,
            show_osd: true,
            first_click: FirstClick::AfterInterval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RepeatKind {
    Finite,
    Infinite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TargetKind {
    Cursor,
    Locations,
}

/// On-disk layout, one key per field
#[derive(Debug, Serialize)]
struct SettingsFile<'a> {
    hotkey: &'a HotkeyCombo,
    interval_hours: u32,
    interval_mins: u32,
    interval_secs: u32,
    interval_ms: u32,
    mouse_button: MouseButton,
    click_type: ClickType,
    repeat_mode: RepeatKind,
    repeat_count: u64,
    target_mode: TargetKind,
    locations: &'a [Point],
    first_click: FirstClick,
    show_toast: bool,
    show_osd: bool,
}

impl ClickSettings {
    /// Serialize to the flat file layout
    pub fn to_json(&self) -> serde_json::Result<String> {
        let repeat_mode = match self.repeat {
            RepeatMode::FixedCount => RepeatKind::Finite,
            RepeatMode::UntilStopped => RepeatKind::Infinite,
        };
        let target_mode = match self.target {
            TargetMode::AtCursor => TargetKind::Cursor,
            TargetMode::FixedLocations(_) => TargetKind::Locations,
        };

        let file = SettingsFile {
            hotkey: &self.hotkey,
            interval_hours: self.interval.hours,
            interval_mins: self.interval.minutes,
            interval_secs: self.interval.seconds,
            interval_ms: self.interval.millis,
            mouse_button: self.button,
            click_type: self.click_type,
            repeat_mode,
            repeat_count: self.repeat_count,
            target_mode,
            locations: self.locations(),
            first_click: self.first_click,
            show_toast: self.show_toast,
            show_osd: self.show_osd,
        };
        serde_json::to_string_pretty(&file)
    }

    /// Build settings from a parsed JSON object, field by field
    ///
    /// Returns the settings and the names of keys that were present but invalid.
    pub fn from_json_object(obj: &Map<String, Value>) -> (Self, Vec<&'static str>) {
        let defaults = Self::default();
        let mut reader = FieldReader { obj, rejected: Vec::new() };

        let interval = Interval {
            hours: reader.field("interval_hours", defaults.interval.hours),
            minutes: reader.field("interval_mins", defaults.interval.minutes),
            seconds: reader.field("interval_secs", defaults.interval.seconds),
            millis: reader.field("interval_ms", defaults.interval.millis),
        };

        let repeat_count = reader.field("repeat_count", defaults::REPEAT_COUNT);
        let repeat = match reader.field("repeat_mode", RepeatKind::Infinite) {
            RepeatKind::Finite => RepeatMode::FixedCount,
            RepeatKind::Infinite => RepeatMode::UntilStopped,
        };

        let locations: Vec<Point> = reader.field("locations", Vec::new());
        // Files without a target_mode key predate cursor/locations selection:
        // a non-empty list meant "click the list"
        let default_kind = if locations.is_empty() { TargetKind::Cursor } else { TargetKind::Locations };
        let (target, parked_locations) = match reader.field("target_mode", default_kind) {
            TargetKind::Cursor => (TargetMode::AtCursor, locations),
            TargetKind::Locations => (TargetMode::FixedLocations(locations), Vec::new()),
        };

        let mut settings = Self {
            interval,
            button: reader.field("mouse_button", defaults.button),
            click_type: reader.field("click_type", defaults.click_type),
            repeat,
            repeat_count,
            target,
            parked_locations,
            hotkey: reader.field("hotkey", defaults.hotkey.clone()),
            show_toast: reader.field("show_toast", defaults.show_toast),
            show_osd: reader.field("show_osd", defaults.show_osd),
            first_click: reader.field("first_click", defaults.first_click),
        };
        settings.validate_and_clamp();

        (settings, reader.rejected)
    }

    /// Check the settings can drive a click run
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval.is_zero() {
            return Err(ValidationError::ZeroInterval);
        }
        if let TargetMode::FixedLocations(points) = &self.target
            && points.is_empty()
        {
            return Err(ValidationError::NoLocations);
        }
        Ok(())
    }

    /// Clamp values to the ranges the GUI can edit
    /// Called after loading so hand-edited files can't break the engine
    pub fn validate_and_clamp(&mut self) {
        let clamped = self.interval.clamped();
        if clamped != self.interval {
            warn!(interval = ?self.interval, clamped = ?clamped, "Interval component out of range, clamping");
            self.interval = clamped;
        }

        if self.repeat_count == 0 {
            warn!("repeat_count of 0 is not allowed, using 1");
            self.repeat_count = 1;
        }
    }

    /// Recorded locations, regardless of whether they are the active target
    pub fn locations(&self) -> &[Point] {
        match &self.target {
            TargetMode::AtCursor => &self.parked_locations,
            TargetMode::FixedLocations(points) => points,
        }
    }

    pub fn locations_mut(&mut self) -> &mut Vec<Point> {
        match &mut self.target {
            TargetMode::AtCursor => &mut self.parked_locations,
            TargetMode::FixedLocations(points) => points,
        }
    }

    pub fn uses_fixed_locations(&self) -> bool {
        matches!(self.target, TargetMode::FixedLocations(_))
    }

    /// Switch between clicking at the cursor and the recorded list,
    /// carrying the list across
    pub fn set_fixed_locations(&mut self, fixed: bool) {
        match (self.uses_fixed_locations(), fixed) {
            (false, true) => {
                self.target = TargetMode::FixedLocations(std::mem::take(&mut self.parked_locations));
            }
            (true, false) => {
                if let TargetMode::FixedLocations(points) =
                    std::mem::replace(&mut self.target, TargetMode::AtCursor)
                {
                    self.parked_locations = points;
                }
            }
            _ => {}
        }
    }

    pub fn uses_fixed_count(&self) -> bool {
        self.repeat == RepeatMode::FixedCount
    }

    /// Ticks after which a run stops on its own, if any
    pub fn repeat_limit(&self) -> Option<u64> {
        match self.repeat {
            RepeatMode::FixedCount => Some(self.repeat_count.max(1)),
            RepeatMode::UntilStopped => None,
        }
    }

    /// Switch between a fixed count (the remembered one) and until-stopped
    pub fn set_fixed_count(&mut self, fixed: bool) {
        self.repeat = if fixed { RepeatMode::FixedCount } else { RepeatMode::UntilStopped };
        self.repeat_count = self.repeat_count.max(1);
    }

    pub fn set_repeat_count(&mut self, count: u64) {
        self.repeat_count = count.max(1);
    }
}

struct FieldReader<'a> {
    obj: &'a Map<String, Value>,
    rejected: Vec<&'static str>,
}

impl FieldReader<'_> {
    fn field<T: DeserializeOwned>(&mut self, key: &'static str, default: T) -> T {
        let Some(value) = self.obj.get(key) else {
            debug!(key, "Config key missing, using default");
            return default;
        };

        match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(key, value = %value, error = %e, "Invalid config value, using default");
                self.rejected.push(key);
                default
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let settings = ClickSettings::default();
        assert_eq!(settings.interval.total_millis(), 100);
        assert_eq!(settings.button, MouseButton::Left);
        assert_eq!(settings.click_type, ClickType::Single);
        assert_eq!(settings.repeat, RepeatMode::UntilStopped);
        assert_eq!(settings.target, TargetMode::AtCursor);
        assert_eq!(settings.hotkey.to_string(), "F6");
        assert!(settings.show_toast);
        assert!(settings.show_osd);
        assert_eq!(settings.first_click, FirstClick::AfterInterval);
    }

    #[test]
    fn test_reads_flat_format_from_older_builds() {
        let obj = object(json!({
            "hotkey": "F8",
            "interval_hours": 0,
            "interval_mins": 0,
            "interval_secs": 2,
            "interval_ms": 250,
            "mouse_button": "Right",
            "click_type": "Double",
            "repeat_mode": "finite",
            "repeat_count": 7,
            "show_toast": false,
            "show_osd": true
        }));

        let (settings, rejected) = ClickSettings::from_json_object(&obj);
        assert!(rejected.is_empty());
        assert_eq!(settings.hotkey.to_string(), "F8");
        assert_eq!(settings.interval, Interval::new(0, 0, 2, 250));
        assert_eq!(settings.button, MouseButton::Right);
        assert_eq!(settings.click_type, ClickType::Double);
        assert_eq!(settings.repeat_limit(), Some(7));
        assert_eq!(settings.target, TargetMode::AtCursor);
        assert!(!settings.show_toast);
    }

    #[test]
    fn test_invalid_field_falls_back_individually() {
        let obj = object(json!({
            "interval_ms": "fast",
            "mouse_button": "Thumb",
            "click_type": "Triple",
            "hotkey": "Ctrl+",
        }));

        let (settings, rejected) = ClickSettings::from_json_object(&obj);
        assert_eq!(rejected, vec!["interval_ms", "mouse_button", "hotkey"]);
        assert_eq!(settings.interval.millis, 100);
        assert_eq!(settings.button, MouseButton::Left);
        // The valid key next to invalid ones is still honoured
        assert_eq!(settings.click_type, ClickType::Triple);
        assert_eq!(settings.hotkey, HotkeyCombo::default());
    }

    #[test]
    fn test_locations_without_target_mode_select_locations() {
        let obj = object(json!({ "locations": [[1, 2], [3, 4]] }));
        let (settings, _) = ClickSettings::from_json_object(&obj);
        assert_eq!(
            settings.target,
            TargetMode::FixedLocations(vec![Point::new(1, 2), Point::new(3, 4)])
        );
    }

    #[test]
    fn test_explicit_cursor_mode_keeps_locations_parked() {
        let obj = object(json!({ "target_mode": "cursor", "locations": [[1, 2]] }));
        let (mut settings, _) = ClickSettings::from_json_object(&obj);
        assert_eq!(settings.target, TargetMode::AtCursor);
        assert_eq!(settings.locations(), &[Point::new(1, 2)]);

        settings.set_fixed_locations(true);
        assert_eq!(settings.target, TargetMode::FixedLocations(vec![Point::new(1, 2)]));
        assert!(settings.parked_locations.is_empty());

        settings.set_fixed_locations(false);
        assert_eq!(settings.target, TargetMode::AtCursor);
        assert_eq!(settings.parked_locations, vec![Point::new(1, 2)]);
    }

    #[test]
    fn test_repeat_helpers() {
        let mut settings = ClickSettings::default();
        settings.set_repeat_count(7);
        assert_eq!(settings.repeat, RepeatMode::UntilStopped);
        assert_eq!(settings.repeat_limit(), None);

        settings.set_fixed_count(true);
        assert_eq!(settings.repeat_limit(), Some(7));
        settings.set_repeat_count(0);
        assert_eq!(settings.repeat_limit(), Some(1));

        settings.set_fixed_count(false);
        assert_eq!(settings.repeat, RepeatMode::UntilStopped);
        assert_eq!(settings.repeat_count, 1);
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let obj = object(json!({
            "interval_secs": 300,
            "interval_ms": 5000,
            "repeat_mode": "finite",
            "repeat_count": 0,
        }));
        let (settings, rejected) = ClickSettings::from_json_object(&obj);
        assert!(rejected.is_empty());
        assert_eq!(settings.interval.seconds, 59);
        assert_eq!(settings.interval.millis, 999);
        assert_eq!(settings.repeat, RepeatMode::FixedCount);
        assert_eq!(settings.repeat_count, 1);
    }

    #[test]
    fn test_negative_interval_rejected() {
        let obj = object(json!({ "interval_ms": -5 }));
        let (settings, rejected) = ClickSettings::from_json_object(&obj);
        assert_eq!(rejected, vec!["interval_ms"]);
        assert_eq!(settings.interval.millis, 100);
    }

    #[test]
    fn test_repeat_count_remembered_in_infinite_mode() {
        let settings = ClickSettings { repeat_count: 25, ..ClickSettings::default() };
        let value: Value = serde_json::from_str(&settings.to_json().unwrap()).unwrap();
        assert_eq!(value["repeat_mode"], "infinite");
        assert_eq!(value["repeat_count"], 25);

        let (loaded, _) = ClickSettings::from_json_object(&object(value));
        assert_eq!(loaded.repeat, RepeatMode::UntilStopped);
        assert_eq!(loaded.repeat_count, 25);
    }

    #[test]
    fn test_validate() {
        assert_eq!(ClickSettings::default().validate(), Ok(()));

        let zero = ClickSettings { interval: Interval::default(), ..ClickSettings::default() };
        assert_eq!(zero.validate(), Err(ValidationError::ZeroInterval));

        let empty = ClickSettings {
            target: TargetMode::FixedLocations(Vec::new()),
            ..ClickSettings::default()
        };
        assert_eq!(empty.validate(), Err(ValidationError::NoLocations));
    }

    #[test]
    fn test_to_json_uses_flat_keys() {
        let settings = ClickSettings {
            repeat: RepeatMode::FixedCount,
            repeat_count: 3,
            target: TargetMode::FixedLocations(vec![Point::new(10, 20)]),
            first_click: FirstClick::Immediate,
            ..ClickSettings::default()
        };
        let value: Value = serde_json::from_str(&settings.to_json().unwrap()).unwrap();
        assert_eq!(value["repeat_mode"], "finite");
        assert_eq!(value["repeat_count"], 3);
        assert_eq!(value["target_mode"], "locations");
        assert_eq!(value["locations"], json!([[10, 20]]));
        assert_eq!(value["first_click"], "immediate");
        assert_eq!(value["hotkey"], "F6");
        assert_eq!(value["interval_ms"], 100);
    }
}
