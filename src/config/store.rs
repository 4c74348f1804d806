//! Config file location, tolerant loading and atomic saving

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::ClickSettings;
use crate::constants::paths;

/// Reads and writes `config.json`
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/slickclick/config.json`
    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(paths::APP_DIR);
        path.push(paths::CONFIG_FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load settings, never failing
    ///
    /// A missing, unreadable or non-object file yields defaults. Inside a valid
    /// object each key falls back on its own.
    pub fn load(&self) -> ClickSettings {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Config file not found, using defaults");
                return ClickSettings::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read config, using defaults");
                return ClickSettings::default();
            }
        };

        let obj = match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(obj)) => obj,
            Ok(other) => {
                warn!(path = %self.path.display(), found = %json_kind(&other), "Config is not a JSON object, using defaults");
                return ClickSettings::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Config is not valid JSON, using defaults");
                return ClickSettings::default();
            }
        };

        let (settings, rejected) = ClickSettings::from_json_object(&obj);
        if rejected.is_empty() {
            info!(path = %self.path.display(), "Loaded config");
        } else {
            warn!(path = %self.path.display(), rejected = ?rejected, "Loaded config with invalid fields replaced by defaults");
        }
        settings
    }

    /// Write settings atomically: temp file, fsync, rename over the target
    pub fn save(&self, settings: &ClickSettings) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let json = settings.to_json().context("Failed to serialize settings")?;
        let tmp_path = self.tmp_path();

        let write_tmp = || -> Result<()> {
            let mut file = File::create(&tmp_path)
                .with_context(|| format!("Failed to create {:?}", tmp_path))?;
            file.write_all(json.as_bytes())
                .with_context(|| format!("Failed to write {:?}", tmp_path))?;
            file.sync_all()
                .with_context(|| format!("Failed to sync {:?}", tmp_path))?;
            Ok(())
        };

        if let Err(e) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e).with_context(|| format!("Failed to replace config at {:?}", self.path));
        }

        info!(path = %self.path.display(), "Saved config");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension(format!("json.{}", paths::TEMP_SUFFIX))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        ClickType, FirstClick, HotkeyCombo, Interval, MouseButton, Point, RepeatMode, TargetMode,
    };

    fn store_in(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("slickclick").join("config.json"))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);
        assert_eq!(store.load(), ClickSettings::default());
        // Loading never creates the file
        assert!(!store.path().exists());
    }

    #[test]
    fn test_corrupt_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ this is not json").unwrap();
        assert_eq!(ConfigStore::new(&path).load(), ClickSettings::default());

        fs::write(&path, "[1, 2, 3]").unwrap();
        assert_eq!(ConfigStore::new(&path).load(), ClickSettings::default());
    }

    #[test]
    fn test_partially_invalid_file_keeps_valid_fields() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "interval_ms": 250, "mouse_button": 42, "click_type": "Double", "show_osd": "yes" }"#,
        )
        .unwrap();

        let settings = ConfigStore::new(&path).load();
        assert_eq!(settings.interval, Interval::new(0, 0, 0, 250));
        assert_eq!(settings.button, MouseButton::Left);
        assert_eq!(settings.click_type, ClickType::Double);
        assert!(settings.show_osd);
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);

        let settings = ClickSettings {
            interval: Interval::new(1, 2, 3, 4),
            button: MouseButton::Middle,
            click_type: ClickType::Triple,
            repeat: RepeatMode::FixedCount,
            repeat_count: 12,
            target: TargetMode::FixedLocations(vec![Point::new(-5, 7), Point::new(1920, 1080)]),
            parked_locations: Vec::new(),
            hotkey: "Ctrl+Alt+K".parse::<HotkeyCombo>().unwrap(),
            show_toast: false,
            show_osd: false,
            first_click: FirstClick::Immediate,
        };

        store.save(&settings).expect("save");
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_parked_locations_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);
        let settings = ClickSettings {
            target: TargetMode::AtCursor,
            parked_locations: vec![Point::new(3, 4), Point::new(0, 0)],
            ..ClickSettings::default()
        };

        store.save(&settings).expect("save");
        assert_eq!(store.load(), settings);
    }

    #[test]
    fn test_boundary_values_round_trip() {
        let cases = [
            ClickSettings { interval: Interval::new(0, 0, 1, 0), ..ClickSettings::default() },
            ClickSettings {
                target: TargetMode::FixedLocations(vec![Point::new(640, 480)]),
                ..ClickSettings::default()
            },
            ClickSettings {
                repeat: RepeatMode::FixedCount,
                repeat_count: 1,
                ..ClickSettings::default()
            },
        ];

        for settings in cases {
            let dir = tempfile::tempdir().expect("temp dir");
            let store = store_in(&dir);
            store.save(&settings).expect("save");
            assert_eq!(store.load(), settings);
        }
    }

    #[test]
    fn test_remembered_count_survives_fixed_mode() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);
        let mut settings = ClickSettings::default();
        settings.set_repeat_count(40);
        settings.set_fixed_count(true);

        store.save(&settings).expect("save");
        let mut loaded = store.load();
        assert_eq!(loaded.repeat_limit(), Some(40));
        loaded.set_fixed_count(false);
        assert_eq!(loaded.repeat_count, 40);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);
        store.save(&ClickSettings::default()).expect("save");

        let parent = store.path().parent().unwrap();
        let names: Vec<String> = fs::read_dir(parent)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["config.json".to_string()]);
    }

    #[test]
    fn test_save_overwrites_existing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);
        store.save(&ClickSettings::default()).expect("first save");

        let changed = ClickSettings { button: MouseButton::Right, ..ClickSettings::default() };
        store.save(&changed).expect("second save");
        assert_eq!(store.load().button, MouseButton::Right);
    }

    #[test]
    fn test_empty_location_list_survives_reload() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);
        let settings = ClickSettings {
            target: TargetMode::FixedLocations(Vec::new()),
            ..ClickSettings::default()
        };
        store.save(&settings).expect("save");
        assert_eq!(store.load().target, TargetMode::FixedLocations(Vec::new()));
    }

    #[test]
    fn test_until_stopped_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = store_in(&dir);
        store.save(&ClickSettings::default()).expect("save");
        assert_eq!(store.load().repeat, RepeatMode::UntilStopped);
    }
}
