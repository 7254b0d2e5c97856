use crate::constants::{self, ring, time};
use crate::shift::{ShiftConfig, TimeOfDay};
use crate::store::{FileStore, KeyValueStore};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wake times for a shift that is always on and ignores the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinnedShift {
    pub actual_wake: TimeOfDay,
    pub ideal_wake: TimeOfDay,
}

impl PinnedShift {
    pub fn to_config(&self) -> ShiftConfig {
        ShiftConfig::pinned(self.actual_wake, self.ideal_wake)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub show_percent_symbol: bool,
    pub hour12: bool,
    pub tick_interval_ms: u64,
    pub pulse_ms: u64,
    pub ring_radius: f64,
    pub pinned_shift: Option<PinnedShift>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            show_percent_symbol: true,
            hour12: true,
            tick_interval_ms: time::TICK_INTERVAL_MS,
            pulse_ms: time::PULSE_MS,
            ring_radius: ring::RADIUS,
            pinned_shift: None,
        }
    }
}

impl AppSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(time::MIN_TICK_INTERVAL_MS))
    }

    pub fn pulse_duration(&self) -> chrono::Duration {
        let millis = self.pulse_ms.min(time::MAX_PULSE_MS);
        chrono::Duration::milliseconds(i64::try_from(millis).unwrap_or_default())
    }

    pub fn pinned_config(&self) -> Option<ShiftConfig> {
        self.pinned_shift.as_ref().map(PinnedShift::to_config)
    }
}

pub struct SettingsManager {
    store: FileStore,
}

impl SettingsManager {
    pub fn new(store: FileStore) -> Self {
        Self { store }
    }

    pub fn save(&self, settings: &AppSettings) -> Result<()> {
        let json = serde_json::to_string_pretty(settings)?;
        self.store.set(constants::SETTINGS_KEY, &json)
    }

    pub fn load(&self) -> Result<AppSettings> {
        let Some(json) = self.store.get(constants::SETTINGS_KEY)? else {
            return Ok(AppSettings::default());
        };

        let settings: AppSettings =
            serde_json::from_str(&json).context("Failed to parse settings")?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> (tempfile::TempDir, SettingsManager) {
        let dir = tempfile::tempdir().unwrap();
        let manager = SettingsManager::new(FileStore::new(dir.path()));
        (dir, manager)
    }

    #[test]
    fn missing_file_gives_defaults() {
        let (_dir, manager) = manager();
        assert_eq!(manager.load().unwrap(), AppSettings::default());
    }

    #[test]
    fn save_and_load() {
        let (_dir, manager) = manager();
        let settings = AppSettings {
            show_percent_symbol: false,
            hour12: false,
            pinned_shift: Some(PinnedShift {
                actual_wake: "10:00".parse().unwrap(),
                ideal_wake: "06:00".parse().unwrap(),
            }),
            ..AppSettings::default()
        };

        manager.save(&settings).unwrap();
        let loaded = manager.load().unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.pinned_config().unwrap().offset_minutes, 240);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let (dir, manager) = manager();
        std::fs::write(dir.path().join("settings.json"), r#"{"hour12": false}"#).unwrap();

        let loaded = manager.load().unwrap();
        assert!(!loaded.hour12);
        assert!(loaded.show_percent_symbol);
        assert_eq!(loaded.tick_interval_ms, 1000);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let (dir, manager) = manager();
        std::fs::write(dir.path().join("settings.json"), "{").unwrap();
        assert!(manager.load().is_err());
        assert_eq!(manager.load().unwrap_or_default(), AppSettings::default());
    }

    #[test]
    fn tick_interval_has_a_floor() {
        let settings = AppSettings {
            tick_interval_ms: 5,
            ..AppSettings::default()
        };
        assert_eq!(settings.tick_interval(), Duration::from_millis(100));
        assert_eq!(AppSettings::default().tick_interval(), Duration::from_secs(1));
        assert_eq!(
            AppSettings::default().pulse_duration(),
            chrono::Duration::milliseconds(800)
        );

        let settings = AppSettings {
            pulse_ms: u64::MAX,
            ..AppSettings::default()
        };
        assert_eq!(settings.pulse_duration(), chrono::Duration::seconds(10));
    }
}
