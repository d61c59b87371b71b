//! User settings: durations, auto-start/stop flags, alarm and clock format

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use super::Phase;
use crate::store::{KeyValueStore, StoreError, SETTINGS_KEY};

/// Alert sound selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmSound {
    #[default]
    Bell,
    Chime,
    Digital,
    Soft,
}

impl AlarmSound {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSound::Bell => "bell",
            AlarmSound::Chime => "chime",
            AlarmSound::Digital => "digital",
            AlarmSound::Soft => "soft",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("{0} must be at least 1")]
    OutOfRange(&'static str),
}

/// Persisted user settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    /// Every Nth focus session is followed by a long break
    pub long_break_interval: u32,
    pub auto_start_breaks: bool,
    pub auto_start_focus: bool,
    /// Complete the phase when the countdown hits zero instead of running
    /// into overtime
    pub auto_stop_at_zero: bool,
    pub alarm_enabled: bool,
    pub alarm_sound_id: AlarmSound,
    pub use_24h_format: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            long_break_interval: 4,
            auto_start_breaks: false,
            auto_start_focus: false,
            auto_stop_at_zero: true,
            alarm_enabled: true,
            alarm_sound_id: AlarmSound::Bell,
            use_24h_format: true,
        }
    }
}

impl Settings {
    /// Check the range invariants: every duration and the long break
    /// interval must be at least 1.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let checks = [
            ("focusMinutes", self.focus_minutes),
            ("shortBreakMinutes", self.short_break_minutes),
            ("longBreakMinutes", self.long_break_minutes),
            ("longBreakInterval", self.long_break_interval),
        ];

        match checks.iter().find(|(_, value)| *value == 0) {
            Some((field, _)) => Err(SettingsError::OutOfRange(*field)),
            None => Ok(()),
        }
    }

    /// Configured length of a phase in seconds
    pub fn phase_seconds(&self, phase: Phase) -> i64 {
        let minutes = match phase {
            Phase::Focus => self.focus_minutes,
            Phase::ShortBreak => self.short_break_minutes,
            Phase::LongBreak => self.long_break_minutes,
        };
        i64::from(minutes) * 60
    }

    pub fn phase_minutes(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Focus => self.focus_minutes,
            Phase::ShortBreak => self.short_break_minutes,
            Phase::LongBreak => self.long_break_minutes,
        }
    }

    /// Load settings from the store. Absent or unreadable data yields the
    /// defaults.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => Self::from_json(&raw),
            Ok(None) => {
                debug!("No saved settings, using defaults");
                Self::default()
            }
            Err(e) => {
                warn!("Failed to read settings, using defaults: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        let raw = serde_json::to_string(self)?;
        store.set(SETTINGS_KEY, &raw)
    }

    /// Decode saved settings field by field.
    ///
    /// Each field that is missing, mistyped or out of range falls back to
    /// its default while the others keep their saved values. Keys written
    /// by the older storage shape are read when the current key is absent.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Self::from_map(&map),
            Ok(other) => {
                warn!("Saved settings are not an object ({}), using defaults", other);
                Self::default()
            }
            Err(e) => {
                warn!("Saved settings are malformed, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            focus_minutes: count_field(map, &["focusMinutes", "focusTime"], defaults.focus_minutes),
            short_break_minutes: count_field(
                map,
                &["shortBreakMinutes", "shortBreak"],
                defaults.short_break_minutes,
            ),
            long_break_minutes: count_field(
                map,
                &["longBreakMinutes", "longBreak"],
                defaults.long_break_minutes,
            ),
            long_break_interval: count_field(map, &["longBreakInterval"], defaults.long_break_interval),
            auto_start_breaks: bool_field(map, &["autoStartBreaks"], defaults.auto_start_breaks),
            auto_start_focus: bool_field(
                map,
                &["autoStartFocus", "autoStartPomodoro"],
                defaults.auto_start_focus,
            ),
            auto_stop_at_zero: bool_field(map, &["autoStopAtZero"], defaults.auto_stop_at_zero),
            alarm_enabled: bool_field(map, &["alarmEnabled"], defaults.alarm_enabled),
            alarm_sound_id: sound_field(map, &["alarmSoundId"], defaults.alarm_sound_id),
            use_24h_format: bool_field(map, &["use24hFormat"], defaults.use_24h_format),
        }
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&'static str]) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|key| map.get(*key).map(|value| (*key, value)))
}

fn count_field(map: &Map<String, Value>, keys: &[&'static str], default: u32) -> u32 {
    let Some((key, value)) = lookup(map, keys) else {
        return default;
    };

    match value.as_u64().filter(|v| *v >= 1).and_then(|v| u32::try_from(v).ok()) {
        Some(v) => v,
        None => {
            warn!("Ignoring saved {}={}, using default {}", key, value, default);
            default
        }
    }
}

fn bool_field(map: &Map<String, Value>, keys: &[&'static str], default: bool) -> bool {
    let Some((key, value)) = lookup(map, keys) else {
        return default;
    };

    value.as_bool().unwrap_or_else(|| {
        warn!("Ignoring saved {}={}, using default {}", key, value, default);
        default
    })
}

fn sound_field(map: &Map<String, Value>, keys: &[&'static str], default: AlarmSound) -> AlarmSound {
    let Some((key, value)) = lookup(map, keys) else {
        return default;
    };

    AlarmSound::deserialize(value).unwrap_or_else(|_| {
        warn!("Ignoring saved {}={}, using default {}", key, value, default.as_str());
        default
    })
}
