//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Setup-form defaults (interval count, phase amounts, measurement)
//! - Cue preferences (sound guidance, volume, vibration)
//! - Tracking policies (pause behavior, denied-permission behavior)
//!
//! Configuration is stored at `~/.config/rhythm/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::session::{Measurement, PausePolicy, SessionConfig};

/// Setup-form defaults, applied when a session command omits a flag.
///
/// Both unit families are kept so switching measurement mode restores the
/// matching amounts, the way the setup sliders do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupDefaults {
    #[serde(default = "default_interval_count")]
    pub interval_count: u32,
    #[serde(default = "default_measurement")]
    pub measurement: Measurement,
    /// Seconds.
    #[serde(default = "default_work_secs")]
    pub work_secs: f64,
    #[serde(default = "default_rest_secs")]
    pub rest_secs: f64,
    /// Meters.
    #[serde(default = "default_work_meters")]
    pub work_meters: f64,
    #[serde(default = "default_rest_meters")]
    pub rest_meters: f64,
}

/// Cue preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CueConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_50")]
    pub volume: u32,
    #[serde(default = "default_true")]
    pub vibration: bool,
}

/// Distance-tracking policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    #[serde(default)]
    pub pause_policy: PausePolicy,
    #[serde(default = "default_true")]
    pub block_on_denied: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/rhythm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: SetupDefaults,
    #[serde(default)]
    pub cues: CueConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
}

// Default functions
fn default_interval_count() -> u32 {
    5
}
fn default_measurement() -> Measurement {
    Measurement::Time
}
fn default_work_secs() -> f64 {
    120.0
}
fn default_rest_secs() -> f64 {
    60.0
}
fn default_work_meters() -> f64 {
    400.0
}
fn default_rest_meters() -> f64 {
    200.0
}
fn default_true() -> bool {
    true
}
fn default_50() -> u32 {
    50
}

impl Default for SetupDefaults {
    fn default() -> Self {
        Self {
            interval_count: default_interval_count(),
            measurement: default_measurement(),
            work_secs: default_work_secs(),
            rest_secs: default_rest_secs(),
            work_meters: default_work_meters(),
            rest_meters: default_rest_meters(),
        }
    }
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 50,
            vibration: true,
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            pause_policy: PausePolicy::default(),
            block_on_denied: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: SetupDefaults::default(),
            cues: CueConfig::default(),
            tracking: TrackingConfig::default(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err("config key is empty".into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| format!("unknown config key: {key}"))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| format!("unknown config key: {key}"))?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse::<bool>()?),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| format!("cannot parse '{value}' as number"))?
                        } else {
                            return Err(format!("cannot parse '{value}' as number").into());
                        }
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| format!("unknown config key: {key}"))?;
        }

        Err(format!("unknown config key: {key}").into())
    }

    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()?;
        Ok(())
    }

    /// Build a [`SessionConfig`] from the stored defaults.
    pub fn session_config(&self, measurement: Option<Measurement>) -> SessionConfig {
        let measurement = measurement.unwrap_or(self.defaults.measurement);
        let (work_amount, rest_amount) = match measurement {
            Measurement::Time => (self.defaults.work_secs, self.defaults.rest_secs),
            Measurement::Distance => (self.defaults.work_meters, self.defaults.rest_meters),
        };
        SessionConfig {
            interval_count: self.defaults.interval_count,
            measurement,
            work_amount,
            rest_amount,
            audio_enabled: self.cues.enabled,
            pause_policy: self.tracking.pause_policy,
            block_on_denied: self.tracking.block_on_denied,
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.defaults.interval_count, 5);
        assert_eq!(parsed.cues.volume, 50);
        assert_eq!(parsed.tracking.pause_policy, PausePolicy::KeepTracking);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.defaults.work_secs, 120.0);
        assert!(parsed.tracking.block_on_denied);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("defaults.interval_count").as_deref(), Some("5"));
        assert_eq!(cfg.get("cues.enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("defaults.measurement").as_deref(), Some("time"));
        assert!(cfg.get("defaults.missing_key").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "cues.enabled", "false").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "cues.enabled").unwrap(),
            &serde_json::Value::Bool(false)
        );
    }

    #[test]
    fn set_json_value_by_path_updates_nested_number() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "defaults.interval_count", "8").unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "defaults.interval_count").unwrap(),
            &serde_json::Value::Number(8.into())
        );
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        assert!(Config::set_json_value_by_path(&mut json, "defaults.nope", "1").is_err());
    }

    #[test]
    fn session_config_picks_units_by_measurement() {
        let cfg = Config::default();
        let time = cfg.session_config(Some(Measurement::Time));
        assert_eq!(time.work_amount, 120.0);
        let distance = cfg.session_config(Some(Measurement::Distance));
        assert_eq!(distance.work_amount, 400.0);
        assert_eq!(distance.rest_amount, 200.0);
    }
}
