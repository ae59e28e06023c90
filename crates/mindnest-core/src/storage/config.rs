//! TOML-based application configuration.
//!
//! Holds the tunables of the reward economy:
//! - Check-in and activity coin amounts
//! - Per-reason daily caps
//! - The UTC offset that defines a calendar day
//! - Sentiment training settings
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::rewards::{RewardPolicy, DAILY_CHALLENGE_CAP, REASON_DAILY_CHALLENGE};
use crate::sentiment::classifier::{DEFAULT_MIN_EXAMPLES, DEFAULT_SMOOTHING};
use crate::sentiment::{ModelStore, SentimentClassifier, SentimentService};
use crate::streak::StreakLedger;

/// Coin amounts and caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsConfig {
    #[serde(default = "default_checkin_coins")]
    pub checkin_coins: i64,
    #[serde(default = "default_activity_coins")]
    pub activity_coins: i64,
    /// Daily cap per reason.
    #[serde(default = "default_caps")]
    pub caps: BTreeMap<String, i64>,
    /// Cap for reasons missing from `caps`; uncapped when absent.
    #[serde(default)]
    pub default_daily_cap: Option<i64>,
}

/// Calendar-day settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

/// Sentiment classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentConfig {
    #[serde(default = "default_min_examples")]
    pub min_examples: usize,
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,
    /// Overrides `<data_dir>/sentiment/model.json`.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
}

// Default functions
fn default_checkin_coins() -> i64 {
    5
}
fn default_activity_coins() -> i64 {
    5
}
fn default_caps() -> BTreeMap<String, i64> {
    BTreeMap::from([(REASON_DAILY_CHALLENGE.to_string(), DAILY_CHALLENGE_CAP)])
}
fn default_min_examples() -> usize {
    DEFAULT_MIN_EXAMPLES
}
fn default_smoothing() -> f64 {
    DEFAULT_SMOOTHING
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            checkin_coins: default_checkin_coins(),
            activity_coins: default_activity_coins(),
            caps: default_caps(),
            default_daily_cap: None,
        }
    }
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
        }
    }
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            min_examples: default_min_examples(),
            smoothing: default_smoothing(),
            model_path: None,
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
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = if value == "none" {
                    // Clears optional fields; required ones fail to deserialize.
                    serde_json::Value::Null
                } else {
                    Self::coerce_like(existing, value).map_err(invalid)?
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    /// Parse `value` into the JSON type of `existing`.
    fn coerce_like(
        existing: &serde_json::Value,
        value: &str,
    ) -> std::result::Result<serde_json::Value, String> {
        let new_value = match existing {
            serde_json::Value::Bool(_) => {
                serde_json::Value::Bool(value.parse::<bool>().map_err(|e| e.to_string())?)
            }
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<i64>() {
                    serde_json::Value::Number(n.into())
                } else if let Ok(n) = value.parse::<f64>() {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| format!("cannot parse '{value}' as number"))?
                } else {
                    return Err(format!("cannot parse '{value}' as number"));
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| e.to_string())?
            }
            // Unset optional fields serialize as null.
            serde_json::Value::Null => match value.parse::<i64>() {
                Ok(n) => serde_json::Value::Number(n.into()),
                Err(_) => serde_json::Value::String(value.into()),
            },
            serde_json::Value::String(_) => serde_json::Value::String(value.into()),
        };
        Ok(new_value)
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from `<data_dir>/config.toml`, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                CoreError::Config(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persist to `<data_dir>/config.toml`.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
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

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Reject values the ledgers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rewards.checkin_coins <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "rewards.checkin_coins".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.rewards.activity_coins <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "rewards.activity_coins".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some((reason, cap)) = self.rewards.caps.iter().find(|(_, cap)| **cap < 0) {
            return Err(ConfigError::InvalidValue {
                key: format!("rewards.caps.{reason}"),
                message: format!("cap {cap} is negative"),
            });
        }
        if self.rewards.default_daily_cap.is_some_and(|cap| cap < 0) {
            return Err(ConfigError::InvalidValue {
                key: "rewards.default_daily_cap".to_string(),
                message: "must not be negative".to_string(),
            });
        }
        StreakLedger::with_utc_offset_minutes(self.streak.utc_offset_minutes).map_err(|e| {
            ConfigError::InvalidValue {
                key: "streak.utc_offset_minutes".to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(())
    }

    /// Cap table for the reward ledger.
    pub fn reward_policy(&self) -> RewardPolicy {
        RewardPolicy::from_caps(self.rewards.caps.clone(), self.rewards.default_daily_cap)
    }

    /// Streak ledger for the configured day offset.
    pub fn streak_ledger(&self) -> Result<StreakLedger> {
        Ok(StreakLedger::with_utc_offset_minutes(
            self.streak.utc_offset_minutes,
        )?)
    }

    /// Sentiment service over the configured model path.
    pub fn sentiment_service(&self) -> Result<SentimentService> {
        let path = match &self.sentiment.model_path {
            Some(path) => path.clone(),
            None => ModelStore::default_path()?,
        };
        let template = SentimentClassifier::new()
            .with_min_examples(self.sentiment.min_examples)
            .with_smoothing(self.sentiment.smoothing);
        Ok(SentimentService::new(ModelStore::new(path), template))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.rewards.checkin_coins, 5);
        assert_eq!(parsed.rewards.caps.get("daily_challenge"), Some(&25));
        assert_eq!(parsed.sentiment.min_examples, 5);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[rewards]\ncheckin_coins = 8\n").unwrap();
        assert_eq!(parsed.rewards.checkin_coins, 8);
        assert_eq!(parsed.rewards.activity_coins, 5);
        assert_eq!(parsed.rewards.caps.get("daily_challenge"), Some(&25));
        assert_eq!(parsed.streak.utc_offset_minutes, 0);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("rewards.checkin_coins").as_deref(), Some("5"));
        assert_eq!(cfg.get("rewards.caps.daily_challenge").as_deref(), Some("25"));
        assert!(cfg.get("rewards.missing_key").is_none());
    }

    #[test]
    fn set_value_updates_nested_number() {
        let mut cfg = Config::default();
        cfg.set_value("rewards.caps.daily_challenge", "40").unwrap();
        assert_eq!(cfg.reward_policy().cap_for("daily_challenge"), Some(40));
    }

    #[test]
    fn set_value_replaces_cap_table() {
        let mut cfg = Config::default();
        cfg.set_value("rewards.caps", r#"{"game": 15}"#).unwrap();
        assert_eq!(cfg.reward_policy().cap_for("game"), Some(15));
        assert_eq!(cfg.reward_policy().cap_for("daily_challenge"), None);
    }

    #[test]
    fn set_value_sets_and_clears_optional_default_cap() {
        let mut cfg = Config::default();
        cfg.set_value("rewards.default_daily_cap", "200").unwrap();
        assert_eq!(cfg.rewards.default_daily_cap, Some(200));
        cfg.set_value("rewards.default_daily_cap", "none").unwrap();
        assert_eq!(cfg.rewards.default_daily_cap, None);
    }

    #[test]
    fn set_value_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("rewards.nonexistent_key", "1").is_err());
        assert!(cfg.set_value("", "1").is_err());
    }

    #[test]
    fn set_value_rejects_invalid_values() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("rewards.checkin_coins", "lots").is_err());
        assert!(cfg.set_value("rewards.checkin_coins", "0").is_err());
        assert!(cfg.set_value("streak.utc_offset_minutes", "5000").is_err());
        assert_eq!(cfg.rewards.checkin_coins, 5);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.rewards.checkin_coins, 5);
    }

    #[test]
    fn save_and_load_preserve_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.set_value("streak.utc_offset_minutes", "330").unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.streak.utc_offset_minutes, 330);
    }

    #[test]
    fn unparsable_file_is_a_load_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "rewards = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(CoreError::Config(ConfigError::LoadFailed { .. }))
        ));
    }
}
