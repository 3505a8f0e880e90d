//! TOML-based application configuration.
//!
//! Stores:
//! - Scoring weights for the recommender
//! - Score memo settings (TTL and capacity)
//! - Thresholds for contextual insights
//! - An optional override for the workspace snapshot path
//!
//! Configuration is stored at `<data dir>/config.toml`.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::insights::InsightSettings;
use crate::recommend::ScoringWeights;

/// Longest score memo TTL accepted from config (30 days).
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// Score memo configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub insights: InsightSettings,
    /// Workspace snapshot to read when `--workspace` is not given.
    #[serde(default)]
    pub workspace_path: Option<String>,
}

fn default_true() -> bool {
    true
}
fn default_ttl_secs() -> u64 {
    60
}
fn default_capacity() -> usize {
    100
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl_secs(),
            capacity: default_capacity(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                key: "cache.ttl_secs".into(),
                message: format!("{} exceeds the {MAX_CACHE_TTL_SECS}s limit", self.ttl_secs),
            });
        }
        Ok(())
    }

    /// Memo TTL as a duration.
    pub fn ttl(&self) -> Result<Duration, ConfigError> {
        i64::try_from(self.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "cache.ttl_secs".into(),
                message: format!("{} seconds is out of range", self.ttl_secs),
            })
    }
}

impl Config {
    /// Check every section that has bounds: scoring weight ordering, memo
    /// TTL and insight windows.
    pub fn validate(&self) -> Result<()> {
        self.scoring.validate()?;
        self.cache.validate()?;
        self.insights.validate()?;
        Ok(())
    }

    /// Find `key` in the serialized config. Keys are `section.field` or a
    /// top-level field such as `workspace_path`.
    fn lookup<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
        match key.split_once('.') {
            Some((section, field)) => root.get(section)?.as_object()?.get(field),
            None => root.get(key),
        }
    }

    /// Parse `raw` into the same JSON type as the current value.
    fn parse_like(
        current: &serde_json::Value,
        key: &str,
        raw: &str,
    ) -> Result<serde_json::Value, ConfigError> {
        use serde_json::Value;

        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        match current {
            Value::Bool(_) => raw
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| invalid(format!("cannot parse '{raw}' as bool"))),
            Value::Number(n) if n.is_f64() => raw
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| invalid(format!("cannot parse '{raw}' as number"))),
            Value::Number(_) => raw
                .parse::<u64>()
                .map(Value::from)
                .map_err(|_| invalid(format!("cannot parse '{raw}' as whole number"))),
            Value::Null | Value::String(_) => Ok(Value::String(raw.to_string())),
            Value::Object(_) | Value::Array(_) => Err(invalid(
                "set individual fields, e.g. 'cache.ttl_secs'".to_string(),
            )),
        }
    }

    fn assign(root: &mut serde_json::Value, key: &str, raw: &str) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let (table, field) = match key.split_once('.') {
            Some((section, field)) => (
                root.get_mut(section)
                    .and_then(serde_json::Value::as_object_mut)
                    .ok_or_else(unknown)?,
                field,
            ),
            None => (root.as_object_mut().ok_or_else(unknown)?, key),
        };
        let slot = table.get_mut(field).ok_or_else(unknown)?;
        *slot = Self::parse_like(slot, key, raw)?;
        Ok(())
    }

    /// Path of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from a specific file, writing defaults there if it is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                tracing::debug!(path = %path.display(), "loaded config");
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::info!(path = %path.display(), "wrote default config");
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
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
        let val = Self::lookup(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update a value in memory without saving.
    ///
    /// The value keeps the type of the existing field, and the whole config
    /// is re-validated before it replaces `self`.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::assign(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// the resulting weights are invalid, or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }
}
