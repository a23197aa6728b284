//! TOML-based application configuration.
//!
//! Stores:
//! - Recommendation thresholds and confidence values
//! - An optional custom catalog file
//! - Log level
//!
//! Configuration is stored at `~/.config/stillpoint/config.toml`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError, Result};

/// Tunables for the recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Favorites kept in a pattern profile
    #[serde(default = "default_favorites_limit")]
    pub favorites_limit: usize,
    /// Completions before an activity counts as a strong favorite
    #[serde(default = "default_strong_favorite_min_count")]
    pub strong_favorite_min_count: usize,
    /// Completions at which a favorite wins regardless of time of day
    #[serde(default = "default_favorite_override_count")]
    pub favorite_override_count: usize,
    /// History size needed before routine matching applies
    #[serde(default = "default_routine_min_entries")]
    pub routine_min_entries: usize,
    #[serde(default = "default_baseline_confidence")]
    pub baseline_confidence: f64,
    #[serde(default = "default_favorite_confidence_cap")]
    pub favorite_confidence_cap: f64,
    #[serde(default = "default_routine_confidence")]
    pub routine_confidence: f64,
    #[serde(default = "default_mood_confidence")]
    pub mood_confidence: f64,
    #[serde(default = "default_default_confidence")]
    pub default_confidence: f64,
    #[serde(default = "default_favorite_list_confidence")]
    pub favorite_list_confidence: f64,
    #[serde(default = "default_explore_confidence")]
    pub explore_confidence: f64,
    /// List length used by the CLI when none is given
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

/// Catalog source configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Custom catalog TOML; the built-in catalog is used when unset.
    #[serde(default)]
    pub path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/stillpoint/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

// Default functions
fn default_favorites_limit() -> usize {
    5
}
fn default_strong_favorite_min_count() -> usize {
    3
}
fn default_favorite_override_count() -> usize {
    5
}
fn default_routine_min_entries() -> usize {
    3
}
fn default_baseline_confidence() -> f64 {
    0.5
}
fn default_favorite_confidence_cap() -> f64 {
    0.95
}
fn default_routine_confidence() -> f64 {
    0.8
}
fn default_mood_confidence() -> f64 {
    0.75
}
fn default_default_confidence() -> f64 {
    0.7
}
fn default_favorite_list_confidence() -> f64 {
    0.8
}
fn default_explore_confidence() -> f64 {
    0.6
}
fn default_limit() -> usize {
    5
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            favorites_limit: default_favorites_limit(),
            strong_favorite_min_count: default_strong_favorite_min_count(),
            favorite_override_count: default_favorite_override_count(),
            routine_min_entries: default_routine_min_entries(),
            baseline_confidence: default_baseline_confidence(),
            favorite_confidence_cap: default_favorite_confidence_cap(),
            routine_confidence: default_routine_confidence(),
            mood_confidence: default_mood_confidence(),
            default_confidence: default_default_confidence(),
            favorite_list_confidence: default_favorite_list_confidence(),
            explore_confidence: default_explore_confidence(),
            default_limit: default_limit(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl EngineConfig {
    /// Check that confidences lie in [0, 1] and counts are positive.
    ///
    /// # Errors
    ///
    /// Returns the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let confidences = [
            ("engine.baseline_confidence", self.baseline_confidence),
            ("engine.favorite_confidence_cap", self.favorite_confidence_cap),
            ("engine.routine_confidence", self.routine_confidence),
            ("engine.mood_confidence", self.mood_confidence),
            ("engine.default_confidence", self.default_confidence),
            ("engine.favorite_list_confidence", self.favorite_list_confidence),
            ("engine.explore_confidence", self.explore_confidence),
        ];
        for (key, value) in confidences {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("{value} is outside [0, 1]"),
                });
            }
        }

        let counts = [
            ("engine.favorites_limit", self.favorites_limit),
            ("engine.strong_favorite_min_count", self.strong_favorite_min_count),
            ("engine.favorite_override_count", self.favorite_override_count),
            ("engine.routine_min_entries", self.routine_min_entries),
            ("engine.default_limit", self.default_limit),
        ];
        for (key, value) in counts {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be at least 1".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Returns `~/.config/stillpoint[-dev]/` based on STILLPOINT_ENV.
///
/// Set STILLPOINT_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("STILLPOINT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("stillpoint-dev")
    } else {
        base_dir.join("stillpoint")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
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
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a value fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.engine.validate()?;
        Ok(cfg)
    }

    /// Load from disk or write and return the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::path()?)
    }

    /// Load from an explicit path, writing defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the default cannot
    /// be written.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| {
                CoreError::from(ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(CoreError::Io(err)),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
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

    /// Update a value in memory by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self)
            .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.engine.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
