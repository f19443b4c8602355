use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_CACHE_TIMEOUT_MINUTES;
use crate::duration::TimingConfig;
use crate::error::LiftRsError;
use crate::export::ExportFormat;
use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// Metric calculation settings
    pub engine: EngineConfig,

    /// Logging settings
    pub logging: LogConfig,

    /// Export preferences
    pub export: ExportSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Settings of the metrics engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Staleness window applied whenever the metrics cache is written
    pub cache_timeout_minutes: u32,

    /// Workout length assumptions
    pub timing: TimingConfig,

    /// Reference body weight for calorie estimates (kg)
    pub body_weight_kg: f64,
}

/// Export preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Format used when none is given on the command line
    pub default_format: ExportFormat,

    /// Weeks projected by `schedule` when not specified
    pub schedule_weeks: u32,

    /// Directory for exported files
    pub output_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();

        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            engine: EngineConfig::default(),
            logging: LogConfig::default(),
            export: ExportSettings::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            cache_timeout_minutes: DEFAULT_CACHE_TIMEOUT_MINUTES,
            timing: TimingConfig::default(),
            body_weight_kg: 70.0,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            default_format: ExportFormat::Text,
            schedule_weeks: 12,
            output_dir: PathBuf::from("./exports"),
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> std::result::Result<(), LiftRsError> {
        if self.cache_timeout_minutes == 0 {
            return Err(LiftRsError::Configuration(
                "cache_timeout_minutes must be greater than zero".to_string(),
            ));
        }
        if !self.body_weight_kg.is_finite() || self.body_weight_kg <= 0.0 {
            return Err(LiftRsError::Configuration(format!(
                "body_weight_kg must be positive, got {}",
                self.body_weight_kg
            )));
        }
        if self.timing.seconds_per_rep == 0 {
            return Err(LiftRsError::Configuration(
                "timing.seconds_per_rep must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration management implementation
impl AppConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;

        config
            .engine
            .validate()
            .with_context(|| format!("Invalid engine settings in {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".liftrs")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();
        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %err,
                    "Config file not loaded, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Read a setting by dotted key, e.g. `engine.cache_timeout_minutes`
    pub fn get_value(&self, key: &str) -> Option<String> {
        let value = toml::Value::try_from(self).ok()?;
        let mut current = &value;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(match current {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Update a setting by dotted key; the value is parsed as TOML, falling
    /// back to a plain string
    pub fn set_value(&mut self, key: &str, raw: &str) -> Result<()> {
        let mut root = toml::Value::try_from(&*self)
            .with_context(|| "Failed to serialize configuration")?;

        let parts: Vec<&str> = key.split('.').collect();
        let (last, parents) = parts
            .split_last()
            .ok_or_else(|| anyhow::anyhow!("Empty configuration key"))?;

        let mut current = &mut root;
        for part in parents {
            current = current
                .get_mut(*part)
                .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", key))?;
        }
        let table = current
            .as_table_mut()
            .ok_or_else(|| anyhow::anyhow!("Not a configuration section: {}", key))?;
        if !table.contains_key(*last) {
            anyhow::bail!("Unknown configuration key: {}", key);
        }

        let parsed = format!("v = {raw}")
            .parse::<toml::Table>()
            .ok()
            .and_then(|mut t| t.remove("v"))
            .unwrap_or_else(|| toml::Value::String(raw.to_string()));
        table.insert((*last).to_string(), parsed);

        let updated: AppConfig = root
            .try_into()
            .with_context(|| format!("Invalid value for {}: {}", key, raw))?;
        updated.engine.validate()?;

        *self = updated;
        self.metadata.updated_at = Utc::now();
        Ok(())
    }
}
