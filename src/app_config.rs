use anyhow::{Context, Result, anyhow};
use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use crate::models::SettingKey;

/// Application configuration module
/// This module handles loading, validating and saving the client settings:
/// where the word store lives, how settings writes are debounced and which
/// values settings hold before the store answers.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Remote word store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Settings synchronization
    #[serde(default)]
    pub settings: SettingsConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Word store connection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StoreConfig {
    // @field: Service URL, resource paths are resolved against it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    // @field: Request timeout seconds, none waits forever
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

/// Settings synchronization configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SettingsConfig {
    /// Quiet period in milliseconds before a debounced write is sent
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Values used until the store has been read
    #[serde(default)]
    pub defaults: SettingDefaults,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            defaults: SettingDefaults::default(),
        }
    }
}

impl SettingsConfig {
    /// The debounce quiet window
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Default values for every setting key
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SettingDefaults {
    #[serde(default = "default_max_repetitions")]
    pub max_repetitions: String,

    #[serde(default = "default_translation_direction")]
    pub translation_direction: String,

    #[serde(default = "default_check_method")]
    pub check_method: String,

    #[serde(default = "default_play_audio")]
    pub play_audio: String,
}

impl Default for SettingDefaults {
    fn default() -> Self {
        Self {
            max_repetitions: default_max_repetitions(),
            translation_direction: default_translation_direction(),
            check_method: default_check_method(),
            play_audio: default_play_audio(),
        }
    }
}

impl SettingDefaults {
    /// Default value for a key
    pub fn value_for(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::MaxRepetitions => &self.max_repetitions,
            SettingKey::TranslationDirection => &self.translation_direction,
            SettingKey::CheckMethod => &self.check_method,
            SettingKey::PlayAudio => &self.play_audio,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_max_repetitions() -> String {
    "10".to_string()
}

fn default_translation_direction() -> String {
    "en-ru".to_string()
}

fn default_check_method() -> String {
    "choice".to_string()
}

fn default_play_audio() -> String {
    "true".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.store.base_url)
            .with_context(|| format!("Invalid store base URL: {}", self.store.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!("Store base URL must use http or https, got '{}'", url.scheme()));
        }

        if self.settings.debounce_ms == 0 {
            return Err(anyhow!("settings.debounce_ms must be greater than zero"));
        }

        self.settings
            .defaults
            .max_repetitions
            .trim()
            .parse::<u32>()
            .with_context(|| {
                format!(
                    "Default max_repetitions must be an integer, got '{}'",
                    self.settings.defaults.max_repetitions
                )
            })?;

        Ok(())
    }

    /// Load the configuration file, writing the defaults if it does not exist
    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let file = File::open(config_path)
                .with_context(|| format!("Failed to open config file: {}", config_path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", config_path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", config_path.display()))?;

        Ok(config)
    }
}
