/*!
 * Tests for application configuration functionality
 */

use std::fs;

use tempfile::TempDir;

use vocab_drill::app_config::{Config, LogLevel};
use vocab_drill::models::SettingKey;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.store.base_url, "http://localhost:8000");
    assert_eq!(config.store.timeout_secs, None);
    assert_eq!(config.settings.debounce_ms, 1000);
    assert_eq!(config.settings.defaults.value_for(SettingKey::MaxRepetitions), "10");
    assert_eq!(config.settings.defaults.value_for(SettingKey::TranslationDirection), "en-ru");
    assert_eq!(config.settings.defaults.value_for(SettingKey::CheckMethod), "choice");
    assert_eq!(config.settings.defaults.value_for(SettingKey::PlayAudio), "true");
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.store.base_url = "not a url".to_string();
    assert!(config.validate().is_err());
    config.store.base_url = "https://words.example/api/".to_string();
    assert!(config.validate().is_ok());

    config.settings.debounce_ms = 0;
    assert!(config.validate().is_err());
    config.settings.debounce_ms = 250;
    assert!(config.validate().is_ok());

    config.settings.defaults.max_repetitions = "-3".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");

    let config = Config::load_or_create(&path).unwrap();

    assert!(path.exists());
    assert_eq!(config.settings.debounce_ms, 1000);
    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written["store"]["base_url"], "http://localhost:8000");
    assert_eq!(written["settings"]["defaults"]["check_method"], "choice");
    assert_eq!(written["log_level"], "info");
}

#[test]
fn test_loadOrCreate_withExistingFile_shouldReadIt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    fs::write(
        &path,
        r#"{
            "store": { "base_url": "http://10.0.0.2:9000", "timeout_secs": 5 },
            "settings": { "debounce_ms": 400, "defaults": { "play_audio": "false" } },
            "log_level": "debug"
        }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.store.base_url, "http://10.0.0.2:9000");
    assert_eq!(config.store.timeout_secs, Some(5));
    assert_eq!(config.settings.debounce_ms, 400);
    assert_eq!(config.settings.defaults.play_audio, "false");
    assert_eq!(config.settings.defaults.max_repetitions, "10");
    assert_eq!(config.log_level, LogLevel::Debug);
}

#[test]
fn test_loadOrCreate_withMalformedFile_shouldFail() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("conf.json");
    fs::write(&path, "{ store: ").unwrap();

    let error = Config::load_or_create(&path).unwrap_err();

    assert!(error.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_logLevel_toLevelFilter_shouldMapEveryLevel() {
    use log::LevelFilter;

    assert_eq!(LogLevel::Error.to_level_filter(), LevelFilter::Error);
    assert_eq!(LogLevel::Warn.to_level_filter(), LevelFilter::Warn);
    assert_eq!(LogLevel::Info.to_level_filter(), LevelFilter::Info);
    assert_eq!(LogLevel::Debug.to_level_filter(), LevelFilter::Debug);
    assert_eq!(LogLevel::Trace.to_level_filter(), LevelFilter::Trace);
}
