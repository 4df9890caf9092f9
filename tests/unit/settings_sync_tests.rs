/*!
 * Tests for settings synchronization and debounced writes
 */

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::sleep;
use tokio_test::{assert_err, assert_ok};

use vocab_drill::app_config::SettingsConfig;
use vocab_drill::models::SettingKey;
use vocab_drill::store::{MockBehavior, MockWordStore, StoreCall};
use vocab_drill::SettingsSync;

use crate::common::init_logger;

fn sync_with(mock: &MockWordStore, debounce_ms: u64) -> SettingsSync {
    let config = SettingsConfig {
        debounce_ms,
        ..Default::default()
    };
    SettingsSync::new(Arc::new(mock.clone()), &config)
}

#[tokio::test]
async fn test_getSetting_shouldOverwriteCachedValue() {
    init_logger();
    let mock = MockWordStore::working().with_setting(SettingKey::CheckMethod, json!("typing"));
    let sync = sync_with(&mock, 1000);

    let value = assert_ok!(sync.get_setting(SettingKey::CheckMethod).await);

    assert_eq!(value, "typing");
    assert_eq!(sync.value(SettingKey::CheckMethod), "typing");
}

#[tokio::test]
async fn test_getSetting_withFailure_shouldKeepDefault() {
    init_logger();
    let sync = sync_with(&MockWordStore::failing(), 1000);

    assert_err!(sync.get_setting(SettingKey::TranslationDirection).await);

    assert_eq!(sync.value(SettingKey::TranslationDirection), "en-ru");
}

#[tokio::test]
async fn test_getSetting_withNonIntegerMaxRepetitions_shouldKeepPriorValue() {
    init_logger();
    let mock = MockWordStore::working().with_setting(SettingKey::MaxRepetitions, json!("8"));
    let sync = sync_with(&mock, 1000);
    sync.get_setting(SettingKey::MaxRepetitions).await.unwrap();

    mock.set_setting_value(SettingKey::MaxRepetitions, json!("eight"));
    let value = assert_ok!(sync.get_setting(SettingKey::MaxRepetitions).await);

    assert_eq!(value, "8");
    assert_eq!(sync.max_repetitions(), 8);
}

#[tokio::test]
async fn test_setSetting_shouldCacheSentValueAfterConfirmation() {
    init_logger();
    let mock = MockWordStore::working();
    let sync = sync_with(&mock, 1000);

    assert_ok!(sync.set_setting(SettingKey::PlayAudio, "false").await);

    assert!(!sync.play_audio());
    assert_eq!(mock.setting(SettingKey::PlayAudio), Some(json!("false")));
}

#[tokio::test]
async fn test_setSetting_withNonIntegerMaxRepetitions_shouldNotContactStore() {
    init_logger();
    let mock = MockWordStore::working();
    let sync = sync_with(&mock, 1000);

    let saved = assert_ok!(sync.set_setting(SettingKey::MaxRepetitions, "many").await);

    assert!(!saved);
    assert_eq!(mock.count_calls(|c| matches!(c, StoreCall::PutSetting(..))), 0);
    assert_eq!(mock.setting(SettingKey::MaxRepetitions), None);
    assert_eq!(sync.max_repetitions(), 10);
}

#[tokio::test(start_paused = true)]
async fn test_debouncedUpdate_withNonIntegerMaxRepetitions_shouldNotWrite() {
    init_logger();
    let mock = MockWordStore::working();
    let sync = sync_with(&mock, 1000);

    sync.debounced_update(SettingKey::MaxRepetitions, "lots");
    sleep(Duration::from_millis(1100)).await;

    assert!(mock.setting_writes(SettingKey::MaxRepetitions).is_empty());
    assert_eq!(sync.max_repetitions(), 10);
}

#[tokio::test]
async fn test_setSetting_withFailure_shouldNotChangeCache() {
    init_logger();
    let sync = sync_with(&MockWordStore::failing(), 1000);

    assert_err!(sync.set_setting(SettingKey::CheckMethod, "typing").await);

    assert_eq!(sync.value(SettingKey::CheckMethod), "choice");
}

#[tokio::test(start_paused = true)]
async fn test_debouncedUpdate_threeCallsInWindow_shouldWriteLastValueOnce() {
    init_logger();
    let mock = MockWordStore::working();
    let sync = sync_with(&mock, 1000);

    sync.debounced_update(SettingKey::MaxRepetitions, "5");
    sync.debounced_update(SettingKey::MaxRepetitions, "6");
    sync.debounced_update(SettingKey::MaxRepetitions, "7");
    sleep(Duration::from_millis(1100)).await;

    assert_eq!(mock.setting_writes(SettingKey::MaxRepetitions), vec!["7".to_string()]);
    assert_eq!(sync.max_repetitions(), 7);
}

#[tokio::test(start_paused = true)]
async fn test_debouncedUpdate_shouldResetTimerOnEveryCall() {
    init_logger();
    let mock = MockWordStore::working();
    let sync = sync_with(&mock, 1000);

    sync.debounced_update(SettingKey::MaxRepetitions, "3");
    sleep(Duration::from_millis(700)).await;
    sync.debounced_update(SettingKey::MaxRepetitions, "4");
    sleep(Duration::from_millis(700)).await;

    // 1400ms after the first call, but only 700ms after the last one
    assert!(mock.setting_writes(SettingKey::MaxRepetitions).is_empty());
    assert_eq!(sync.pending_keys(), vec![SettingKey::MaxRepetitions]);

    sleep(Duration::from_millis(400)).await;
    assert_eq!(mock.setting_writes(SettingKey::MaxRepetitions), vec!["4".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_debouncedUpdate_shouldKeepKeysIndependent() {
    init_logger();
    let mock = MockWordStore::working();
    let sync = sync_with(&mock, 1000);

    sync.debounced_update(SettingKey::MaxRepetitions, "12");
    sleep(Duration::from_millis(500)).await;
    sync.debounced_update(SettingKey::CheckMethod, "typing");
    sleep(Duration::from_millis(600)).await;

    assert_eq!(mock.setting_writes(SettingKey::MaxRepetitions), vec!["12".to_string()]);
    assert!(mock.setting_writes(SettingKey::CheckMethod).is_empty());

    sleep(Duration::from_millis(500)).await;
    assert_eq!(mock.setting_writes(SettingKey::CheckMethod), vec!["typing".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_debouncedUpdate_withConfiguredWindow_shouldHonorIt() {
    init_logger();
    let mock = MockWordStore::working();
    let sync = sync_with(&mock, 3000);

    sync.debounced_update(SettingKey::PlayAudio, "false");
    sleep(Duration::from_millis(2500)).await;
    assert!(mock.setting_writes(SettingKey::PlayAudio).is_empty());

    sleep(Duration::from_millis(600)).await;
    assert_eq!(mock.setting_writes(SettingKey::PlayAudio), vec!["false".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_debouncedUpdate_withFailingStore_shouldKeepCachedValue() {
    init_logger();
    let mock = MockWordStore::failing();
    let sync = sync_with(&mock, 1000);

    sync.debounced_update(SettingKey::MaxRepetitions, "4");
    sleep(Duration::from_millis(1100)).await;

    assert_eq!(mock.count_calls(|c| matches!(c, StoreCall::PutSetting(..))), 1);
    assert_eq!(sync.max_repetitions(), 10);
    assert!(sync.pending_keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_flush_shouldWritePendingValuesImmediately() {
    init_logger();
    let mock = MockWordStore::working();
    let sync = sync_with(&mock, 1000);

    sync.debounced_update(SettingKey::MaxRepetitions, "6");
    sync.debounced_update(SettingKey::CheckMethod, "typing");
    assert_ok!(sync.flush().await);

    assert_eq!(mock.setting_writes(SettingKey::MaxRepetitions), vec!["6".to_string()]);
    assert_eq!(mock.setting_writes(SettingKey::CheckMethod), vec!["typing".to_string()]);

    // The cancelled timers must not write a second time
    sleep(Duration::from_millis(2000)).await;
    assert_eq!(mock.count_calls(|c| matches!(c, StoreCall::PutSetting(..))), 2);
}

#[tokio::test(start_paused = true)]
async fn test_flush_withWriteInFlight_shouldWaitForIt() {
    init_logger();
    let mock = MockWordStore::slow(500);
    let sync = sync_with(&mock, 1000);

    sync.debounced_update(SettingKey::MaxRepetitions, "4");
    // Window elapsed, the PUT is still on its way
    sleep(Duration::from_millis(1100)).await;
    assert!(sync.pending_keys().is_empty());
    assert_eq!(mock.setting_writes(SettingKey::MaxRepetitions), vec!["4".to_string()]);

    assert_ok!(sync.flush().await);

    assert_eq!(mock.setting(SettingKey::MaxRepetitions), Some(json!("4")));
    assert_eq!(sync.max_repetitions(), 4);
    assert_eq!(mock.count_calls(|c| matches!(c, StoreCall::PutSetting(..))), 1);
}

#[tokio::test(start_paused = true)]
async fn test_flush_withWriteInFlightAndNewerPending_shouldEndWithNewest() {
    init_logger();
    let mock = MockWordStore::slow(500);
    let sync = sync_with(&mock, 1000);

    sync.debounced_update(SettingKey::MaxRepetitions, "4");
    sleep(Duration::from_millis(1100)).await;
    sync.debounced_update(SettingKey::MaxRepetitions, "5");

    assert_ok!(sync.flush().await);

    assert_eq!(
        mock.setting_writes(SettingKey::MaxRepetitions),
        vec!["4".to_string(), "5".to_string()]
    );
    assert_eq!(mock.setting(SettingKey::MaxRepetitions), Some(json!("5")));
    assert_eq!(sync.max_repetitions(), 5);

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(mock.count_calls(|c| matches!(c, StoreCall::PutSetting(..))), 2);
}

#[tokio::test]
async fn test_loadAll_withPartialFailure_shouldLoadTheRest() {
    init_logger();
    let mock = MockWordStore::working()
        .with_setting(SettingKey::MaxRepetitions, json!(15))
        .with_setting(SettingKey::PlayAudio, json!(false));
    let sync = sync_with(&mock, 1000);

    let results = sync.load_all().await;

    assert_eq!(results.len(), 4);
    let failed: Vec<SettingKey> = results.iter().filter(|(_, r)| r.is_err()).map(|(k, _)| *k).collect();
    assert_eq!(failed, vec![SettingKey::TranslationDirection, SettingKey::CheckMethod]);
    assert_eq!(sync.max_repetitions(), 15);
    assert!(!sync.play_audio());
}

#[tokio::test]
async fn test_loadAll_afterRecovery_shouldIssueOneRequestPerKey() {
    init_logger();
    let mock = MockWordStore::failing();
    let sync = sync_with(&mock, 1000);
    sync.load_all().await;
    mock.set_behavior(MockBehavior::Working);

    sync.load_all().await;

    assert_eq!(mock.count_calls(|c| matches!(c, StoreCall::GetSetting(_))), 8);
}
