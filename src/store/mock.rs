/*!
 * In-memory word store for testing.
 *
 * The mock keeps a word table and a settings table and behaves like the
 * real service. Every call is recorded so tests can count remote mutations:
 * - `MockWordStore::working()` - always succeeds
 * - `MockWordStore::failing()` - every call fails with a network failure
 * - `MockWordStore::slow(ms)` - succeeds after a delay
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::errors::StoreError;
use crate::models::{SelectWordPayload, SettingKey, SettingRecord, Word, WordId, WordPatch};
use crate::store::WordStore;

/// Behavior mode for the mock store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with a network failure
    Failing,
    /// Succeeds after the given delay
    Slow { delay_ms: u64 },
}

/// A recorded remote call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    ListWords,
    ListSelected,
    SelectWords(Vec<SelectWordPayload>),
    UpdateWord(WordId, WordPatch),
    ClearSelected,
    GetSetting(SettingKey),
    PutSetting(SettingKey, String),
}

#[derive(Debug, Default)]
struct MockState {
    words: Vec<Word>,
    settings: HashMap<SettingKey, serde_json::Value>,
    calls: Vec<StoreCall>,
}

/// Mock word store shared between clones
#[derive(Debug, Clone)]
pub struct MockWordStore {
    behavior: Arc<Mutex<MockBehavior>>,
    state: Arc<Mutex<MockState>>,
}

impl MockWordStore {
    /// Create a new mock store with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Seed the word table
    pub fn with_words(self, words: Vec<Word>) -> Self {
        self.state.lock().words = words;
        self
    }

    /// Seed a setting with a raw JSON value
    pub fn with_setting(self, key: SettingKey, value: serde_json::Value) -> Self {
        self.state.lock().settings.insert(key, value);
        self
    }

    /// Replace a setting's raw JSON value
    pub fn set_setting_value(&self, key: SettingKey, value: serde_json::Value) {
        self.state.lock().settings.insert(key, value);
    }

    /// Switch behavior for subsequent calls
    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock() = behavior;
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    /// Number of recorded calls matching the predicate
    pub fn count_calls(&self, predicate: impl Fn(&StoreCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    /// Number of PATCH calls for a word
    pub fn update_calls_for(&self, id: WordId) -> usize {
        self.count_calls(|c| matches!(c, StoreCall::UpdateWord(word_id, _) if *word_id == id))
    }

    /// Values written for a setting, oldest first
    pub fn setting_writes(&self, key: SettingKey) -> Vec<String> {
        self.state
            .lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                StoreCall::PutSetting(k, v) if *k == key => Some(v.clone()),
                _ => None,
            })
            .collect()
    }

    /// Current server-side copy of a word
    pub fn word(&self, id: WordId) -> Option<Word> {
        self.state.lock().words.iter().find(|w| w.id == id).cloned()
    }

    /// Current server-side value of a setting
    pub fn setting(&self, key: SettingKey) -> Option<serde_json::Value> {
        self.state.lock().settings.get(&key).cloned()
    }

    /// Record the call, then wait or fail according to the behavior
    async fn enter(&self, call: StoreCall) -> Result<(), StoreError> {
        self.state.lock().calls.push(call);
        let behavior = *self.behavior.lock();
        match behavior {
            MockBehavior::Working => Ok(()),
            MockBehavior::Failing => Err(StoreError::status(500, "mock store failure")),
            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(())
            }
        }
    }
}

impl Default for MockWordStore {
    fn default() -> Self {
        Self::working()
    }
}

#[async_trait]
impl WordStore for MockWordStore {
    async fn list_words(&self) -> Result<Vec<Word>, StoreError> {
        self.enter(StoreCall::ListWords).await?;
        Ok(self.state.lock().words.clone())
    }

    async fn list_selected(&self) -> Result<Vec<Word>, StoreError> {
        self.enter(StoreCall::ListSelected).await?;
        Ok(self.state.lock().words.iter().filter(|w| w.selected).cloned().collect())
    }

    async fn select_words(&self, payload: &[SelectWordPayload]) -> Result<Vec<Word>, StoreError> {
        self.enter(StoreCall::SelectWords(payload.to_vec())).await?;
        let mut state = self.state.lock();
        let mut confirmed = Vec::new();
        for item in payload {
            if let Some(word) = state.words.iter_mut().find(|w| w.id == item.id) {
                word.selected = item.selected;
                word.repetition_count = item.repetition_count;
                confirmed.push(word.clone());
            }
        }
        Ok(confirmed)
    }

    async fn update_word(&self, id: WordId, patch: &WordPatch) -> Result<Word, StoreError> {
        self.enter(StoreCall::UpdateWord(id, patch.clone())).await?;
        let mut state = self.state.lock();
        let word = state
            .words
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| StoreError::status(404, format!("word {} not found", id)))?;
        patch.apply_to(word);
        Ok(word.clone())
    }

    async fn clear_selected(&self) -> Result<(), StoreError> {
        self.enter(StoreCall::ClearSelected).await?;
        for word in self.state.lock().words.iter_mut() {
            word.selected = false;
        }
        Ok(())
    }

    async fn get_setting(&self, key: SettingKey) -> Result<SettingRecord, StoreError> {
        self.enter(StoreCall::GetSetting(key)).await?;
        let state = self.state.lock();
        let value = state
            .settings
            .get(&key)
            .cloned()
            .ok_or_else(|| StoreError::status(404, format!("setting {} not found", key)))?;
        Ok(SettingRecord { key: key.to_string(), value })
    }

    async fn put_setting(&self, key: SettingKey, value: &str) -> Result<(), StoreError> {
        self.enter(StoreCall::PutSetting(key, value.to_string())).await?;
        self.state
            .lock()
            .settings
            .insert(key, serde_json::Value::String(value.to_string()));
        Ok(())
    }
}
