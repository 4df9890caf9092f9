/*!
 * Settings synchronization.
 *
 * Each setting key is cached, fetched and written independently. Rapid
 * changes go through `debounced_update`, which keeps one cancellable timer
 * per key and only writes the last value once the key has been quiet for
 * the configured window.
 */

use futures::future::join_all;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::app_config::SettingsConfig;
use crate::errors::StoreError;
use crate::models::SettingKey;
use crate::store::WordStore;

/// Used when the cached max repetitions somehow fails to parse
const FALLBACK_MAX_REPETITIONS: u32 = 10;

/// Task performing one debounced write
type WriteTask = JoinHandle<Result<(), StoreError>>;

/// A scheduled debounced write
#[derive(Debug)]
struct PendingWrite {
    value: String,
    generation: u64,
    handle: WriteTask,
}

#[derive(Debug)]
struct SettingsInner {
    store: Arc<dyn WordStore>,
    values: Mutex<HashMap<SettingKey, String>>,
    pending: Mutex<HashMap<SettingKey, PendingWrite>>,
    /// Writes whose window elapsed, by generation. Locked after `pending`.
    in_flight: Mutex<HashMap<u64, WriteTask>>,
    next_generation: Mutex<u64>,
    window: Duration,
}

/// Cached settings with debounced write-back
#[derive(Debug, Clone)]
pub struct SettingsSync {
    inner: Arc<SettingsInner>,
}

impl SettingsSync {
    /// Create a settings cache holding the configured defaults
    pub fn new(store: Arc<dyn WordStore>, config: &SettingsConfig) -> Self {
        let values = SettingKey::ALL
            .into_iter()
            .map(|key| (key, config.defaults.value_for(key).to_string()))
            .collect();

        Self {
            inner: Arc::new(SettingsInner {
                store,
                values: Mutex::new(values),
                pending: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
                next_generation: Mutex::new(0),
                window: config.debounce_window(),
            }),
        }
    }

    /// The debounce quiet window
    pub fn window(&self) -> Duration {
        self.inner.window
    }

    /// Fetch a setting and cache it
    ///
    /// Returns the cached value after the fetch, which is the previous value
    /// when the fetched one was rejected.
    pub async fn get_setting(&self, key: SettingKey) -> Result<String, StoreError> {
        let record = self.inner.store.get_setting(key).await.map_err(|e| {
            error!("Error loading setting {}: {}", key, e);
            e
        })?;

        self.apply(key, record.value_string());
        Ok(self.value(key))
    }

    /// Write a setting and cache the value that was sent
    ///
    /// Returns `Ok(false)` without contacting the store when the value cannot
    /// be held by the key, such as a non-integer max repetitions.
    pub async fn set_setting(&self, key: SettingKey, value: impl Into<String>) -> Result<bool, StoreError> {
        let value = value.into();
        if !self.accepts(key, &value) {
            return Ok(false);
        }

        self.inner.store.put_setting(key, &value).await.map_err(|e| {
            error!("Error saving setting {}: {}", key, e);
            e
        })?;

        debug!("Setting {} saved as '{}'", key, value);
        self.apply(key, value);
        Ok(true)
    }

    /// Schedule a write of `value` once `key` has been quiet for the window
    ///
    /// A call for the same key inside the window cancels the previous one and
    /// restarts the timer. Must be called from within a tokio runtime.
    pub fn debounced_update(&self, key: SettingKey, value: impl Into<String>) {
        let value = value.into();
        let generation = {
            let mut next = self.inner.next_generation.lock();
            *next += 1;
            *next
        };

        let mut pending = self.inner.pending.lock();
        if let Some(previous) = pending.remove(&key) {
            previous.handle.abort();
            debug!("Debounced write of {} superseded ('{}' discarded)", key, previous.value);
        }

        let sync = self.clone();
        let task_value = value.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(sync.inner.window).await;

            // Claim the slot so a later call no longer aborts this write,
            // and hand the handle over so `flush` can still wait for it
            {
                let mut pending = sync.inner.pending.lock();
                match pending.get(&key) {
                    Some(entry) if entry.generation == generation => {
                        if let Some(entry) = pending.remove(&key) {
                            sync.inner.in_flight.lock().insert(generation, entry.handle);
                        }
                    }
                    _ => return Ok(()),
                }
            }

            let result = sync.set_setting(key, task_value).await;
            sync.inner.in_flight.lock().remove(&generation);
            match result {
                Ok(_) => Ok(()),
                Err(e) => {
                    error!("Debounced write of {} failed: {}", key, e);
                    Err(e)
                }
            }
        });

        pending.insert(key, PendingWrite { value, generation, handle });
    }

    /// Keys with a debounced write waiting for its window
    pub fn pending_keys(&self) -> Vec<SettingKey> {
        let mut keys: Vec<SettingKey> = self.inner.pending.lock().keys().copied().collect();
        keys.sort();
        keys
    }

    /// Send every pending debounced write now
    ///
    /// Writes already on their way are awaited first, then the values still
    /// waiting for their window are sent. All writes are attempted; the
    /// first failure is returned.
    pub async fn flush(&self) -> Result<(), StoreError> {
        let (drained, in_flight) = {
            let mut pending = self.inner.pending.lock();
            let drained: Vec<(SettingKey, String)> = pending
                .drain()
                .map(|(key, write)| {
                    write.handle.abort();
                    (key, write.value)
                })
                .collect();
            let mut in_flight: Vec<(u64, WriteTask)> = self.inner.in_flight.lock().drain().collect();
            in_flight.sort_by_key(|(generation, _)| *generation);
            (drained, in_flight)
        };

        if drained.is_empty() && in_flight.is_empty() {
            return Ok(());
        }

        info!(
            "Flushing {} pending and {} in-flight setting writes",
            drained.len(),
            in_flight.len()
        );
        let mut first_error = None;

        for joined in join_all(in_flight.into_iter().map(|(_, handle)| handle)).await {
            let result = joined.unwrap_or_else(|e| {
                Err(StoreError::NetworkFailure(format!("Setting write task failed: {}", e)))
            });
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        let results = join_all(drained.into_iter().map(|(key, value)| self.set_setting(key, value))).await;
        for result in results {
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Fetch every setting concurrently
    ///
    /// Failures do not stop the other keys from loading.
    pub async fn load_all(&self) -> Vec<(SettingKey, Result<String, StoreError>)> {
        let results = join_all(SettingKey::ALL.into_iter().map(|key| self.get_setting(key))).await;
        SettingKey::ALL.into_iter().zip(results).collect()
    }

    /// Cached value of a key
    pub fn value(&self, key: SettingKey) -> String {
        self.inner.values.lock().get(&key).cloned().unwrap_or_default()
    }

    /// Cached max repetitions as an integer
    pub fn max_repetitions(&self) -> u32 {
        parse_max_repetitions(&self.value(SettingKey::MaxRepetitions)).unwrap_or(FALLBACK_MAX_REPETITIONS)
    }

    /// Whether audio should be played after an answer
    pub fn play_audio(&self) -> bool {
        matches!(
            self.value(SettingKey::PlayAudio).trim().to_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        )
    }

    /// Whether `value` can be held by `key`, warning when it cannot
    fn accepts(&self, key: SettingKey, value: &str) -> bool {
        if key == SettingKey::MaxRepetitions && parse_max_repetitions(value).is_none() {
            warn!(
                "Ignoring non-integer {} value '{}', keeping '{}'",
                key,
                value,
                self.value(key)
            );
            return false;
        }
        true
    }

    /// Overwrite the cached value, rejecting values the key cannot hold
    fn apply(&self, key: SettingKey, value: String) -> bool {
        if !self.accepts(key, &value) {
            return false;
        }

        self.inner.values.lock().insert(key, value);
        true
    }
}

fn parse_max_repetitions(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok()
}
