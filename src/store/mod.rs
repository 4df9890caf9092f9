/*!
 * Remote word store clients.
 *
 * This module contains the seam between the caches and the word service:
 * - `http`: reqwest client for the real HTTP service
 * - `mock`: in-memory store used by tests and offline demos
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::StoreError;
use crate::models::{SelectWordPayload, SettingKey, SettingRecord, Word, WordId, WordPatch};

/// Common trait for all word store backends
///
/// Every method maps to exactly one remote call. Implementations never retry;
/// any failure is reported as [`StoreError::NetworkFailure`] and the caller
/// decides what to do with it.
#[async_trait]
pub trait WordStore: Send + Sync + Debug {
    /// GET `/words`
    async fn list_words(&self) -> Result<Vec<Word>, StoreError>;

    /// GET `/words/selected`
    async fn list_selected(&self) -> Result<Vec<Word>, StoreError>;

    /// POST `/words/select-words`
    async fn select_words(&self, payload: &[SelectWordPayload]) -> Result<Vec<Word>, StoreError>;

    /// PATCH `/words/{id}`
    async fn update_word(&self, id: WordId, patch: &WordPatch) -> Result<Word, StoreError>;

    /// POST `/words/clear-selected`
    async fn clear_selected(&self) -> Result<(), StoreError>;

    /// GET `/settings/{key}`
    async fn get_setting(&self, key: SettingKey) -> Result<SettingRecord, StoreError>;

    /// PUT `/settings/{key}`
    async fn put_setting(&self, key: SettingKey, value: &str) -> Result<(), StoreError>;
}

pub mod http;
pub mod mock;

pub use self::http::HttpWordStore;
pub use self::mock::{MockBehavior, MockWordStore, StoreCall};
