/*!
 * Word catalog cache.
 *
 * Holds the full word list fetched from the store and promotes batches of
 * words into the practice session.
 */

use log::{debug, error, info};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::cache::practice::PracticeSession;
use crate::errors::StoreError;
use crate::models::{SelectWordPayload, Word, WordId};
use crate::store::WordStore;

/// Cache of every word known to the store
#[derive(Debug, Clone)]
pub struct WordCatalog {
    store: Arc<dyn WordStore>,
    words: Arc<RwLock<Vec<Word>>>,
    session: PracticeSession,
}

impl WordCatalog {
    /// Create an empty catalog that promotes into the given session
    pub fn new(store: Arc<dyn WordStore>, session: PracticeSession) -> Self {
        Self {
            store,
            words: Arc::new(RwLock::new(Vec::new())),
            session,
        }
    }

    /// Fetch the entire catalog from the store
    pub async fn fetch_all(&self) -> Result<Vec<Word>, StoreError> {
        debug!("Fetching word catalog");
        self.store.list_words().await.map_err(|e| {
            error!("Error fetching word catalog: {}", e);
            e
        })
    }

    /// Replace the held words wholesale
    pub fn replace_all(&self, data: Vec<Word>) {
        debug!("Replacing word catalog with {} words", data.len());
        *self.words.write() = data;
    }

    /// Fetch the catalog and replace the held words with it
    pub async fn load(&self) -> Result<usize, StoreError> {
        let words = self.fetch_all().await?;
        let len = words.len();
        self.replace_all(words);
        info!("Loaded {} catalog words", len);
        Ok(len)
    }

    /// Mark a batch of words for practice
    ///
    /// Sends one request for the whole batch. Nothing changes locally until
    /// the store answers; then every word it confirms as selected is
    /// promoted into the session. Returns how many words were newly added
    /// to the session.
    pub async fn select_words(&self, words: &[Word]) -> Result<usize, StoreError> {
        if words.is_empty() {
            return Ok(0);
        }

        let payload: Vec<SelectWordPayload> = words.iter().map(SelectWordPayload::from).collect();
        let confirmed = self.store.select_words(&payload).await.map_err(|e| {
            error!("Error selecting {} words: {}", payload.len(), e);
            e
        })?;

        let mut promoted = 0;
        for word in confirmed.into_iter().filter(|w| w.selected) {
            self.mirror(&word);
            if self.session.add_word_in_list_words(word) {
                promoted += 1;
            }
        }

        info!("Selected {} words, {} new in practice", payload.len(), promoted);
        Ok(promoted)
    }

    /// Update the local `selected` flag of a word
    pub fn set_selected(&self, id: WordId, selected: bool) -> bool {
        let mut words = self.words.write();
        match words.iter_mut().find(|w| w.id == id) {
            Some(word) => {
                word.selected = selected;
                if selected {
                    word.repetition_count = 0;
                }
                true
            }
            None => false,
        }
    }

    /// Mark every word as not selected
    pub fn clear_selected(&self) {
        for word in self.words.write().iter_mut() {
            word.selected = false;
        }
    }

    fn mirror(&self, confirmed: &Word) {
        let mut words = self.words.write();
        if let Some(word) = words.iter_mut().find(|w| w.id == confirmed.id) {
            word.selected = confirmed.selected;
            word.repetition_count = confirmed.repetition_count;
        }
    }

    /// Snapshot of the catalog
    pub fn words(&self) -> Vec<Word> {
        self.words.read().clone()
    }

    pub fn get(&self, id: WordId) -> Option<Word> {
        self.words.read().iter().find(|w| w.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.words.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.read().is_empty()
    }

    /// The session this catalog promotes into
    pub fn session(&self) -> &PracticeSession {
        &self.session
    }
}
