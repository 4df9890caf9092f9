/*!
 * Practice session cache.
 *
 * Holds the words currently being drilled, the active word and the
 * answer-reveal flag. Every remote-backed operation sends its request first
 * and commits the local transition only once the store confirms, so the
 * cache never has to roll anything back.
 *
 * Whenever a commit changes the number of words (and after every successful
 * repetition update) the selection policy is run again, which keeps the
 * active word either a member of the collection or `None`.
 */

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::errors::StoreError;
use crate::models::{Word, WordId, WordPatch};
use crate::selection::{RandomSelection, SelectionPolicy};
use crate::store::WordStore;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notifications emitted after each committed change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A word entered the session
    WordAdded(WordId),
    /// A word left the session
    WordRemoved(WordId),
    /// The session was emptied by a bulk clear
    Cleared,
    /// The collection was replaced wholesale
    Replaced { len: usize },
    /// A repetition count was confirmed by the store
    RepetitionUpdated { id: WordId, count: u32 },
    /// The active word changed (or was re-picked)
    ActiveChanged(Option<WordId>),
    /// The answer reveal flag was set
    AnswerRevealed(bool),
}

#[derive(Debug, Default)]
struct SessionState {
    words: Vec<Word>,
    active: Option<Word>,
    answer_revealed: bool,
    /// Ids with an add request in flight
    pending_adds: HashSet<WordId>,
}

impl SessionState {
    fn position(&self, id: WordId) -> Option<usize> {
        self.words.iter().position(|w| w.id == id)
    }

    fn contains(&self, id: WordId) -> bool {
        self.position(id).is_some()
    }
}

/// Releases the pending-add marker when the add completes or is cancelled
struct PendingAdd {
    state: Arc<Mutex<SessionState>>,
    id: WordId,
}

impl Drop for PendingAdd {
    fn drop(&mut self) {
        self.state.lock().pending_adds.remove(&self.id);
    }
}

/// Cache of the words in practice
#[derive(Debug, Clone)]
pub struct PracticeSession {
    store: Arc<dyn WordStore>,
    state: Arc<Mutex<SessionState>>,
    policy: Arc<dyn SelectionPolicy>,
    events: broadcast::Sender<SessionEvent>,
}

impl PracticeSession {
    /// Create an empty session using uniform random selection
    pub fn new(store: Arc<dyn WordStore>) -> Self {
        Self::with_policy(store, Arc::new(RandomSelection))
    }

    /// Create an empty session with a specific selection policy
    pub fn with_policy(store: Arc<dyn WordStore>, policy: Arc<dyn SelectionPolicy>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            state: Arc::new(Mutex::new(SessionState::default())),
            policy,
            events,
        }
    }

    /// Receive every event committed from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    // =========================================================================
    // Remote-backed operations
    // =========================================================================

    /// Promote a single word into the session
    ///
    /// Returns `Ok(false)` without contacting the store when the word is
    /// already in session or an add for it is in flight. On success the word
    /// is inserted with a fresh repetition count.
    pub async fn add_word(&self, word: &Word) -> Result<bool, StoreError> {
        let _pending = {
            let mut state = self.state.lock();
            if state.contains(word.id) || !state.pending_adds.insert(word.id) {
                debug!("Word {} ('{}') already in practice, add ignored", word.id, word.english);
                return Ok(false);
            }
            PendingAdd {
                state: Arc::clone(&self.state),
                id: word.id,
            }
        };

        let mut confirmed = self
            .store
            .update_word(word.id, &WordPatch::promote())
            .await
            .map_err(|e| {
                error!("Error adding word {} to practice: {}", word.id, e);
                e
            })?;

        confirmed.selected = true;
        confirmed.repetition_count = 0;
        Ok(self.add_word_in_list_words(confirmed))
    }

    /// Store a new repetition count for a word in session
    ///
    /// Returns `Ok(false)` without contacting the store when the word is not
    /// in session. After a confirmed update a new active word is picked.
    pub async fn update_rep_count_word(&self, word: &Word, count: u32) -> Result<bool, StoreError> {
        if !self.contains(word.id) {
            debug!("Word {} not in practice, repetition update ignored", word.id);
            return Ok(false);
        }

        let updated = self
            .store
            .update_word(word.id, &WordPatch::repetitions(count))
            .await
            .map_err(|e| {
                error!("Error updating repetitions of word {}: {}", word.id, e);
                e
            })?;

        self.commit(|state, events| {
            // Look the entry up again: the caller's copy may be stale
            match state.position(updated.id) {
                Some(index) => {
                    state.words[index] = updated.clone();
                    if state.active.as_ref().is_some_and(|a| a.id == updated.id) {
                        state.active = Some(updated.clone());
                    }
                    events.push(SessionEvent::RepetitionUpdated {
                        id: updated.id,
                        count: updated.repetition_count,
                    });
                }
                None => warn!("Word {} left practice before its repetition update was confirmed", updated.id),
            }
            true
        });

        Ok(true)
    }

    /// Remove a word from the session once the store confirms
    pub async fn delete_word(&self, word: &Word) -> Result<(), StoreError> {
        self.store
            .update_word(word.id, &WordPatch::demote())
            .await
            .map_err(|e| {
                error!("Error removing word {} from practice: {}", word.id, e);
                e
            })?;

        self.commit(|state, events| {
            let before = state.words.len();
            state.words.retain(|w| w.id != word.id);
            if state.words.len() != before {
                events.push(SessionEvent::WordRemoved(word.id));
            }
            false
        });

        Ok(())
    }

    /// Clear every selected word, in the store and then locally
    ///
    /// Mutations already in flight for individual words are not cancelled.
    pub async fn delete_words(&self) -> Result<(), StoreError> {
        self.store.clear_selected().await.map_err(|e| {
            error!("Error clearing practice list: {}", e);
            e
        })?;

        self.commit(|state, events| {
            state.words.clear();
            events.push(SessionEvent::Cleared);
            false
        });

        info!("Practice list cleared");
        Ok(())
    }

    /// Fetch the selected words from the store without touching the cache
    pub async fn fetch_selected_words(&self) -> Result<Vec<Word>, StoreError> {
        self.store.list_selected().await.map_err(|e| {
            error!("Error fetching practice words: {}", e);
            e
        })
    }

    /// Fetch the selected words and replace the collection with them
    pub async fn load(&self) -> Result<usize, StoreError> {
        let words = self.fetch_selected_words().await?;
        self.fill_list_selected_words(words);
        let len = self.len();
        info!("Loaded {} practice words", len);
        Ok(len)
    }

    // =========================================================================
    // Local operations
    // =========================================================================

    /// Insert a word the store has already confirmed as selected
    ///
    /// Returns false if a word with the same id is already present.
    pub fn add_word_in_list_words(&self, word: Word) -> bool {
        self.commit(|state, events| {
            if state.contains(word.id) {
                return false;
            }
            debug!("Word {} ('{}') added to practice", word.id, word.english);
            events.push(SessionEvent::WordAdded(word.id));
            state.words.push(word);
            true
        })
    }

    /// Replace the collection with data that already reflects the store
    pub fn fill_list_selected_words(&self, data: Vec<Word>) {
        self.commit(|state, events| {
            let mut seen = HashSet::new();
            let mut words = Vec::with_capacity(data.len());
            for word in data {
                if seen.insert(word.id) {
                    words.push(word);
                } else {
                    warn!("Duplicate word {} in practice list, keeping the first", word.id);
                }
            }
            state.words = words;
            events.push(SessionEvent::Replaced { len: state.words.len() });
            // The previous active word may not be part of the new data
            true
        });
    }

    /// Pick a new active word
    pub fn select_random_word(&self) {
        self.commit(|_, _| true);
    }

    /// Reveal or hide the answer for the active word
    pub fn set_right_answer(&self, value: bool) {
        self.state.lock().answer_revealed = value;
        let _ = self.events.send(SessionEvent::AnswerRevealed(value));
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Snapshot of the words in session
    pub fn words(&self) -> Vec<Word> {
        self.state.lock().words.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().words.is_empty()
    }

    pub fn contains(&self, id: WordId) -> bool {
        self.state.lock().contains(id)
    }

    /// Copy of a word in session
    pub fn get(&self, id: WordId) -> Option<Word> {
        let state = self.state.lock();
        state.position(id).map(|index| state.words[index].clone())
    }

    /// Copy of the active word
    pub fn active_word(&self) -> Option<Word> {
        self.state.lock().active.clone()
    }

    pub fn is_answer_revealed(&self) -> bool {
        self.state.lock().answer_revealed
    }

    /// Apply a local transition, re-run selection when needed, then publish
    ///
    /// The closure returns whether selection must run regardless of the
    /// collection length.
    fn commit<F>(&self, apply: F) -> bool
    where
        F: FnOnce(&mut SessionState, &mut Vec<SessionEvent>) -> bool,
    {
        let mut events = Vec::new();
        let changed = {
            let mut state = self.state.lock();
            let before = state.words.len();
            let force_select = apply(&mut state, &mut events);
            let resized = state.words.len() != before;
            if force_select || resized {
                self.reselect(&mut state, &mut events);
            }
            force_select || resized
        };

        for event in events {
            // No receivers is fine
            let _ = self.events.send(event);
        }
        changed
    }

    fn reselect(&self, state: &mut SessionState, events: &mut Vec<SessionEvent>) {
        let next = self
            .policy
            .choose(&state.words)
            .and_then(|index| state.words.get(index).cloned());

        if next.is_some() {
            state.answer_revealed = false;
        }
        let id = next.as_ref().map(|w| w.id);
        state.active = next;
        events.push(SessionEvent::ActiveChanged(id));
    }
}
