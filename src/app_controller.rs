use log::{debug, info, warn};
use std::sync::Arc;

use crate::app_config::Config;
use crate::cache::{PracticeSession, SettingsSync, WordCatalog};
use crate::errors::{AppError, StoreError};
use crate::models::{Word, WordId};
use crate::selection::{RandomSelection, SelectionPolicy};
use crate::store::{HttpWordStore, WordStore};

// @module: Application controller wiring the caches together

/// Result of answering the active word
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The session has no active word
    NoActiveWord,
    /// The word was remembered and its count increased
    Repeated { id: WordId, count: u32 },
    /// The word was forgotten and its count reset
    Reset { id: WordId },
    /// The word reached the repetition limit and left practice
    Learned { id: WordId },
    /// The word left practice while the answer was being recorded
    Skipped { id: WordId },
}

/// Main application controller
///
/// Owns one catalog, one practice session and one settings cache, all
/// sharing the same store. Consumers get references from here instead of
/// looking the caches up globally.
#[derive(Debug, Clone)]
pub struct Controller {
    // @field: App configuration
    config: Config,
    catalog: WordCatalog,
    session: PracticeSession,
    settings: SettingsSync,
}

impl Controller {
    /// Create a controller over the given store
    pub fn new(config: Config, store: Arc<dyn WordStore>) -> Self {
        Self::with_policy(config, store, Arc::new(RandomSelection))
    }

    /// Create a controller with a specific selection policy
    pub fn with_policy(config: Config, store: Arc<dyn WordStore>, policy: Arc<dyn SelectionPolicy>) -> Self {
        let session = PracticeSession::with_policy(Arc::clone(&store), policy);
        let catalog = WordCatalog::new(Arc::clone(&store), session.clone());
        let settings = SettingsSync::new(store, &config.settings);
        Self {
            config,
            catalog,
            session,
            settings,
        }
    }

    // @method: Create a controller talking to the configured HTTP store
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        config.validate().map_err(|e| AppError::Config(format!("{:#}", e)))?;
        let store = HttpWordStore::from_config(&config.store)?;
        Ok(Self::new(config, Arc::new(store)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &WordCatalog {
        &self.catalog
    }

    pub fn session(&self) -> &PracticeSession {
        &self.session
    }

    pub fn settings(&self) -> &SettingsSync {
        &self.settings
    }

    /// Load the catalog, the practice words and the settings concurrently
    ///
    /// Settings that fail to load keep their defaults.
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        let (catalog, session, settings) =
            tokio::join!(self.catalog.load(), self.session.load(), self.settings.load_all());

        for (key, result) in settings {
            if let Err(e) = result {
                warn!("Setting {} not loaded, using '{}': {}", key, self.settings.value(key), e);
            }
        }

        catalog?;
        session?;
        Ok(())
    }

    /// Promote catalog words into practice by id
    pub async fn promote(&self, ids: &[WordId]) -> Result<usize, StoreError> {
        let mut words = Vec::with_capacity(ids.len());
        for id in ids {
            match self.catalog.get(*id) {
                Some(word) => words.push(word),
                None => warn!("Word {} is not in the catalog, skipping", id),
            }
        }
        self.catalog.select_words(&words).await
    }

    /// Remove a word from practice and mirror it in the catalog
    ///
    /// Returns `Ok(false)` without contacting the store if the word is not
    /// in practice.
    pub async fn demote(&self, id: WordId) -> Result<bool, StoreError> {
        let Some(word) = self.session.get(id) else {
            warn!("Word {} is not in practice", id);
            return Ok(false);
        };

        self.session.delete_word(&word).await?;
        self.catalog.set_selected(id, false);
        Ok(true)
    }

    /// Empty the practice list and mirror it in the catalog
    pub async fn clear_practice(&self) -> Result<(), StoreError> {
        self.session.delete_words().await?;
        self.catalog.clear_selected();
        Ok(())
    }

    /// Record an answer for the active word
    ///
    /// A remembered word gains one repetition; once it reaches the
    /// `max_repetitions` setting it leaves practice. A forgotten word starts
    /// over from zero.
    pub async fn record_answer(&self, remembered: bool) -> Result<RoundOutcome, StoreError> {
        let Some(word) = self.session.active_word() else {
            return Ok(RoundOutcome::NoActiveWord);
        };

        if !remembered {
            return self.update_count(&word, 0, RoundOutcome::Reset { id: word.id }).await;
        }

        let count = word.repetition_count.saturating_add(1);
        let max = self.settings.max_repetitions();
        if max > 0 && count >= max {
            info!("'{}' reached {} repetitions, leaving practice", word.english, max);
            return Ok(if self.demote(word.id).await? {
                RoundOutcome::Learned { id: word.id }
            } else {
                RoundOutcome::Skipped { id: word.id }
            });
        }

        self.update_count(&word, count, RoundOutcome::Repeated { id: word.id, count }).await
    }

    async fn update_count(&self, word: &Word, count: u32, outcome: RoundOutcome) -> Result<RoundOutcome, StoreError> {
        if self.session.update_rep_count_word(word, count).await? {
            debug!("Word {} now at {} repetitions", word.id, count);
            Ok(outcome)
        } else {
            Ok(RoundOutcome::Skipped { id: word.id })
        }
    }

    /// Send pending setting writes before exiting
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        self.settings.flush().await
    }
}
