/*!
 * Data model shared by the caches and the remote store.
 *
 * The shapes mirror the JSON resources served by the word store:
 * - `Word` and `Translation` for `/words` resources
 * - `WordPatch` for partial updates sent with PATCH
 * - `SelectWordPayload` for the batch select endpoint
 * - `SettingKey` and `SettingRecord` for `/settings/{key}`
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};

/// Identifier assigned to a word by the remote store
pub type WordId = i64;

/// A translation of a word. Read-only on the client side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub id: i64,
    pub russian: String,
    pub word_id: WordId,
}

/// A vocabulary word as served by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Stable identity assigned by the store
    pub id: WordId,

    /// The English spelling
    pub english: String,

    /// Phonetic transcription, if known
    #[serde(default)]
    pub transcription: Option<String>,

    /// Creation timestamp as sent by the store
    #[serde(default)]
    pub created_at: String,

    /// Membership in the practice set
    #[serde(default)]
    pub selected: bool,

    /// How many times the word was answered correctly in a row
    #[serde(default)]
    pub repetition_count: u32,

    /// Ordered translations
    #[serde(default)]
    pub translations: Vec<Translation>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub audio_name: Option<String>,

    #[serde(default)]
    pub api_status: Option<i32>,

    #[serde(default)]
    pub remember: bool,
}

impl Word {
    /// Create a bare word with the given id and spelling
    pub fn new(id: WordId, english: impl Into<String>) -> Self {
        Self {
            id,
            english: english.into(),
            transcription: None,
            created_at: String::new(),
            selected: false,
            repetition_count: 0,
            translations: Vec::new(),
            description: None,
            audio_name: None,
            api_status: None,
            remember: false,
        }
    }

    /// Add a translation to the word
    pub fn with_translation(mut self, id: i64, russian: impl Into<String>) -> Self {
        self.translations.push(Translation {
            id,
            russian: russian.into(),
            word_id: self.id,
        });
        self
    }

    /// Set the repetition count
    pub fn with_repetition_count(mut self, count: u32) -> Self {
        self.repetition_count = count;
        self
    }

    /// Mark the word as selected for practice
    pub fn selected(mut self) -> Self {
        self.selected = true;
        self
    }

    /// Translations joined for display
    pub fn translation_text(&self) -> String {
        self.translations
            .iter()
            .map(|t| t.russian.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Partial word update sent with PATCH `/words/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_count: Option<u32>,
}

impl WordPatch {
    /// Patch that promotes a word into practice with a fresh count
    pub fn promote() -> Self {
        Self {
            selected: Some(true),
            repetition_count: Some(0),
            ..Default::default()
        }
    }

    /// Patch that removes a word from practice
    pub fn demote() -> Self {
        Self {
            selected: Some(false),
            ..Default::default()
        }
    }

    /// Patch that sets the repetition count
    pub fn repetitions(count: u32) -> Self {
        Self {
            repetition_count: Some(count),
            ..Default::default()
        }
    }

    /// Apply the patch to a local copy of a word
    pub fn apply_to(&self, word: &mut Word) {
        if let Some(selected) = self.selected {
            word.selected = selected;
        }
        if let Some(count) = self.repetition_count {
            word.repetition_count = count;
        }
    }
}

/// One element of the batch select request body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectWordPayload {
    pub id: WordId,
    pub selected: bool,
    pub repetition_count: u32,
}

impl From<&Word> for SelectWordPayload {
    fn from(word: &Word) -> Self {
        Self {
            id: word.id,
            selected: true,
            repetition_count: 0,
        }
    }
}

/// The closed set of user settings kept by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    MaxRepetitions,
    TranslationDirection,
    CheckMethod,
    PlayAudio,
}

impl SettingKey {
    /// Every key, in a stable order
    pub const ALL: [SettingKey; 4] = [
        SettingKey::MaxRepetitions,
        SettingKey::TranslationDirection,
        SettingKey::CheckMethod,
        SettingKey::PlayAudio,
    ];

    /// Name used in URLs and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaxRepetitions => "max_repetitions",
            Self::TranslationDirection => "translation_direction",
            Self::CheckMethod => "check_method",
            Self::PlayAudio => "play_audio",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        SettingKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| anyhow!("Unknown setting key: {}", s))
    }
}

/// Body of GET `/settings/{key}`
///
/// Some store versions send `value` as a JSON number or boolean, so it is
/// decoded loosely and normalized through [`SettingRecord::value_string`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRecord {
    pub key: String,
    pub value: serde_json::Value,
}

impl SettingRecord {
    /// The value as a plain string
    pub fn value_string(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Body of PUT `/settings/{key}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingValueBody {
    pub value: String,
}
