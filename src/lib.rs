/*!
 * # vocab-drill
 *
 * A vocabulary practice client that keeps a local mirror of a remote word
 * store.
 *
 * ## Features
 *
 * - Browse the full word catalog and promote words into practice
 * - Keep a practice session with a randomly chosen active word
 * - Track repetition counts, removing words once they are learned
 * - Cache user settings and debounce rapid changes into single writes
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `models`: Words, translations and settings as served by the store
 * - `store`: The `WordStore` trait with HTTP and mock implementations
 * - `cache`: Client-side caches:
 *   - `cache::catalog`: Full word catalog and batch promotion
 *   - `cache::practice`: Practice session, active word and answer reveal
 *   - `cache::settings`: Settings cache with debounced writes
 * - `selection`: Active word selection policy
 * - `app_controller`: Wires the caches over one store
 * - `errors`: Custom error types for the application
 *
 * Every cache operation that talks to the store commits its local change
 * only after the store confirms it.
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod cache;
pub mod errors;
pub mod models;
pub mod selection;
pub mod store;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RoundOutcome};
pub use cache::{PracticeSession, SessionEvent, SettingsSync, WordCatalog};
pub use errors::{AppError, StoreError};
pub use models::{SettingKey, Translation, Word, WordId, WordPatch};
pub use store::{HttpWordStore, MockWordStore, WordStore};
