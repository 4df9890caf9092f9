/*!
 * Client-side caches mirroring the remote word store.
 *
 * - `catalog`: the full word list and batch promotion into practice
 * - `practice`: the practice session, its active word and reveal flag
 * - `settings`: per-key settings with debounced write-back
 */

pub use self::catalog::WordCatalog;
pub use self::practice::{PracticeSession, SessionEvent};
pub use self::settings::SettingsSync;

pub mod catalog;
pub mod practice;
pub mod settings;
