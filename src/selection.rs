/*!
 * Active word selection.
 *
 * `pick_index` is the policy itself; the `SelectionPolicy` trait lets the
 * practice session own a policy without caring where randomness comes from.
 */

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt::Debug;

use crate::models::Word;

/// Choose a uniformly random index in `[0, len)`, or `None` when empty
pub fn pick_index<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<usize> {
    if len == 0 {
        None
    } else {
        Some(rng.random_range(0..len))
    }
}

/// Strategy used by the practice session to pick the active word
pub trait SelectionPolicy: Send + Sync + Debug {
    /// Index of the next active word in `words`, `None` if there is none
    fn choose(&self, words: &[Word]) -> Option<usize>;
}

/// Uniform selection backed by the thread-local generator
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSelection;

impl SelectionPolicy for RandomSelection {
    fn choose(&self, words: &[Word]) -> Option<usize> {
        pick_index(words.len(), &mut rand::rng())
    }
}

/// Uniform selection with a reproducible sequence
#[derive(Debug)]
pub struct SeededSelection {
    rng: Mutex<StdRng>,
}

impl SeededSelection {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl SelectionPolicy for SeededSelection {
    fn choose(&self, words: &[Word]) -> Option<usize> {
        pick_index(words.len(), &mut *self.rng.lock())
    }
}
