//! ID Generator
//!
//! Prefix plus a random alphanumeric suffix. No counters and no shared
//! state, so IDs stay distinguishable across collections and restarts.
//! Not cryptographically secure; a collision is an accepted, vanishingly
//! rare risk rather than a handled error.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Generates row IDs
#[derive(Debug, Clone)]
pub struct IdGenerator {
    /// Number of random characters after the prefix
    suffix_len: usize,
}

impl IdGenerator {
    pub fn new(suffix_len: usize) -> Self {
        Self { suffix_len }
    }

    /// Produce a fresh ID starting with `prefix`
    pub fn new_id(&self, prefix: &str) -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.suffix_len)
            .map(char::from)
            .collect();

        format!("{}{}", prefix, suffix)
    }

    pub fn suffix_len(&self) -> usize {
        self.suffix_len
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(12)
    }
}
