//! Probabilistic membership pre-filter for the hash index.
//!
//! Set-only bit array with two independently hashed positions per key.
//! `contains` answers "possibly present" or "definitely absent"; the false
//! positives it allows only cost a chain walk, since every candidate is
//! re-verified with the true metric before the accept decision.

use std::sync::atomic::{AtomicU64, Ordering};

const MIN_BITS: usize = 64;
/// Bits allocated per expected key. With two hash functions this keeps the
/// false-positive rate around 5%.
const BITS_PER_KEY: usize = 8;

/// Fixed-size, set-only bloom filter, safe to populate concurrently.
#[derive(Debug)]
pub struct BloomFilter {
    words: Vec<AtomicU64>,
    bit_mask: u64,
}

impl BloomFilter {
    /// Build a filter sized for `candidate_count` keys. The bit count is the
    /// next power of two of `BITS_PER_KEY * candidate_count`, so the
    /// false-positive rate stays bounded as the candidate set grows.
    pub fn with_candidates(candidate_count: usize) -> Self {
        let bits = (candidate_count * BITS_PER_KEY)
            .next_power_of_two()
            .max(MIN_BITS);
        let words = (0..bits / 64).map(|_| AtomicU64::new(0)).collect();
        Self {
            words,
            bit_mask: bits as u64 - 1,
        }
    }

    /// Total bit capacity.
    pub fn bit_count(&self) -> usize {
        self.words.len() * 64
    }

    /// Mark a key present by its two hash values.
    pub fn insert(&self, primary: u32, secondary: u64) {
        self.set_bit(primary as u64 & self.bit_mask);
        self.set_bit(secondary & self.bit_mask);
    }

    /// True if the key is possibly present; false means definitely absent.
    pub fn contains(&self, primary: u32, secondary: u64) -> bool {
        self.get_bit(primary as u64 & self.bit_mask)
            && self.get_bit(secondary & self.bit_mask)
    }

    fn set_bit(&self, position: u64) {
        let word = (position / 64) as usize;
        let bit = position % 64;
        self.words[word].fetch_or(1u64 << bit, Ordering::Relaxed);
    }

    fn get_bit(&self, position: u64) -> bool {
        let word = (position / 64) as usize;
        let bit = position % 64;
        self.words[word].load(Ordering::Relaxed) & (1u64 << bit) != 0
    }
}
