use crate::{Generator, ALPHABET, DEFAULT_LENGTH};
use snipdeck_core::ShortId;
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic generator that encodes a counter in base36 over
/// [`ALPHABET`].
///
/// Produces "aaaaaa", "aaaaab", ..., "aaaaa9", "aaaaba", ... and wraps after
/// 36^6 ids. Unique within a single instance until it wraps. Ids start with
/// a letter for the first 26 * 36^5 values, so lookups never read them as
/// numeric ids.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
        }
    }
}

impl SeqGenerator {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a generator starting from a specific counter value.
    ///
    /// Useful for resuming from a known state or handing disjoint ranges to
    /// separate instances.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl Default for SeqGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_base36(mut value: u64) -> String {
    let radix = ALPHABET.len() as u64;
    let mut digits = [ALPHABET[0]; DEFAULT_LENGTH];
    for slot in digits.iter_mut().rev() {
        *slot = ALPHABET[(value % radix) as usize];
        value /= radix;
    }
    digits.iter().map(|&b| b as char).collect()
}

impl Generator for SeqGenerator {
    fn generate(&self) -> ShortId {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortId::new_unchecked(encode_base36(count))
    }
}
