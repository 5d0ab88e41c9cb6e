use crate::{Generator, ALPHABET, DEFAULT_LENGTH};
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use snipdeck_core::short_id::{MAX_LENGTH, MIN_LENGTH};
use snipdeck_core::{CoreError, ShortId};

/// Draws each character uniformly at random from [`ALPHABET`].
///
/// The source is a fast non-cryptographic RNG; short ids are public and only
/// need to be evenly spread, not unpredictable. A draw made only of digits is
/// discarded, since lookups treat such identifiers as numeric ids.
#[derive(Debug)]
pub struct RandomGenerator {
    length: usize,
    rng: Mutex<SmallRng>,
}

impl RandomGenerator {
    pub fn new() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            rng: Mutex::new(SmallRng::from_os_rng()),
        }
    }

    /// A generator producing ids of `length` characters.
    ///
    /// The length must itself be a valid short id length.
    pub fn with_length(length: usize) -> Result<Self, CoreError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(CoreError::InvalidShortIdLength {
                actual: length,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            });
        }
        Ok(Self { length, ..Self::new() })
    }

    /// A generator with a fixed seed, producing a reproducible sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            length: DEFAULT_LENGTH,
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortId {
        let mut rng = self.rng.lock();
        loop {
            let id: String = (0..self.length)
                .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
                .collect();
            if !id.bytes().all(|b| b.is_ascii_digit()) {
                return ShortId::new_unchecked(id);
            }
        }
    }
}
