pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use snipdeck_core::ShortId;

/// Symbols a generated short id is drawn from.
pub const ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated short ids.
pub const DEFAULT_LENGTH: usize = 6;

/// Trait for generating short ids.
///
/// Implementations are pure generators that don't interact with storage.
/// Output is not guaranteed to be unused; callers insert and retry on a
/// storage conflict.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self) -> ShortId;
}
