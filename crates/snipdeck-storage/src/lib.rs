//! Storage backends for the command catalog.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryRepository;
pub use snipdeck_core::{ReadRepository, Repository, StorageError};
pub use sqlite::SqliteRepository;
