use crate::command::{Command, NewCommand};
use crate::error::StorageError;
use crate::query::{ListParams, Page};
use crate::short_id::ShortId;
use crate::stats::CatalogStats;
use async_trait::async_trait;
use jiff::Timestamp;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves a command by its numeric id.
    /// Returns `None` if the id does not exist.
    async fn get(&self, id: i64) -> Result<Option<Command>>;

    /// Retrieves a command by its short id.
    async fn get_by_short_id(&self, short_id: &ShortId) -> Result<Option<Command>>;

    /// Checks whether a command with exactly this name exists.
    async fn name_exists(&self, name: &str) -> Result<bool>;

    /// Returns one page of commands, newest first, filtered by the search term.
    async fn list(&self, params: &ListParams) -> Result<Page<Command>>;

    /// Returns up to `limit` commands ordered by views, highest first.
    /// Ties are broken by ascending id.
    async fn top_by_views(&self, limit: u64) -> Result<Vec<Command>>;

    /// Computes catalog-wide aggregates. Authors count as active when they
    /// uploaded at or after `active_since`.
    async fn stats(&self, active_since: Timestamp) -> Result<CatalogStats>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new command and returns the stored record.
    ///
    /// Returns `Err(ShortIdConflict)` or `Err(NameConflict)` when the short id
    /// or the name is already taken. Both checks are atomic with the insert.
    async fn insert(&self, command: NewCommand) -> Result<Command>;

    /// Atomically adds one view and returns the updated record.
    /// Returns `Err(NotFound)` if the id does not exist.
    async fn increment_views(&self, id: i64) -> Result<Command>;

    /// Atomically adds one like and returns the new like count.
    /// Returns `Err(NotFound)` if the id does not exist.
    async fn increment_likes(&self, id: i64) -> Result<u64>;
}
