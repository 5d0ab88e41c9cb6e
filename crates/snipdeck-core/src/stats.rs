use crate::command::Command;

/// The author with the most uploaded commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorCount {
    pub author: String,
    pub count: u64,
}

/// Aggregate figures over the whole catalog.
///
/// Every count is zero and every optional summary is `None` for an empty store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogStats {
    pub total_commands: u64,
    pub total_likes: u64,
    pub total_views: u64,
    /// Distinct authors with at least one upload inside the activity window.
    pub active_authors: u64,
    /// Ties are broken by author name, ascending.
    pub top_author: Option<AuthorCount>,
    /// Ties are broken by lowest id.
    pub top_viewed: Option<Command>,
}
