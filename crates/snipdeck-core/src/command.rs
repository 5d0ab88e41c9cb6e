use crate::short_id::ShortId;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

pub const DEFAULT_KIND: &str = "GoatBot";
pub const DEFAULT_DIFFICULTY: &str = "Intermediate";

const TAG_SEPARATOR: char = ',';

/// The current time at the microsecond precision every backend stores.
///
/// Backends stamp new records with this so that the record returned by an
/// insert equals the one read back later.
pub fn creation_time() -> Timestamp {
    let now = Timestamp::now();
    Timestamp::from_microsecond(now.as_microsecond()).unwrap_or(now)
}

/// A stored command record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Storage-assigned primary identity.
    pub id: i64,
    pub short_id: ShortId,
    pub name: String,
    pub description: String,
    pub author: String,
    /// The raw snippet payload.
    pub code: String,
    /// Classification, serialized as `type` on the wire.
    pub kind: String,
    pub tags: Vec<String>,
    pub difficulty: String,
    pub views: u64,
    pub likes: u64,
    pub created_at: Timestamp,
}

/// A command that has passed validation and is ready to be inserted.
///
/// Storage assigns `id`, `created_at` and zeroed counters.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCommand {
    pub short_id: ShortId,
    pub name: String,
    pub description: String,
    pub author: String,
    pub code: String,
    pub kind: String,
    pub tags: Vec<String>,
    pub difficulty: String,
}

impl NewCommand {
    /// Builds the stored record once storage has assigned an id and timestamp.
    pub fn into_command(self, id: i64, created_at: Timestamp) -> Command {
        Command {
            id,
            short_id: self.short_id,
            name: self.name,
            description: self.description,
            author: self.author,
            code: self.code,
            kind: self.kind,
            tags: self.tags,
            difficulty: self.difficulty,
            views: 0,
            likes: 0,
            created_at,
        }
    }
}

/// Joins tags into their persisted, comma-delimited column form.
pub fn join_tags(tags: &[String]) -> String {
    tags.join(&TAG_SEPARATOR.to_string())
}

/// Splits the persisted column form back into tags. Empty input yields no tags.
pub fn split_tags(column: &str) -> Vec<String> {
    if column.is_empty() {
        return Vec::new();
    }
    column.split(TAG_SEPARATOR).map(str::to_owned).collect()
}

/// Flattens user-supplied tags so that they survive a join/split round trip:
/// embedded commas split a tag, entries are trimmed, blanks are dropped.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .flat_map(|tag| {
            tag.as_ref()
                .split(TAG_SEPARATOR)
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .collect()
}
