use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use snipdeck_core::command::creation_time;
use snipdeck_core::repository::Result;
use snipdeck_core::{
    AuthorCount, CatalogStats, Command, ListParams, NewCommand, Page, ReadRepository, Repository,
    ShortId, StorageError,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::trace;

/// In-memory implementation of the repository contract using DashMap.
///
/// Records are keyed by id. Two secondary indexes map short ids and names to
/// ids; inserts reserve both through the entry API so that uniqueness holds
/// under concurrent inserts. Counter increments run under the shard write lock
/// of the record.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    records: DashMap<i64, Command>,
    short_ids: DashMap<String, i64>,
    names: DashMap<String, i64>,
    last_id: AtomicI64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
            short_ids: DashMap::with_capacity(capacity),
            names: DashMap::with_capacity(capacity),
            last_id: AtomicI64::new(0),
        }
    }

    fn snapshot(&self) -> Vec<Command> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, id: i64) -> Result<Option<Command>> {
        Ok(self.records.get(&id).map(|entry| entry.value().clone()))
    }

    async fn get_by_short_id(&self, short_id: &ShortId) -> Result<Option<Command>> {
        let Some(id) = self.short_ids.get(short_id.as_str()).map(|entry| *entry) else {
            return Ok(None);
        };
        self.get(id).await
    }

    async fn name_exists(&self, name: &str) -> Result<bool> {
        Ok(self.names.contains_key(name))
    }

    async fn list(&self, params: &ListParams) -> Result<Page<Command>> {
        let mut matching: Vec<Command> = self
            .records
            .iter()
            .filter(|entry| params.matches(&entry.name, &entry.description))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as u64;
        let offset = usize::try_from(params.offset()).unwrap_or(usize::MAX);
        let page_size = usize::try_from(params.page_size()).unwrap_or(usize::MAX);
        let items = matching.into_iter().skip(offset).take(page_size).collect();

        trace!(total, page = params.page(), "listed commands from memory");

        Ok(Page {
            items,
            total,
            page: params.page(),
            page_size: params.page_size(),
        })
    }

    async fn top_by_views(&self, limit: u64) -> Result<Vec<Command>> {
        let mut commands = self.snapshot();
        commands.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.id.cmp(&b.id)));
        commands.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(commands)
    }

    async fn stats(&self, active_since: Timestamp) -> Result<CatalogStats> {
        let commands = self.snapshot();

        let mut per_author: HashMap<&str, u64> = HashMap::new();
        let mut active: HashSet<&str> = HashSet::new();
        for command in &commands {
            *per_author.entry(command.author.as_str()).or_default() += 1;
            if command.created_at >= active_since {
                active.insert(command.author.as_str());
            }
        }

        let top_author = per_author
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(author, count)| AuthorCount {
                author: author.to_owned(),
                count,
            });

        let top_viewed = commands
            .iter()
            .max_by(|a, b| a.views.cmp(&b.views).then_with(|| b.id.cmp(&a.id)))
            .cloned();

        Ok(CatalogStats {
            total_commands: commands.len() as u64,
            total_likes: commands.iter().map(|c| c.likes).sum(),
            total_views: commands.iter().map(|c| c.views).sum(),
            active_authors: active.len() as u64,
            top_author,
            top_viewed,
        })
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, command: NewCommand) -> Result<Command> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;

        match self.names.entry(command.name.clone()) {
            Entry::Occupied(_) => return Err(StorageError::NameConflict(command.name)),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        match self.short_ids.entry(command.short_id.as_str().to_owned()) {
            Entry::Occupied(_) => {
                // release the name reserved above
                self.names.remove(&command.name);
                return Err(StorageError::ShortIdConflict(command.short_id.to_string()));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let stored = command.into_command(id, creation_time());
        self.records.insert(id, stored.clone());
        trace!(id, short_id = %stored.short_id, "inserted command into memory");
        Ok(stored)
    }

    async fn increment_views(&self, id: i64) -> Result<Command> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or(StorageError::NotFound(id))?;
        entry.views = entry.views.saturating_add(1);
        Ok(entry.value().clone())
    }

    async fn increment_likes(&self, id: i64) -> Result<u64> {
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or(StorageError::NotFound(id))?;
        entry.likes = entry.likes.saturating_add(1);
        Ok(entry.likes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::SignedDuration;
    use std::sync::Arc;

    fn new_command(name: &str, short_id: &str) -> NewCommand {
        NewCommand {
            short_id: ShortId::new_unchecked(short_id),
            name: name.to_string(),
            description: format!("{name} description"),
            author: "bob".to_string(),
            code: format!("console.log('{name}')"),
            kind: "GoatBot".to_string(),
            tags: vec!["fun".to_string()],
            difficulty: "Intermediate".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids() {
        let repo = InMemoryRepository::new();

        let first = repo.insert(new_command("one", "aaaaaa")).await.unwrap();
        let second = repo.insert(new_command("two", "bbbbbb")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.views, 0);
        assert_eq!(first.likes, 0);
    }

    #[tokio::test]
    async fn created_at_is_stored_at_microsecond_precision() {
        let repo = InMemoryRepository::new();
        let stored = repo.insert(new_command("one", "aaaaaa")).await.unwrap();

        assert_eq!(stored.created_at.subsec_nanosecond() % 1_000, 0);
        assert_eq!(
            repo.get(stored.id).await.unwrap().unwrap().created_at,
            stored.created_at
        );
    }

    #[tokio::test]
    async fn get_by_id_and_short_id() {
        let repo = InMemoryRepository::new();
        let stored = repo.insert(new_command("one", "aaaaaa")).await.unwrap();

        let by_id = repo.get(stored.id).await.unwrap().unwrap();
        let by_short = repo
            .get_by_short_id(&ShortId::new_unchecked("aaaaaa"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(by_id, stored);
        assert_eq!(by_short, stored);
        assert!(repo.get(99).await.unwrap().is_none());
        assert!(repo
            .get_by_short_id(&ShortId::new_unchecked("zzzzzz"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let repo = InMemoryRepository::new();
        repo.insert(new_command("one", "aaaaaa")).await.unwrap();

        let err = repo.insert(new_command("one", "bbbbbb")).await.unwrap_err();
        assert!(matches!(err, StorageError::NameConflict(name) if name == "one"));
        assert!(repo
            .get_by_short_id(&ShortId::new_unchecked("bbbbbb"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_short_id_is_rejected_and_releases_name() {
        let repo = InMemoryRepository::new();
        repo.insert(new_command("one", "aaaaaa")).await.unwrap();

        let err = repo.insert(new_command("two", "aaaaaa")).await.unwrap_err();
        assert!(matches!(err, StorageError::ShortIdConflict(_)));
        assert!(!repo.name_exists("two").await.unwrap());

        // the name is usable with a fresh short id
        repo.insert(new_command("two", "bbbbbb")).await.unwrap();
        assert!(repo.name_exists("two").await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_inserts_with_same_name_store_one() {
        let repo = Arc::new(InMemoryRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.insert(new_command("race", &format!("race{i:02}")))
                        .await
                })
            })
            .collect();

        let mut stored = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                stored += 1;
            }
        }

        assert_eq!(stored, 1);
        let stats = repo.stats(Timestamp::UNIX_EPOCH).await.unwrap();
        assert_eq!(stats.total_commands, 1);
    }

    #[tokio::test]
    async fn list_filters_and_paginates_newest_first() {
        let repo = InMemoryRepository::new();
        for (i, name) in ["ping", "pong", "echo", "PingPong"].iter().enumerate() {
            repo.insert(new_command(name, &format!("id{i:04}")))
                .await
                .unwrap();
        }

        let page = repo
            .list(&ListParams::new(Some("ping".into()), Some(1), Some(1)))
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "PingPong");

        let page = repo
            .list(&ListParams::new(Some("ping".into()), Some(2), Some(1)))
            .await
            .unwrap();
        assert_eq!(page.items[0].name, "ping");

        let page = repo
            .list(&ListParams::new(Some("ping".into()), Some(3), Some(1)))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 2);
    }

    #[tokio::test]
    async fn top_by_views_breaks_ties_by_id() {
        let repo = InMemoryRepository::new();
        let a = repo.insert(new_command("a", "aaaaaa")).await.unwrap();
        let b = repo.insert(new_command("b", "bbbbbb")).await.unwrap();
        let c = repo.insert(new_command("c", "cccccc")).await.unwrap();

        repo.increment_views(c.id).await.unwrap();

        let top: Vec<i64> = repo
            .top_by_views(10)
            .await
            .unwrap()
            .into_iter()
            .map(|cmd| cmd.id)
            .collect();
        assert_eq!(top, vec![c.id, a.id, b.id]);

        assert_eq!(repo.top_by_views(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn counters_increment_and_report_new_values() {
        let repo = InMemoryRepository::new();
        let stored = repo.insert(new_command("one", "aaaaaa")).await.unwrap();

        assert_eq!(repo.increment_views(stored.id).await.unwrap().views, 1);
        assert_eq!(repo.increment_views(stored.id).await.unwrap().views, 2);
        assert_eq!(repo.increment_likes(stored.id).await.unwrap(), 1);

        assert!(matches!(
            repo.increment_views(404).await,
            Err(StorageError::NotFound(404))
        ));
        assert!(matches!(
            repo.increment_likes(404).await,
            Err(StorageError::NotFound(404))
        ));
    }

    #[tokio::test]
    async fn concurrent_likes_are_not_lost() {
        let repo = Arc::new(InMemoryRepository::new());
        let id = repo.insert(new_command("one", "aaaaaa")).await.unwrap().id;

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let repo = Arc::clone(&repo);
                tokio::spawn(async move { repo.increment_likes(id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.get(id).await.unwrap().unwrap().likes, 50);
    }

    #[tokio::test]
    async fn stats_on_empty_store() {
        let repo = InMemoryRepository::new();
        let stats = repo.stats(Timestamp::now()).await.unwrap();
        assert_eq!(stats, CatalogStats::default());
    }

    #[tokio::test]
    async fn stats_aggregates_counters_and_leaders() {
        let repo = InMemoryRepository::new();
        let mut alice = new_command("a1", "aaaaaa");
        alice.author = "alice".into();
        let mut alice2 = new_command("a2", "aaaaab");
        alice2.author = "alice".into();
        let mut zed = new_command("z1", "zzzzzz");
        zed.author = "zed".into();
        let mut zed2 = new_command("z2", "zzzzzy");
        zed2.author = "zed".into();

        let a1 = repo.insert(alice).await.unwrap();
        repo.insert(alice2).await.unwrap();
        let z1 = repo.insert(zed).await.unwrap();
        repo.insert(zed2).await.unwrap();

        repo.increment_views(z1.id).await.unwrap();
        repo.increment_views(z1.id).await.unwrap();
        repo.increment_views(a1.id).await.unwrap();
        repo.increment_likes(a1.id).await.unwrap();

        let stats = repo
            .stats(Timestamp::now() - SignedDuration::from_hours(24))
            .await
            .unwrap();
        assert_eq!(stats.total_commands, 4);
        assert_eq!(stats.total_views, 3);
        assert_eq!(stats.total_likes, 1);
        assert_eq!(stats.active_authors, 2);
        // two uploads each: alphabetical order wins
        assert_eq!(
            stats.top_author,
            Some(AuthorCount {
                author: "alice".into(),
                count: 2
            })
        );
        assert_eq!(stats.top_viewed.map(|c| c.id), Some(z1.id));

        let later = repo
            .stats(Timestamp::now() + SignedDuration::from_hours(1))
            .await
            .unwrap();
        assert_eq!(later.active_authors, 0);
    }
}
