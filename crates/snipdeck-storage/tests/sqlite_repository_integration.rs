use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use snipdeck_core::{AuthorCount, ListParams, NewCommand, ShortId};
use snipdeck_storage::{ReadRepository, Repository, SqliteRepository, StorageError};
use snipdeck_test_infra::sqlite::{SqliteConfig, SqliteDatabase};

struct Fixture {
    _db: SqliteDatabase,
    repo: SqliteRepository,
}

impl Fixture {
    async fn start() -> Self {
        let db = SqliteDatabase::new(SqliteConfig::builder().build()).expect("temp sqlite");
        let repo = SqliteRepository::open(db.path()).await.expect("open sqlite");

        Self { _db: db, repo }
    }
}

fn command(name: &str, short_id: &str) -> NewCommand {
    NewCommand {
        short_id: ShortId::new_unchecked(short_id),
        name: name.to_string(),
        description: format!("about {name}"),
        author: "bob".to_string(),
        code: format!("module.exports = {{ name: '{name}' }}"),
        kind: "GoatBot".to_string(),
        tags: vec!["fun".to_string(), "tools".to_string()],
        difficulty: "Intermediate".to_string(),
    }
}

#[tokio::test]
async fn insert_and_get_by_both_keys() {
    let fixture = Fixture::start().await;

    let stored = fixture.repo.insert(command("hello", "abc123")).await.unwrap();
    assert!(stored.id > 0);

    let by_id = fixture.repo.get(stored.id).await.unwrap().unwrap();
    let by_short = fixture
        .repo
        .get_by_short_id(&ShortId::new_unchecked("abc123"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(by_id, stored);
    assert_eq!(by_short, stored);
    assert_eq!(by_id.tags, vec!["fun", "tools"]);
    assert!(fixture.repo.name_exists("hello").await.unwrap());
    assert!(!fixture.repo.name_exists("HELLO").await.unwrap());
}

#[tokio::test]
async fn missing_records_are_none() {
    let fixture = Fixture::start().await;

    assert!(fixture.repo.get(1).await.unwrap().is_none());
    assert!(fixture
        .repo
        .get_by_short_id(&ShortId::new_unchecked("nope00"))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn insert_conflicts_when_short_id_already_exists() {
    let fixture = Fixture::start().await;

    fixture.repo.insert(command("one", "abc123")).await.unwrap();
    let err = fixture
        .repo
        .insert(command("two", "abc123"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::ShortIdConflict(id) if id == "abc123"));
}

#[tokio::test]
async fn insert_conflicts_when_name_already_exists() {
    let fixture = Fixture::start().await;

    fixture.repo.insert(command("one", "abc123")).await.unwrap();
    let err = fixture
        .repo
        .insert(command("one", "def456"))
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::NameConflict(name) if name == "one"));
}

#[tokio::test]
async fn data_survives_reopening_the_file() {
    let db = SqliteDatabase::new(SqliteConfig::builder().build()).unwrap();

    let id = {
        let repo = SqliteRepository::open(db.path()).await.unwrap();
        let stored = repo.insert(command("kept", "keep01")).await.unwrap();
        repo.pool().close().await;
        stored.id
    };

    let reopened = SqliteRepository::open(db.path()).await.unwrap();
    let fetched = reopened.get(id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "kept");
}

#[tokio::test]
async fn list_orders_newest_first_and_counts_all_matches() {
    let fixture = Fixture::start().await;
    for (i, name) in ["alpha", "beta", "gamma", "delta", "epsilon"]
        .iter()
        .enumerate()
    {
        fixture
            .repo
            .insert(command(name, &format!("id{i:04}")))
            .await
            .unwrap();
    }

    let page = fixture
        .repo
        .list(&ListParams::new(None, Some(1), Some(2)))
        .await
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(page.total, 5);
    assert_eq!(page.total_pages(), 3);
    assert_eq!(names, vec!["epsilon", "delta"]);

    let last = fixture
        .repo
        .list(&ListParams::new(None, Some(3), Some(2)))
        .await
        .unwrap();
    let names: Vec<_> = last.items.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["alpha"]);

    let beyond = fixture
        .repo
        .list(&ListParams::new(None, Some(9), Some(2)))
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total, 5);
}

#[tokio::test]
async fn list_search_matches_name_or_description_case_insensitively() {
    let fixture = Fixture::start().await;

    let mut by_name = command("PingTool", "aaaaaa");
    by_name.description = "network".into();
    let mut by_description = command("reply", "bbbbbb");
    by_description.description = "answers every ping".into();
    let mut neither = command("weather", "cccccc");
    neither.description = "forecasts".into();

    fixture.repo.insert(by_name).await.unwrap();
    fixture.repo.insert(by_description).await.unwrap();
    fixture.repo.insert(neither).await.unwrap();

    let page = fixture
        .repo
        .list(&ListParams::new(Some("PING".into()), None, None))
        .await
        .unwrap();
    let mut names: Vec<_> = page.items.iter().map(|c| c.name.clone()).collect();
    names.sort();

    assert_eq!(page.total, 2);
    assert_eq!(names, vec!["PingTool", "reply"]);
}

#[tokio::test]
async fn list_search_treats_like_wildcards_literally() {
    let fixture = Fixture::start().await;
    fixture.repo.insert(command("plain", "aaaaaa")).await.unwrap();
    fixture.repo.insert(command("100%", "bbbbbb")).await.unwrap();

    let page = fixture
        .repo
        .list(&ListParams::new(Some("%".into()), None, None))
        .await
        .unwrap();

    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].name, "100%");
}

#[tokio::test]
async fn top_by_views_orders_by_views_then_id() {
    let fixture = Fixture::start().await;
    let a = fixture.repo.insert(command("a", "aaaaaa")).await.unwrap();
    let b = fixture.repo.insert(command("b", "bbbbbb")).await.unwrap();
    let c = fixture.repo.insert(command("c", "cccccc")).await.unwrap();

    fixture.repo.increment_views(b.id).await.unwrap();
    fixture.repo.increment_views(b.id).await.unwrap();
    fixture.repo.increment_views(c.id).await.unwrap();

    let ids: Vec<_> = fixture
        .repo
        .top_by_views(10)
        .await
        .unwrap()
        .iter()
        .map(|cmd| cmd.id)
        .collect();
    assert_eq!(ids, vec![b.id, c.id, a.id]);
}

#[tokio::test]
async fn increments_report_new_values_and_reject_unknown_ids() {
    let fixture = Fixture::start().await;
    let stored = fixture.repo.insert(command("one", "abc123")).await.unwrap();

    let viewed = fixture.repo.increment_views(stored.id).await.unwrap();
    assert_eq!(viewed.views, 1);
    assert_eq!(viewed.name, "one");
    assert_eq!(fixture.repo.increment_likes(stored.id).await.unwrap(), 1);
    assert_eq!(fixture.repo.increment_likes(stored.id).await.unwrap(), 2);

    assert!(matches!(
        fixture.repo.increment_views(999).await,
        Err(StorageError::NotFound(999))
    ));
    assert!(matches!(
        fixture.repo.increment_likes(999).await,
        Err(StorageError::NotFound(999))
    ));
}

#[tokio::test]
async fn concurrent_increments_are_not_lost() {
    let fixture = Fixture::start().await;
    let id = fixture.repo.insert(command("busy", "busy01")).await.unwrap().id;
    let repo = Arc::new(fixture.repo.clone());

    let handles: Vec<_> = (0..40)
        .map(|i| {
            let repo = Arc::clone(&repo);
            tokio::spawn(async move {
                if i % 2 == 0 {
                    repo.increment_views(id).await.map(|_| ())
                } else {
                    repo.increment_likes(id).await.map(|_| ())
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let fetched = fixture.repo.get(id).await.unwrap().unwrap();
    assert_eq!(fetched.views, 20);
    assert_eq!(fetched.likes, 20);
}

#[tokio::test]
async fn stats_on_empty_store_are_zero() {
    let fixture = Fixture::start().await;

    let stats = fixture.repo.stats(Timestamp::now()).await.unwrap();
    assert_eq!(stats.total_commands, 0);
    assert_eq!(stats.total_likes, 0);
    assert_eq!(stats.total_views, 0);
    assert_eq!(stats.active_authors, 0);
    assert!(stats.top_author.is_none());
    assert!(stats.top_viewed.is_none());
}

#[tokio::test]
async fn stats_aggregate_counters_and_leaders() {
    let fixture = Fixture::start().await;

    let mut zed = command("z1", "zzzzz1");
    zed.author = "zed".into();
    let mut zed2 = command("z2", "zzzzz2");
    zed2.author = "zed".into();
    let mut amy = command("a1", "aaaaa1");
    amy.author = "amy".into();
    let mut amy2 = command("a2", "aaaaa2");
    amy2.author = "amy".into();
    let mut solo = command("s1", "sssss1");
    solo.author = "solo".into();

    let z1 = fixture.repo.insert(zed).await.unwrap();
    fixture.repo.insert(zed2).await.unwrap();
    let a1 = fixture.repo.insert(amy).await.unwrap();
    fixture.repo.insert(amy2).await.unwrap();
    fixture.repo.insert(solo).await.unwrap();

    // a1 and z1 tie on views; the lower id wins
    fixture.repo.increment_views(a1.id).await.unwrap();
    fixture.repo.increment_views(z1.id).await.unwrap();
    fixture.repo.increment_likes(a1.id).await.unwrap();
    fixture.repo.increment_likes(a1.id).await.unwrap();

    let stats = fixture
        .repo
        .stats(Timestamp::now() - SignedDuration::from_hours(24))
        .await
        .unwrap();

    assert_eq!(stats.total_commands, 5);
    assert_eq!(stats.total_views, 2);
    assert_eq!(stats.total_likes, 2);
    assert_eq!(stats.active_authors, 3);
    assert_eq!(
        stats.top_author,
        Some(AuthorCount {
            author: "amy".into(),
            count: 2
        })
    );
    assert_eq!(stats.top_viewed.map(|c| c.id), Some(z1.id));
}
