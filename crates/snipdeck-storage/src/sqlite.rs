use async_trait::async_trait;
use jiff::Timestamp;
use snipdeck_core::command::{creation_time, join_tags, split_tags};
use snipdeck_core::repository::Result;
use snipdeck_core::{
    AuthorCount, CatalogStats, Command, ListParams, NewCommand, Page, ReadRepository, Repository,
    ShortId, StorageError,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, trace};

const COLUMNS: &str =
    "id, short_id, name, description, author, code, type, tags, difficulty, views, likes, created_at";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite implementation of the repository contract.
///
/// `short_id` and `name` carry UNIQUE constraints, so a conflicting insert
/// fails inside the database rather than relying on a prior lookup. Counter
/// updates are single `UPDATE ... RETURNING` statements.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Creates a repository from an existing SQLite connection pool.
    ///
    /// The schema is not touched; call [`SqliteRepository::migrate`] first
    /// when the pool points at a fresh database.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database file at `path` and applies
    /// pending migrations.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path.as_ref())
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    /// Opens a private in-memory database with the schema applied.
    ///
    /// The pool is limited to one connection because every SQLite in-memory
    /// connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(map_sqlx_error)?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    /// Applies the embedded schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        debug!("sqlite schema is up to date");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn parse_created_at(micros: i64) -> Result<Timestamp> {
    Timestamp::from_microsecond(micros).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{}': {e}", micros))
    })
}

fn counter(value: i64, column: &str) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| StorageError::InvalidData(format!("negative {column} counter: {value}")))
}

fn bind_count(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn command_from_row(row: &SqliteRow) -> Result<Command> {
    let short_id: String = row.try_get("short_id").map_err(map_sqlx_error)?;
    let tags: String = row.try_get("tags").map_err(map_sqlx_error)?;
    let views: i64 = row.try_get("views").map_err(map_sqlx_error)?;
    let likes: i64 = row.try_get("likes").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;

    Ok(Command {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        short_id: ShortId::new_unchecked(short_id),
        name: row.try_get("name").map_err(map_sqlx_error)?,
        description: row.try_get("description").map_err(map_sqlx_error)?,
        author: row.try_get("author").map_err(map_sqlx_error)?,
        code: row.try_get("code").map_err(map_sqlx_error)?,
        kind: row.try_get("type").map_err(map_sqlx_error)?,
        tags: split_tags(&tags),
        difficulty: row.try_get("difficulty").map_err(map_sqlx_error)?,
        views: counter(views, "views")?,
        likes: counter(likes, "likes")?,
        created_at: parse_created_at(created_at)?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

/// SQLite names the offending column in the message, e.g.
/// `UNIQUE constraint failed: commands.short_id`.
fn violates_short_id(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.message().contains("commands.short_id"))
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for SqliteRepository {
    async fn get(&self, id: i64) -> Result<Option<Command>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM commands WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(command_from_row).transpose()
    }

    async fn get_by_short_id(&self, short_id: &ShortId) -> Result<Option<Command>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM commands WHERE short_id = ? LIMIT 1"))
            .bind(short_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(command_from_row).transpose()
    }

    async fn name_exists(&self, name: &str) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM commands
            WHERE name = ?
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }

    async fn list(&self, params: &ListParams) -> Result<Page<Command>> {
        // ?1 is the search term; NULL disables the filter
        const FILTER: &str = r#"
            ?1 IS NULL
            OR instr(lower(name), lower(?1)) > 0
            OR instr(lower(description), lower(?1)) > 0
        "#;

        let total: i64 =
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM commands WHERE {FILTER}"))
                .bind(params.search())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS}
            FROM commands
            WHERE {FILTER}
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(params.search())
        .bind(bind_count(params.page_size()))
        .bind(bind_count(params.offset()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let items = rows
            .iter()
            .map(command_from_row)
            .collect::<Result<Vec<_>>>()?;

        trace!(total, page = params.page(), "listed commands from sqlite");

        Ok(Page {
            items,
            total: counter(total, "total")?,
            page: params.page(),
            page_size: params.page_size(),
        })
    }

    async fn top_by_views(&self, limit: u64) -> Result<Vec<Command>> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM commands ORDER BY views DESC, id ASC LIMIT ?"
        ))
        .bind(bind_count(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(command_from_row).collect()
    }

    async fn stats(&self, active_since: Timestamp) -> Result<CatalogStats> {
        let totals = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_commands,
                COALESCE(SUM(likes), 0) AS total_likes,
                COALESCE(SUM(views), 0) AS total_views,
                COUNT(DISTINCT CASE WHEN created_at >= ? THEN author END) AS active_authors
            FROM commands
            "#,
        )
        .bind(active_since.as_microsecond())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let top_author = sqlx::query(
            r#"
            SELECT author, COUNT(*) AS uploads
            FROM commands
            GROUP BY author
            ORDER BY uploads DESC, author ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .map(|row| -> Result<AuthorCount> {
            let uploads: i64 = row.try_get("uploads").map_err(map_sqlx_error)?;
            Ok(AuthorCount {
                author: row.try_get("author").map_err(map_sqlx_error)?,
                count: counter(uploads, "uploads")?,
            })
        })
        .transpose()?;

        let top_viewed = self.top_by_views(1).await?.into_iter().next();

        let get = |column: &str| -> Result<u64> {
            let value: i64 = totals.try_get(column).map_err(map_sqlx_error)?;
            counter(value, column)
        };

        Ok(CatalogStats {
            total_commands: get("total_commands")?,
            total_likes: get("total_likes")?,
            total_views: get("total_views")?,
            active_authors: get("active_authors")?,
            top_author,
            top_viewed,
        })
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn insert(&self, command: NewCommand) -> Result<Command> {
        let created_at = creation_time();

        let result = sqlx::query(
            r#"
            INSERT INTO commands (short_id, name, description, author, code, type, tags, difficulty, views, likes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?)
            "#,
        )
        .bind(command.short_id.as_str())
        .bind(&command.name)
        .bind(&command.description)
        .bind(&command.author)
        .bind(&command.code)
        .bind(&command.kind)
        .bind(join_tags(&command.tags))
        .bind(&command.difficulty)
        .bind(created_at.as_microsecond())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => {
                let id = done.last_insert_rowid();
                trace!(id, short_id = %command.short_id, "inserted command into sqlite");
                Ok(command.into_command(id, created_at))
            }
            Err(err) if is_unique_violation(&err) && violates_short_id(&err) => {
                Err(StorageError::ShortIdConflict(command.short_id.to_string()))
            }
            Err(err) if is_unique_violation(&err) => Err(StorageError::NameConflict(command.name)),
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn increment_views(&self, id: i64) -> Result<Command> {
        let row = sqlx::query(&format!(
            "UPDATE commands SET views = views + 1 WHERE id = ? RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .ok_or(StorageError::NotFound(id))?;

        command_from_row(&row)
    }

    async fn increment_likes(&self, id: i64) -> Result<u64> {
        let likes: i64 =
            sqlx::query_scalar("UPDATE commands SET likes = likes + 1 WHERE id = ? RETURNING likes")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?
                .ok_or(StorageError::NotFound(id))?;

        counter(likes, "likes")
    }
}
