use crate::settings::CatalogSettings;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use snipdeck_core::command::normalize_tags;
use snipdeck_core::{
    Catalog, CatalogError, CatalogStats, Command, Identifier, ListParams, MaintenanceStatus,
    NewCommand, Page, Repository, ShortId, StorageError, UploadDraft, DEFAULT_DIFFICULTY,
    DEFAULT_KIND,
};
use snipdeck_generator::Generator;
use std::sync::Arc;
use tracing::{debug, info, warn};

type Result<T> = std::result::Result<T, CatalogError>;

/// Authors count towards `active_authors` when they uploaded within the last day.
fn activity_window_start() -> Timestamp {
    Timestamp::now() - SignedDuration::from_hours(24)
}

/// A concrete implementation of the `Catalog` trait.
///
/// This service wraps a `Repository` and a `Generator` to handle:
/// - Upload credential and required-field validation
/// - Short id generation, retried when storage reports a collision
/// - View and like counting
#[derive(Debug)]
pub struct CatalogService<R, G> {
    repository: Arc<R>,
    generator: Arc<G>,
    settings: CatalogSettings,
}

/// An upload whose required fields are present, with defaults applied.
#[derive(Debug, Clone)]
struct ValidUpload {
    name: String,
    description: String,
    author: String,
    code: String,
    kind: String,
    tags: Vec<String>,
    difficulty: String,
}

impl ValidUpload {
    fn from_draft(draft: UploadDraft) -> Result<Self> {
        fn required(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }

        let name = required(draft.item_name);
        let code = required(draft.code);
        let author = required(draft.author_name);

        let (Some(name), Some(code), Some(author)) = (name.clone(), code.clone(), author.clone())
        else {
            let missing: Vec<&str> = [
                ("itemName", name.is_none()),
                ("code", code.is_none()),
                ("authorName", author.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, absent)| absent.then_some(field))
            .collect();
            return Err(CatalogError::BadRequest(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        };

        Ok(Self {
            name,
            description: draft.description.unwrap_or_default(),
            author,
            code,
            kind: draft.r#type.unwrap_or_else(|| DEFAULT_KIND.to_string()),
            tags: normalize_tags(draft.tags.unwrap_or_default()),
            difficulty: draft
                .difficulty
                .unwrap_or_else(|| DEFAULT_DIFFICULTY.to_string()),
        })
    }

    fn demo() -> Self {
        Self {
            name: "demo-command".to_string(),
            description: "A simple demo command".to_string(),
            author: "Aryan Chauhan".to_string(),
            code: r#"module.exports = { config: { name: "demo" }, onStart: () => {} }"#
                .to_string(),
            kind: DEFAULT_KIND.to_string(),
            tags: Vec::new(),
            difficulty: DEFAULT_DIFFICULTY.to_string(),
        }
    }

    fn with_short_id(&self, short_id: ShortId) -> NewCommand {
        NewCommand {
            short_id,
            name: self.name.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            code: self.code.clone(),
            kind: self.kind.clone(),
            tags: self.tags.clone(),
            difficulty: self.difficulty.clone(),
        }
    }
}

/// Counters the demo command is brought up to, so a fresh deployment has
/// something leading trending and stats.
const DEMO_VIEWS: u32 = 100;
const DEMO_LIKES: u32 = 10;

fn not_found() -> CatalogError {
    CatalogError::NotFound("Command not found".to_string())
}

impl<R: Repository, G: Generator> CatalogService<R, G> {
    /// Creates a new `CatalogService` with default settings.
    pub fn new(repository: R, generator: G) -> Self {
        Self::with_settings(repository, generator, CatalogSettings::default())
    }

    pub fn with_settings(repository: R, generator: G, settings: CatalogSettings) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            settings,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Inserts the demo command when the catalog is empty.
    ///
    /// Returns the inserted record, or `None` if the catalog already had data.
    pub async fn seed_demo(&self) -> Result<Option<Command>> {
        let existing = self
            .repository
            .list(&ListParams::new(None, Some(1), Some(1)))
            .await?;
        if existing.total > 0 {
            debug!(total = existing.total, "catalog not empty, skipping demo seed");
            return Ok(None);
        }

        let mut stored = self.insert_with_fresh_short_id(&ValidUpload::demo()).await?;
        for _ in 0..DEMO_VIEWS {
            stored = self.repository.increment_views(stored.id).await?;
        }
        for _ in 0..DEMO_LIKES {
            stored.likes = self.repository.increment_likes(stored.id).await?;
        }
        info!(id = stored.id, short_id = %stored.short_id, "seeded demo command");
        Ok(Some(stored))
    }

    /// Finds a command by numeric id or short id without counting a view.
    async fn resolve(&self, identifier: &str) -> Result<Command> {
        let found = match Identifier::parse(identifier) {
            Identifier::Id(id) => self.repository.get(id).await?,
            Identifier::Short(short_id) => self.repository.get_by_short_id(&short_id).await?,
            Identifier::Unresolvable => None,
        };
        found.ok_or_else(not_found)
    }

    /// Inserts the upload under a freshly generated short id, drawing a new
    /// one whenever storage reports that the id is taken.
    async fn insert_with_fresh_short_id(&self, upload: &ValidUpload) -> Result<Command> {
        let attempts = self.settings.max_short_id_attempts;

        for attempt in 1..=attempts {
            let short_id = self.generator.generate();
            match self.repository.insert(upload.with_short_id(short_id)).await {
                Ok(stored) => return Ok(stored),
                Err(StorageError::ShortIdConflict(taken)) => {
                    warn!(attempt, short_id = %taken, "generated short id already taken, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(CatalogError::ShortIdExhausted(attempts))
    }
}

#[async_trait]
impl<R: Repository, G: Generator> Catalog for CatalogService<R, G> {
    async fn list(&self, params: ListParams) -> Result<Page<Command>> {
        Ok(self.repository.list(&params).await?)
    }

    async fn view(&self, id: i64) -> Result<Command> {
        Ok(self.repository.increment_views(id).await?)
    }

    async fn lookup(&self, identifier: &str) -> Result<Command> {
        let command = self.resolve(identifier).await?;
        self.view(command.id).await
    }

    async fn raw_code(&self, identifier: &str) -> Result<String> {
        Ok(self.resolve(identifier).await?.code)
    }

    async fn trending(&self) -> Result<Vec<Command>> {
        Ok(self
            .repository
            .top_by_views(self.settings.trending_limit)
            .await?)
    }

    async fn stats(&self) -> Result<CatalogStats> {
        Ok(self
            .repository
            .stats(activity_window_start())
            .await?)
    }

    async fn like(&self, id: i64) -> Result<u64> {
        Ok(self.repository.increment_likes(id).await?)
    }

    fn authorize_upload(&self, credential: Option<&str>) -> Result<()> {
        if credential == Some(self.settings.upload_api_key.as_str()) {
            Ok(())
        } else {
            Err(CatalogError::Forbidden)
        }
    }

    async fn upload(&self, credential: Option<&str>, draft: UploadDraft) -> Result<Command> {
        self.authorize_upload(credential)?;
        let upload = ValidUpload::from_draft(draft)?;

        // friendly early answer; the storage constraint still decides races
        if self.repository.name_exists(&upload.name).await? {
            return Err(CatalogError::Conflict(
                "A command with this name already exists".to_string(),
            ));
        }

        let stored = self.insert_with_fresh_short_id(&upload).await?;
        info!(
            id = stored.id,
            short_id = %stored.short_id,
            name = %stored.name,
            "command uploaded"
        );
        Ok(stored)
    }

    fn maintenance(&self) -> MaintenanceStatus {
        MaintenanceStatus::inactive()
    }
}
