use crate::command::Command;
use crate::error::CatalogError;
use crate::query::{ListParams, Page};
use crate::stats::CatalogStats;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, CatalogError>;

/// Upload body as submitted by a client.
///
/// Every field is optional here; required-field checks belong to the
/// catalog so that a bad credential is reported before a bad body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadDraft {
    pub item_name: Option<String>,
    pub code: Option<String>,
    pub author_name: Option<String>,
    pub description: Option<String>,
    pub r#type: Option<String>,
    pub tags: Option<Vec<String>>,
    pub difficulty: Option<String>,
}

/// Whether the service is in maintenance mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceStatus {
    pub enabled: bool,
    pub title: String,
    pub message: String,
}

impl MaintenanceStatus {
    pub fn inactive() -> Self {
        Self {
            enabled: false,
            title: String::new(),
            message: String::new(),
        }
    }
}

#[async_trait]
pub trait Catalog: Send + Sync + 'static {
    /// Lists commands, newest first.
    async fn list(&self, params: ListParams) -> Result<Page<Command>>;

    /// Fetches a command by id and counts the view.
    async fn view(&self, id: i64) -> Result<Command>;

    /// Resolves a numeric id or short id and counts the view.
    async fn lookup(&self, identifier: &str) -> Result<Command>;

    /// Resolves like [`Catalog::lookup`] but returns only the code and does
    /// not count a view.
    async fn raw_code(&self, identifier: &str) -> Result<String>;

    /// The most viewed commands.
    async fn trending(&self) -> Result<Vec<Command>>;

    async fn stats(&self) -> Result<CatalogStats>;

    /// Adds a like and returns the new like count.
    async fn like(&self, id: i64) -> Result<u64>;

    /// Checks an upload credential without touching the store.
    fn authorize_upload(&self, credential: Option<&str>) -> Result<()>;

    /// Validates and persists a new command.
    async fn upload(&self, credential: Option<&str>, draft: UploadDraft) -> Result<Command>;

    fn maintenance(&self) -> MaintenanceStatus;
}
