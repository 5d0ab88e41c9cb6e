use crate::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct SqliteConfig {
    #[builder(default = "snipdeck-test.db".to_string())]
    file_name: String,
    #[builder(default = "snipdeck-".to_string())]
    dir_prefix: String,
}

/// Test fixture for a disposable SQLite database file.
///
/// The file lives in a fresh temporary directory that is removed, together
/// with any WAL/SHM side files, when the fixture is dropped.
pub struct SqliteDatabase {
    dir: TempDir,
    path: PathBuf,
}

impl SqliteDatabase {
    /// Reserves a database path inside a new temporary directory. The file
    /// itself is created by whoever opens it first.
    pub fn new(config: SqliteConfig) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(config.dir_prefix.as_str())
            .tempdir()?;
        let path = dir.path().join(&config.file_name);
        Ok(Self { dir, path })
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the directory holding the database.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
