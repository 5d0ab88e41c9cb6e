//! Core types and traits for the snipdeck command catalog.
//!
//! This crate provides the domain model shared by the storage backends,
//! the catalog service and the HTTP gateway.

pub mod catalog;
pub mod command;
pub mod error;
pub mod query;
pub mod repository;
pub mod short_id;
pub mod stats;

pub use catalog::{Catalog, MaintenanceStatus, UploadDraft};
pub use command::{Command, NewCommand, DEFAULT_DIFFICULTY, DEFAULT_KIND};
pub use error::{CatalogError, CoreError, StorageError};
pub use query::{ListParams, Page};
pub use repository::{ReadRepository, Repository};
pub use short_id::{Identifier, ShortId};
pub use stats::{AuthorCount, CatalogStats};
