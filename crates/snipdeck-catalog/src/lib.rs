//! Command catalog service implementation.
//!
//! This crate provides [`CatalogService`], the implementation of the
//! [`snipdeck_core::Catalog`] contract on top of any repository and short id
//! generator.

pub mod service;
pub mod settings;

pub use service::CatalogService;
pub use settings::CatalogSettings;
