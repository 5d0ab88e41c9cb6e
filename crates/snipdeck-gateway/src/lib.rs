//! HTTP surface of the snipdeck catalog.
//!
//! [`App::router`] builds the axum router over any [`snipdeck_core::Catalog`]
//! held in [`AppState`]; the `snipdeck` binary wires it to a storage backend.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use error::AppError;
pub use state::AppState;
