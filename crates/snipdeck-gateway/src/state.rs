use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use snipdeck_core::Catalog;

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<dyn Catalog>,
    base_url: String,
    requests: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn Catalog>, public_base_url: impl Into<String>) -> Self {
        Self {
            catalog,
            base_url: public_base_url.into(),
            requests: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn catalog(&self) -> &dyn Catalog {
        self.catalog.as_ref()
    }

    /// Prefix for raw links; empty means links are relative.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of requests this process has served, the current one included.
    pub fn requests_served(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }
}
