use typed_builder::TypedBuilder;

pub const DEFAULT_UPLOAD_API_KEY: &str = "secret-key-change-me";
pub const DEFAULT_SHORT_ID_ATTEMPTS: u32 = 8;
pub const DEFAULT_TRENDING_LIMIT: u64 = 10;

/// Runtime knobs of the catalog, passed in at construction.
#[derive(Debug, Clone, TypedBuilder)]
pub struct CatalogSettings {
    /// Shared secret required in the upload credential.
    #[builder(default = DEFAULT_UPLOAD_API_KEY.to_string(), setter(into))]
    pub upload_api_key: String,
    /// How many generated short ids to try before giving up on an upload.
    #[builder(default = DEFAULT_SHORT_ID_ATTEMPTS)]
    pub max_short_id_attempts: u32,
    #[builder(default = DEFAULT_TRENDING_LIMIT)]
    pub trending_limit: u64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
