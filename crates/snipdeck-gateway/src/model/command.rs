use serde::{Deserialize, Serialize};
use snipdeck_core::{CatalogStats, Command, ListParams, Page};

/// Query string of `GET /api/items`.
///
/// Numbers are kept as strings so that malformed values fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn to_params(&self) -> ListParams {
        fn number(value: &Option<String>) -> Option<i64> {
            value.as_deref().and_then(|v| v.trim().parse().ok())
        }

        ListParams::new(
            self.search.clone(),
            number(&self.page),
            number(&self.limit),
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    #[serde(rename = "itemID")]
    pub item_id: i64,
    pub short_id: String,
    pub item_name: String,
    pub description: String,
    pub author_name: String,
    pub r#type: String,
    pub tags: Vec<String>,
    pub difficulty: String,
    pub views: u64,
    pub likes: u64,
    pub created_at: String,
    pub raw_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ItemResponse {
    /// Listing form, without the code.
    pub fn summary(command: Command, base_url: &str) -> Self {
        Self {
            item_id: command.id,
            raw_link: command.short_id.raw_link(base_url),
            short_id: command.short_id.to_string(),
            item_name: command.name,
            description: command.description,
            author_name: command.author,
            r#type: command.kind,
            tags: command.tags,
            difficulty: command.difficulty,
            views: command.views,
            likes: command.likes,
            created_at: command.created_at.to_string(),
            code: None,
        }
    }

    /// Single-item form, code included.
    pub fn full(mut command: Command, base_url: &str) -> Self {
        let code = std::mem::take(&mut command.code);
        Self {
            code: Some(code),
            ..Self::summary(command, base_url)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemListResponse {
    pub items: Vec<ItemResponse>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}

impl ItemListResponse {
    pub fn from_page(page: Page<Command>, base_url: &str) -> Self {
        let total_pages = page.total_pages();
        Self {
            total: page.total,
            page: page.page,
            total_pages,
            items: page
                .items
                .into_iter()
                .map(|command| ItemResponse::summary(command, base_url))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub item_id: i64,
    pub short_id: String,
    pub message: &'static str,
}

impl UploadResponse {
    pub fn accepted(command: &Command) -> Self {
        Self {
            success: true,
            item_id: command.id,
            short_id: command.short_id.to_string(),
            message: "Upload successful",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub likes: u64,
}

#[derive(Debug, Serialize)]
pub struct AuthorCountResponse {
    #[serde(rename = "_id")]
    pub author: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub total_commands: u64,
    pub total_likes: u64,
    pub total_views: u64,
    pub daily_active_users: u64,
    pub total_uploads: u64,
    pub total_requests: u64,
    pub top_authors: Vec<AuthorCountResponse>,
    pub top_viewed: Option<ItemResponse>,
}

impl StatsResponse {
    pub fn new(stats: CatalogStats, total_requests: u64, base_url: &str) -> Self {
        Self {
            total_commands: stats.total_commands,
            total_likes: stats.total_likes,
            total_views: stats.total_views,
            daily_active_users: stats.active_authors,
            total_uploads: stats.total_commands,
            total_requests,
            top_authors: stats
                .top_author
                .into_iter()
                .map(|top| AuthorCountResponse {
                    author: top.author,
                    count: top.count,
                })
                .collect(),
            top_viewed: stats
                .top_viewed
                .map(|command| ItemResponse::summary(command, base_url)),
        }
    }
}
