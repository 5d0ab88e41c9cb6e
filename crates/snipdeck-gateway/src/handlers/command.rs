use crate::error::{AppError, Result};
use crate::model::{
    ItemListResponse, ItemResponse, LikeResponse, ListQuery, StatsResponse, UploadResponse,
};
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use snipdeck_core::{CatalogError, Identifier, MaintenanceStatus, UploadDraft};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Numeric ids only; anything else cannot name a record.
fn numeric_id(raw: &str) -> Result<i64> {
    match Identifier::parse(raw) {
        Identifier::Id(id) => Ok(id),
        _ => Err(CatalogError::NotFound("Command not found".to_string()).into()),
    }
}

pub async fn list_commands_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ItemListResponse>> {
    let page = state.catalog().list(query.to_params()).await?;
    Ok(Json(ItemListResponse::from_page(page, state.base_url())))
}

pub async fn get_command_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ItemResponse>> {
    let command = state.catalog().view(numeric_id(&id)?).await?;
    Ok(Json(ItemResponse::full(command, state.base_url())))
}

pub async fn lookup_command_handler(
    Path(identifier): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ItemResponse>> {
    let command = state.catalog().lookup(&identifier).await?;
    Ok(Json(ItemResponse::full(command, state.base_url())))
}

pub async fn trending_handler(State(state): State<AppState>) -> Result<Json<Vec<ItemResponse>>> {
    let commands = state.catalog().trending().await?;
    Ok(Json(
        commands
            .into_iter()
            .map(|command| ItemResponse::summary(command, state.base_url()))
            .collect(),
    ))
}

pub async fn raw_code_handler(
    Path(identifier): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let code = state.catalog().raw_code(&identifier).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        code,
    )
        .into_response())
}

pub async fn maintenance_handler(State(state): State<AppState>) -> Json<MaintenanceStatus> {
    Json(state.catalog().maintenance())
}

pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let stats = state.catalog().stats().await?;
    Ok(Json(StatsResponse::new(
        stats,
        state.requests_served(),
        state.base_url(),
    )))
}

pub async fn like_command_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LikeResponse>> {
    let likes = state.catalog().like(numeric_id(&id)?).await?;
    Ok(Json(LikeResponse { likes }))
}

/// Takes the raw body so that the credential is checked before the body is
/// parsed.
pub async fn upload_command_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    let credential = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    let draft = match serde_json::from_slice::<UploadDraft>(&body) {
        Ok(draft) => draft,
        Err(err) => {
            state.catalog().authorize_upload(credential)?;
            return Err(AppError::BadRequest(format!("Invalid JSON body: {err}")));
        }
    };

    let command = state.catalog().upload(credential, draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse::accepted(&command)),
    ))
}
