use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use snipdeck_core::CatalogError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Catalog(err) => match err {
                CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
                CatalogError::BadRequest(_) => StatusCode::BAD_REQUEST,
                CatalogError::Forbidden => StatusCode::FORBIDDEN,
                CatalogError::Conflict(_) => StatusCode::CONFLICT,
                CatalogError::ShortIdExhausted(_) | CatalogError::Storage(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error: message,
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_errors_map_to_statuses() {
        let cases = [
            (CatalogError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CatalogError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (CatalogError::Forbidden, StatusCode::FORBIDDEN),
            (CatalogError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                CatalogError::ShortIdExhausted(8),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CatalogError::Storage("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status(), status);
        }
    }

    #[test]
    fn into_response_uses_mapped_status() {
        let response = AppError::from(CatalogError::Storage("disk on fire".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = AppError::BadRequest("bad".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
