use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::handlers::{
    get_command_handler, health_handler, landing_page_handler, like_command_handler,
    list_commands_handler, lookup_command_handler, maintenance_handler, raw_code_handler,
    stats_handler, trending_handler, upload_command_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/", get(landing_page_handler))
            .route("/health", get(health_handler))
            .route("/raw/{identifier}", get(raw_code_handler))
            .nest(
                "/api",
                Router::new()
                    .route(
                        "/items",
                        get(list_commands_handler).post(upload_command_handler),
                    )
                    .route("/items/{id}/like", post(like_command_handler))
                    .route("/item/{id}", get(get_command_handler))
                    .route("/lookup/{identifier}", get(lookup_command_handler))
                    .route("/trending", get(trending_handler))
                    .route("/stats", get(stats_handler))
                    .route("/maintenance", get(maintenance_handler)),
            )
            .fallback(route_not_found)
            .layer(middleware::from_fn_with_state(
                state.clone(),
                count_requests,
            ))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

async fn count_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.record_request();
    next.run(request).await
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}
