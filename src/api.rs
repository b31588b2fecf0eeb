use std::sync::Arc;

use axum::{
    extract::{Extension, Form},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::book_service::{BookService, DEFAULT_LIMIT};
use crate::models::BookSnapshot;

const LOG_TARGET: &str = "api";

pub struct AppState {
    pub book: BookService,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/orders", post(book_snapshot))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
}

/// Liveness probe only.
async fn home() -> Json<Value> {
    Json(json!({"msg": "home page"}))
}

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    #[serde(default)]
    pub symbol: String,
    #[serde(default = "default_limit")]
    pub limit: String,
}

fn default_limit() -> String {
    DEFAULT_LIMIT.to_string()
}

/// `POST /orders`: book snapshot for a symbol.
///
/// `limit` arrives string-encoded; a value that does not parse as an
/// integer is a client error answered before any store call is made.
async fn book_snapshot(
    Extension(state): Extension<Arc<AppState>>,
    Form(request): Form<BookRequest>,
) -> Result<Json<BookSnapshot>, (StatusCode, Json<Value>)> {
    let limit: i32 = request
        .limit
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, Json(json!({"error": "Invalid limit"}))))?;

    let snapshot = state
        .book
        .snapshot(&request.symbol, limit)
        .await
        .map_err(|e| {
            log::error!(target: LOG_TARGET, "Book query failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Store query failed"})),
            )
        })?;

    Ok(Json(snapshot))
}
