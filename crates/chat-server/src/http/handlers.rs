//! Route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

use chat_types::{
    ChatError,
    api::{ChatApiRequest, ChatApiResponse, ErrorBody},
};
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::state::AppState;

/// POST /api/chat
pub async fn chat(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<ChatApiRequest>, JsonRejection>,
) -> Result<Json<ChatApiResponse>, ApiError> {
    let Json(request) = body.map_err(|e| ChatError::Validation(e.body_text()))?;
    let response = state.endpoint.handle(user.as_deref(), request).await?;
    Ok(Json(response))
}

/// GET /api/debug/db-check
pub async fn db_check(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let result = state.history.check().await?;
    Ok(Json(json!({
        "message": "Database schema check completed",
        "result": result,
    })))
}

/// GET /api/health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not found")))
}
