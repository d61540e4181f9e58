use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::api::state::AppState;
use crate::db::{Message, MessageDetail};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub to_username: String,
    pub body: String,
}

/// POST /api/messages (requires auth)
pub async fn send(
    State(state): State<AppState>,
    axum::Extension(viewer): axum::Extension<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<Message>, AppError> {
    let message = state
        .messages
        .send(&viewer, &req.to_username, &req.body)
        .await?;

    Ok(Json(message))
}

/// GET /api/messages/{id} (requires auth, participants only)
pub async fn get(
    State(state): State<AppState>,
    axum::Extension(viewer): axum::Extension<String>,
    Path(id): Path<String>,
) -> Result<Json<MessageDetail>, AppError> {
    let message = state.messages.get_for_viewer(&id, &viewer).await?;

    Ok(Json(message))
}

/// POST /api/messages/{id}/read (requires auth, recipient only)
pub async fn mark_read(
    State(state): State<AppState>,
    axum::Extension(viewer): axum::Extension<String>,
    Path(id): Path<String>,
) -> Result<Json<Message>, AppError> {
    let message = state.messages.mark_read(&id, &viewer).await?;

    Ok(Json(message))
}
