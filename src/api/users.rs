use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::state::AppState;
use crate::db::{ReceivedMessage, SentMessage, User, UserSummary};
use crate::error::AppError;

/// Per-user resources are private to their owner.
fn ensure_correct_user(viewer: &str, username: &str) -> Result<(), AppError> {
    if viewer != username {
        return Err(AppError::Forbidden(
            "Don't have access to this user's resources".to_string(),
        ));
    }
    Ok(())
}

/// GET /api/users (requires auth)
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>, AppError> {
    let users = state.identity.list_users().await?;

    Ok(Json(users))
}

/// GET /api/users/{username} (requires auth, self only)
pub async fn get(
    State(state): State<AppState>,
    axum::Extension(viewer): axum::Extension<String>,
    Path(username): Path<String>,
) -> Result<Json<User>, AppError> {
    ensure_correct_user(&viewer, &username)?;

    let user = state.identity.get_user(&username).await?;

    Ok(Json(user))
}

/// GET /api/users/{username}/to (requires auth, self only)
pub async fn messages_to(
    State(state): State<AppState>,
    axum::Extension(viewer): axum::Extension<String>,
    Path(username): Path<String>,
) -> Result<Json<Vec<ReceivedMessage>>, AppError> {
    ensure_correct_user(&viewer, &username)?;

    let messages = state.messages.messages_to(&username).await?;

    Ok(Json(messages))
}

/// GET /api/users/{username}/from (requires auth, self only)
pub async fn messages_from(
    State(state): State<AppState>,
    axum::Extension(viewer): axum::Extension<String>,
    Path(username): Path<String>,
) -> Result<Json<Vec<SentMessage>>, AppError> {
    ensure_correct_user(&viewer, &username)?;

    let messages = state.messages.messages_from(&username).await?;

    Ok(Json(messages))
}
