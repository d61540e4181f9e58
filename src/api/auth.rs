use axum::{
    extract::State,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::error::AppError;
use crate::service::NewUser;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .identity
        .register(NewUser {
            username: req.username,
            password: req.password,
            first_name: req.first_name,
            last_name: req.last_name,
            phone: req.phone,
        })
        .await?;

    // Registration doubles as the first login
    let token = state.identity.issue_token(&user.username)?;

    Ok(Json(TokenResponse { token }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = state.identity.login(&req.username, &req.password).await?;

    Ok(Json(TokenResponse { token }))
}
