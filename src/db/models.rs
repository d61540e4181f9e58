use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub joined_at: i64,
    pub last_login_at: i64,
}

/// Public view of a user, safe to embed in message payloads.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub from_username: String,
    pub to_username: String,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
}

/// A message with both participants resolved to their public profiles.
#[derive(Debug, Clone, Serialize)]
pub struct MessageDetail {
    pub id: String,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub from_user: UserSummary,
    pub to_user: UserSummary,
}

/// An outgoing message as seen by its sender, annotated with the recipient.
#[derive(Debug, Clone, Serialize)]
pub struct SentMessage {
    pub id: String,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub to_user: UserSummary,
}

/// An incoming message as seen by its recipient, annotated with the sender.
#[derive(Debug, Clone, Serialize)]
pub struct ReceivedMessage {
    pub id: String,
    pub body: String,
    pub sent_at: i64,
    pub read_at: Option<i64>,
    pub from_user: UserSummary,
}
