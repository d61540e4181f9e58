use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::{Message, MessageDetail, ReceivedMessage, SentMessage, UserSummary};
use crate::error::AppError;

/// Flat row shape for a message joined against both participants.
#[derive(sqlx::FromRow)]
struct MessageDetailRow {
    id: String,
    body: String,
    sent_at: i64,
    read_at: Option<i64>,
    from_username: String,
    from_first_name: String,
    from_last_name: String,
    from_phone: String,
    to_username: String,
    to_first_name: String,
    to_last_name: String,
    to_phone: String,
}

impl From<MessageDetailRow> for MessageDetail {
    fn from(row: MessageDetailRow) -> Self {
        MessageDetail {
            id: row.id,
            body: row.body,
            sent_at: row.sent_at,
            read_at: row.read_at,
            from_user: UserSummary {
                username: row.from_username,
                first_name: row.from_first_name,
                last_name: row.from_last_name,
                phone: row.from_phone,
            },
            to_user: UserSummary {
                username: row.to_username,
                first_name: row.to_first_name,
                last_name: row.to_last_name,
                phone: row.to_phone,
            },
        }
    }
}

/// Flat row shape for a message joined against one counterpart.
#[derive(sqlx::FromRow)]
struct CounterpartRow {
    id: String,
    body: String,
    sent_at: i64,
    read_at: Option<i64>,
    username: String,
    first_name: String,
    last_name: String,
    phone: String,
}

impl CounterpartRow {
    fn into_sent(self) -> SentMessage {
        SentMessage {
            id: self.id,
            body: self.body,
            sent_at: self.sent_at,
            read_at: self.read_at,
            to_user: UserSummary {
                username: self.username,
                first_name: self.first_name,
                last_name: self.last_name,
                phone: self.phone,
            },
        }
    }

    fn into_received(self) -> ReceivedMessage {
        ReceivedMessage {
            id: self.id,
            body: self.body,
            sent_at: self.sent_at,
            read_at: self.read_at,
            from_user: UserSummary {
                username: self.username,
                first_name: self.first_name,
                last_name: self.last_name,
                phone: self.phone,
            },
        }
    }
}

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        from_username: &str,
        to_username: &str,
        body: &str,
    ) -> Result<Message, AppError> {
        let id = Uuid::new_v4().to_string();
        let sent_at = chrono::Utc::now().timestamp();

        let message = sqlx::query_as::<_, Message>(
            r#"
INSERT INTO messages (id, from_username, to_username, body, sent_at, read_at)
VALUES (?, ?, ?, ?, ?, NULL)
RETURNING *
            "#,
        )
        .bind(&id)
        .bind(from_username)
        .bind(to_username)
        .bind(body)
        .bind(sent_at)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    pub async fn get_detail(
        pool: &Pool<Sqlite>,
        id: &str,
    ) -> Result<Option<MessageDetail>, AppError> {
        let row = sqlx::query_as::<_, MessageDetailRow>(
            r#"
SELECT m.id, m.body, m.sent_at, m.read_at,
       f.username AS from_username, f.first_name AS from_first_name,
       f.last_name AS from_last_name, f.phone AS from_phone,
       t.username AS to_username, t.first_name AS to_first_name,
       t.last_name AS to_last_name, t.phone AS to_phone
FROM messages m
JOIN users f ON f.username = m.from_username
JOIN users t ON t.username = m.to_username
WHERE m.id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(MessageDetail::from))
    }

    pub async fn mark_read(
        pool: &Pool<Sqlite>,
        id: &str,
    ) -> Result<Option<Message>, AppError> {
        let read_at = chrono::Utc::now().timestamp();

        // Re-stamp, but never move an existing read_at backwards
        let message = sqlx::query_as::<_, Message>(
            r#"
UPDATE messages
SET read_at = MAX(COALESCE(read_at, 0), ?)
WHERE id = ?
RETURNING *
            "#,
        )
        .bind(read_at)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(message)
    }

    pub async fn list_from(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Vec<SentMessage>, AppError> {
        let rows = sqlx::query_as::<_, CounterpartRow>(
            r#"
SELECT m.id, m.body, m.sent_at, m.read_at,
       t.username, t.first_name, t.last_name, t.phone
FROM messages m
JOIN users t ON t.username = m.to_username
WHERE m.from_username = ?
ORDER BY m.sent_at
            "#,
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(CounterpartRow::into_sent).collect())
    }

    pub async fn list_to(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Vec<ReceivedMessage>, AppError> {
        let rows = sqlx::query_as::<_, CounterpartRow>(
            r#"
SELECT m.id, m.body, m.sent_at, m.read_at,
       f.username, f.first_name, f.last_name, f.phone
FROM messages m
JOIN users f ON f.username = m.from_username
WHERE m.to_username = ?
ORDER BY m.sent_at
            "#,
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(CounterpartRow::into_received).collect())
    }
}
