use sqlx::{Pool, Sqlite};

use crate::db::{
    Message, MessageDetail, MessageRepository, ReceivedMessage, SentMessage, UserRepository,
};
use crate::error::AppError;

/// Message delivery and access control. Only the two participants may read
/// a message, and only the recipient may mark it read.
#[derive(Clone)]
pub struct MessageService {
    db: Pool<Sqlite>,
}

impl MessageService {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn send(
        &self,
        from_username: &str,
        to_username: &str,
        body: &str,
    ) -> Result<Message, AppError> {
        // Resolve the recipient before inspecting the payload
        UserRepository::get_by_username(&self.db, to_username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User \"{}\" doesn't exist", to_username)))?;

        if body.is_empty() {
            return Err(AppError::Validation("Missing field: body".to_string()));
        }

        if from_username == to_username {
            return Err(AppError::Validation(
                "Can't send a message to yourself".to_string(),
            ));
        }

        let message = MessageRepository::create(&self.db, from_username, to_username, body).await?;

        tracing::debug!("Message sent: {} -> {}", from_username, to_username);

        Ok(message)
    }

    /// Fetch a message with both participants resolved. Only the sender and
    /// the recipient may see it.
    pub async fn get_for_viewer(
        &self,
        id: &str,
        viewer: &str,
    ) -> Result<MessageDetail, AppError> {
        let detail = MessageRepository::get_detail(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message \"{}\" doesn't exist", id)))?;

        if viewer != detail.from_user.username && viewer != detail.to_user.username {
            return Err(AppError::Forbidden(
                "Don't have access to read this message".to_string(),
            ));
        }

        Ok(detail)
    }

    /// Stamp a message as read. Only the recipient may do this.
    pub async fn mark_read(&self, id: &str, viewer: &str) -> Result<Message, AppError> {
        let detail = MessageRepository::get_detail(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message \"{}\" doesn't exist", id)))?;

        if viewer != detail.to_user.username {
            return Err(AppError::Forbidden(
                "Can't mark this message as read".to_string(),
            ));
        }

        MessageRepository::mark_read(&self.db, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Message \"{}\" doesn't exist", id)))
    }

    pub async fn messages_from(&self, username: &str) -> Result<Vec<SentMessage>, AppError> {
        MessageRepository::list_from(&self.db, username).await
    }

    pub async fn messages_to(&self, username: &str) -> Result<Vec<ReceivedMessage>, AppError> {
        MessageRepository::list_to(&self.db, username).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> Pool<Sqlite> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages_test.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());
        std::mem::forget(dir);

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect(&url)
            .await
            .unwrap();

        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        pool
    }

    async fn seed_user(pool: &Pool<Sqlite>, username: &str) {
        UserRepository::create(pool, username, "unused-hash", "First", "Last", "555-0000")
            .await
            .unwrap();
    }

    async fn test_service() -> MessageService {
        let pool = test_pool().await;
        seed_user(&pool, "alice").await;
        seed_user(&pool, "bob").await;
        seed_user(&pool, "carol").await;
        MessageService::new(pool)
    }

    #[tokio::test]
    async fn test_send_creates_unread_message() {
        let svc = test_service().await;

        let message = svc.send("alice", "bob", "hello").await.unwrap();
        assert_eq!(message.from_username, "alice");
        assert_eq!(message.to_username, "bob");
        assert_eq!(message.body, "hello");
        assert!(message.sent_at > 0);
        assert!(message.read_at.is_none());
    }

    #[tokio::test]
    async fn test_send_to_unknown_recipient_is_not_found() {
        let svc = test_service().await;

        let err = svc.send("alice", "ghost", "hello").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_send_empty_body_rejected() {
        let svc = test_service().await;

        let err = svc.send("alice", "bob", "").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_send_to_self_rejected() {
        let svc = test_service().await;

        let err = svc.send("alice", "alice", "dear diary").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_only_participants_can_read() {
        let svc = test_service().await;
        let message = svc.send("alice", "bob", "hello").await.unwrap();

        let as_alice = svc.get_for_viewer(&message.id, "alice").await.unwrap();
        assert_eq!(as_alice.from_user.username, "alice");
        assert_eq!(as_alice.to_user.username, "bob");
        assert_eq!(as_alice.body, "hello");

        svc.get_for_viewer(&message.id, "bob").await.unwrap();

        let err = svc.get_for_viewer(&message.id, "carol").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_get_unknown_message_is_not_found() {
        let svc = test_service().await;

        let err = svc.get_for_viewer("no-such-id", "alice").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_only_recipient_can_mark_read() {
        let svc = test_service().await;
        let message = svc.send("alice", "bob", "hello").await.unwrap();

        // Neither the sender nor a stranger may stamp it
        let err = svc.mark_read(&message.id, "alice").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = svc.mark_read(&message.id, "carol").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let marked = svc.mark_read(&message.id, "bob").await.unwrap();
        assert!(marked.read_at.is_some());
    }

    #[tokio::test]
    async fn test_mark_read_unknown_message_is_not_found() {
        let svc = test_service().await;

        let err = svc.mark_read("no-such-id", "bob").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_read_never_moves_backwards() {
        let svc = test_service().await;
        let message = svc.send("alice", "bob", "hello").await.unwrap();

        // Plant a read stamp far in the future
        let future = 4102444800_i64;
        sqlx::query("UPDATE messages SET read_at = ? WHERE id = ?")
            .bind(future)
            .bind(&message.id)
            .execute(&svc.db)
            .await
            .unwrap();

        let marked = svc.mark_read(&message.id, "bob").await.unwrap();
        assert_eq!(marked.read_at, Some(future));
    }

    #[tokio::test]
    async fn test_lists_annotate_the_counterpart() {
        let svc = test_service().await;
        svc.send("alice", "bob", "first").await.unwrap();
        svc.send("alice", "bob", "second").await.unwrap();
        svc.send("bob", "alice", "reply").await.unwrap();

        let from_alice = svc.messages_from("alice").await.unwrap();
        assert_eq!(from_alice.len(), 2);
        assert!(from_alice.iter().all(|m| m.to_user.username == "bob"));
        let bodies: Vec<&str> = from_alice.iter().map(|m| m.body.as_str()).collect();
        assert!(bodies.contains(&"first") && bodies.contains(&"second"));

        let to_alice = svc.messages_to("alice").await.unwrap();
        assert_eq!(to_alice.len(), 1);
        assert_eq!(to_alice[0].from_user.username, "bob");
        assert_eq!(to_alice[0].body, "reply");

        assert!(svc.messages_from("carol").await.unwrap().is_empty());
        assert!(svc.messages_to("carol").await.unwrap().is_empty());
    }
}
