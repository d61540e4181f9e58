use sqlx::{Pool, Sqlite};
use crate::db::models::{User, UserSummary};
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        username: &str,
        password_hash: &str,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> Result<User, AppError> {
        let now = chrono::Utc::now().timestamp();

        let user = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (username, password_hash, first_name, last_name, phone, joined_at, last_login_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .bind(phone)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await;

        match user {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AppError::Conflict(format!(
                    "Username \"{}\" is already taken",
                    username
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get_by_username(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username = ?"
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn update_last_login(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<(), AppError> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            "UPDATE users SET last_login_at = ? WHERE username = ?"
        )
        .bind(now)
        .bind(username)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Username \"{}\" doesn't exist",
                username
            )));
        }

        Ok(())
    }

    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT username, first_name, last_name, phone FROM users ORDER BY username"
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
