use sqlx::{Pool, Sqlite};

use crate::crypto::{hash_password, verify_password, HashingParams, TokenSigner};
use crate::db::{User, UserRepository, UserSummary};
use crate::error::AppError;

/// Registration input, validated before any credential work happens.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

/// Account registration, credential checks, and session token handling.
#[derive(Clone)]
pub struct IdentityService {
    db: Pool<Sqlite>,
    signer: TokenSigner,
    hashing: HashingParams,
}

impl IdentityService {
    pub fn new(db: Pool<Sqlite>, signer: TokenSigner, hashing: HashingParams) -> Self {
        Self {
            db,
            signer,
            hashing,
        }
    }

    /// Create an account. The password is hashed before it ever touches
    /// the database; the stored row never sees the plaintext.
    pub async fn register(&self, new_user: NewUser) -> Result<UserSummary, AppError> {
        require_non_empty(&new_user.username, "username")?;
        require_non_empty(&new_user.password, "password")?;
        require_non_empty(&new_user.first_name, "first_name")?;
        require_non_empty(&new_user.last_name, "last_name")?;
        require_non_empty(&new_user.phone, "phone")?;

        let password_hash = hash_password(&new_user.password, &self.hashing)?;

        let user = UserRepository::create(
            &self.db,
            &new_user.username,
            &password_hash,
            &new_user.first_name,
            &new_user.last_name,
            &new_user.phone,
        )
        .await?;

        tracing::debug!("User registered: {}", user.username);

        Ok(UserSummary {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
        })
    }

    /// Check a password against the stored hash. Unknown usernames are an
    /// error; a wrong password is an ordinary `false`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AppError> {
        let user = UserRepository::get_by_username(&self.db, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User \"{}\" doesn't exist", username)))?;

        verify_password(&user.password_hash, password)
    }

    pub async fn update_login_timestamp(&self, username: &str) -> Result<(), AppError> {
        UserRepository::update_last_login(&self.db, username).await
    }

    /// Full login: verify credentials, stamp the login time, issue a token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let ok = self.authenticate(username, password).await?;
        if !ok {
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        self.update_login_timestamp(username).await?;
        tracing::debug!("Login succeeded: {}", username);

        self.issue_token(username)
    }

    pub fn issue_token(&self, username: &str) -> Result<String, AppError> {
        self.signer.issue(username)
    }

    /// Verify a session token and return the username it asserts.
    pub fn verify_token(&self, token: &str) -> Result<String, AppError> {
        self.signer.verify(token)
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>, AppError> {
        UserRepository::list(&self.db).await
    }

    pub async fn get_user(&self, username: &str) -> Result<User, AppError> {
        UserRepository::get_by_username(&self.db, username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User \"{}\" doesn't exist", username)))
    }
}

fn require_non_empty(value: &str, field: &str) -> Result<(), AppError> {
    if value.is_empty() {
        return Err(AppError::Validation(format!("Missing field: {}", field)));
    }
    Ok(())
}
