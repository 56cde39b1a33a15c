use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use super::models::{NewUser, User};

/// Column protected by a uniqueness constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    PhoneNumber,
    SsoIdentity,
    /// A unique constraint this service does not know by name
    Unknown,
}

impl UniqueField {
    /// Map the driver-reported constraint name (see sql/schema.sql)
    pub fn from_constraint(constraint: Option<&str>) -> Self {
        match constraint {
            Some("users_username_key") => UniqueField::Username,
            Some("users_email_key") => UniqueField::Email,
            Some("users_phone_number_key") => UniqueField::PhoneNumber,
            Some("users_sso_identity_key") => UniqueField::SsoIdentity,
            _ => UniqueField::Unknown,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unique constraint violated on {0:?}")]
    Conflict(UniqueField),

    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(UniqueField::from_constraint(db_err.constraint()));
            }
        }
        StoreError::Database(err)
    }
}

/// Profile field that can be changed after registration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatableField {
    Username,
    Email,
    PhoneNumber,
}

impl UpdatableField {
    pub fn column(self) -> &'static str {
        match self {
            UpdatableField::Username => "username",
            UpdatableField::Email => "email",
            UpdatableField::PhoneNumber => "phone_number",
        }
    }
}

/// The system of record for user accounts.
///
/// Writes are attempted directly; the store's unique constraints decide races
/// and surface as `StoreError::Conflict`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, StoreError>;

    /// Exact match on email, provider and provider subject id
    async fn find_by_sso(
        &self,
        email: &str,
        sso_provider: &str,
        sso_id: &str,
    ) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: &NewUser) -> Result<(), StoreError>;

    /// Set `field` from `old` to `new` on the row owned by `owner`.
    /// Returns false when no such row exists.
    async fn update_field(
        &self,
        field: UpdatableField,
        owner: &str,
        old: &str,
        new: &str,
    ) -> Result<bool, StoreError>;

    /// Replace the password hash only while it still equals `current_hash`.
    /// Returns false when the row is gone or the password already changed.
    async fn update_password(
        &self,
        username: &str,
        current_hash: Option<&str>,
        new_hash: &str,
    ) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

const USER_COLUMNS: &str =
    "username, email, phone_number, password_hash, dob, location, sso_provider, sso_id";

/// Postgres-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, predicate: &str, value: &str) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, predicate);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.find_one("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.find_one("email", email).await
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<User>, StoreError> {
        self.find_one("phone_number", phone_number).await
    }

    async fn find_by_sso(
        &self,
        email: &str,
        sso_provider: &str,
        sso_id: &str,
    ) -> Result<Option<User>, StoreError> {
        let query = format!(
            "SELECT {} FROM users WHERE email = $1 AND sso_provider = $2 AND sso_id = $3",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .bind(sso_provider)
            .bind(sso_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert(&self, user: &NewUser) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (username, email, phone_number, password_hash, dob, location, sso_provider, sso_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(&user.password_hash)
        .bind(&user.dob)
        .bind(&user.location)
        .bind(&user.sso_provider)
        .bind(&user.sso_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_field(
        &self,
        field: UpdatableField,
        owner: &str,
        old: &str,
        new: &str,
    ) -> Result<bool, StoreError> {
        // Column names come from a closed enum, never from input
        let column = field.column();
        let query = format!(
            "UPDATE users SET {column} = $1, updated_at = now() WHERE {column} = $2 AND username = $3"
        );
        let result = sqlx::query(&query)
            .bind(new)
            .bind(old)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_password(
        &self,
        username: &str,
        current_hash: Option<&str>,
        new_hash: &str,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = now()
             WHERE username = $2 AND password_hash IS NOT DISTINCT FROM $3",
        )
        .bind(new_hash)
        .bind(username)
        .bind(current_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
