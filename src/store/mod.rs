//! Persistence seams consumed by the session flows.
//!
//! The stores own every row. Callers read through these traits per request and
//! never cache a refresh token row.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::StoreError;

/// A user row as the account subsystem stores it.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            is_chirpy_red: record.is_chirpy_red,
        }
    }
}

/// A persisted refresh token. `revoked_at` is set at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl RefreshTokenRecord {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Read access to accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Flag the user as a paying member. Returns `false` when no such user exists.
    async fn upgrade_to_premium(&self, user_id: Uuid) -> Result<bool, StoreError>;
}

/// Durable record of issued refresh tokens.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new active token. Fails with `StoreError::Duplicate` rather than
    /// overwrite an existing row.
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn get_refresh_token(&self, token: &str)
        -> Result<Option<RefreshTokenRecord>, StoreError>;

    /// Conditionally set `revoked_at`. A missing or already revoked token is a no-op.
    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError>;
}
