//! In-process store with the same semantics as the Postgres one.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{RefreshTokenRecord, SessionStore, UserRecord, UserStore};
use crate::error::StoreError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    refresh_tokens: HashMap<String, RefreshTokenRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }

    /// Seed an account. Stands in for the registration flow.
    pub fn insert_user(&self, email: &str, password_hash: &str) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::Duplicate(format!("email {}", email)));
        }

        let now = Utc::now();
        let user = UserRecord {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
            is_chirpy_red: false,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn refresh_token_count(&self) -> Result<usize, StoreError> {
        Ok(self.tables()?.refresh_tokens.len())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .tables()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn upgrade_to_premium(&self, user_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables()?;
        match tables.users.get_mut(&user_id) {
            Some(user) => {
                user.is_chirpy_red = true;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if tables.refresh_tokens.contains_key(token) {
            return Err(StoreError::Duplicate("refresh token".to_string()));
        }

        tables.refresh_tokens.insert(
            token.to_string(),
            RefreshTokenRecord {
                token: token.to_string(),
                user_id,
                created_at: Utc::now(),
                expires_at,
                revoked_at: None,
            },
        );
        Ok(())
    }

    async fn get_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshTokenRecord>, StoreError> {
        Ok(self.tables()?.refresh_tokens.get(token).cloned())
    }

    async fn revoke_refresh_token(&self, token: &str) -> Result<(), StoreError> {
        let mut tables = self.tables()?;
        if let Some(record) = tables.refresh_tokens.get_mut(token) {
            if record.revoked_at.is_none() {
                record.revoked_at = Some(Utc::now());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_duplicate_token_is_rejected() {
        let store = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let expires_at = Utc::now() + Duration::days(60);

        store.create_refresh_token(user_id, "tok", expires_at).await.unwrap();
        let second = store.create_refresh_token(Uuid::new_v4(), "tok", expires_at).await;

        assert!(matches!(second, Err(StoreError::Duplicate(_))));
        let row = store.get_refresh_token("tok").await.unwrap().unwrap();
        assert_eq!(row.user_id, user_id);
    }

    #[tokio::test]
    async fn test_revoke_sets_timestamp_once() {
        let store = MemoryStore::new();
        store
            .create_refresh_token(Uuid::new_v4(), "tok", Utc::now() + Duration::days(60))
            .await
            .unwrap();

        store.revoke_refresh_token("tok").await.unwrap();
        let first = store.get_refresh_token("tok").await.unwrap().unwrap().revoked_at;
        store.revoke_refresh_token("tok").await.unwrap();
        let second = store.get_refresh_token("tok").await.unwrap().unwrap().revoked_at;

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_revoke_unknown_token_is_noop() {
        let store = MemoryStore::new();
        assert!(store.revoke_refresh_token("missing").await.is_ok());
        assert_eq!(store.refresh_token_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_user_lookup_and_upgrade() {
        let store = MemoryStore::new();
        let user = store.insert_user("saul@bettercall.com", "hash").unwrap();

        let found = store.get_user_by_email("saul@bettercall.com").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);
        assert!(!found.is_chirpy_red);

        assert!(store.upgrade_to_premium(user.id).await.unwrap());
        assert!(!store.upgrade_to_premium(Uuid::new_v4()).await.unwrap());

        let found = store.get_user_by_email("saul@bettercall.com").await.unwrap().unwrap();
        assert!(found.is_chirpy_red);
        assert!(store.insert_user("saul@bettercall.com", "hash").is_err());
    }
}
