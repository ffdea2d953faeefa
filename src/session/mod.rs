//! Login, refresh and revoke flows.
//!
//! Refresh tokens are not rotated on use: one refresh token per login stays
//! valid until it expires or is revoked.

use std::sync::Arc;

use actix_web::http::header::HeaderMap;
use chrono::{Duration, Utc};
use serde::Serialize;

use crate::auth::{
    extract_bearer, generate_refresh_token, reject_unknown_account, verify_password,
    AccessTokenCodec,
};
use crate::error::{AppError, AuthError, ErrorContext};
use crate::store::{SessionStore, User, UserStore};

/// Lifetime of an access token.
pub fn access_token_ttl() -> Duration {
    Duration::hours(1)
}

/// Lifetime of a refresh token row.
pub fn refresh_token_ttl() -> Duration {
    Duration::days(60)
}

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    #[serde(flatten)]
    pub user: User,
    #[serde(rename = "token")]
    pub access_token: String,
    pub refresh_token: String,
}

/// Why a refresh token was refused. Logged, never returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RefreshRejection {
    NotFound,
    Expired,
    Revoked,
}

#[derive(Clone)]
pub struct SessionManager {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    codec: AccessTokenCodec,
}

impl SessionManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        codec: AccessTokenCodec,
    ) -> Self {
        Self {
            users,
            sessions,
            codec,
        }
    }

    pub fn codec(&self) -> &AccessTokenCodec {
        &self.codec
    }

    /// Verify credentials, then issue an access token and a persisted refresh token.
    ///
    /// An unknown email and a wrong password both yield
    /// `AuthError::IncorrectCredentials` after one bcrypt verification.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let mut context = ErrorContext::new("login");

        match self.attempt_login(email, password, &mut context).await {
            Ok(outcome) => {
                tracing::info!(
                    request_id = %context.request_id,
                    user_id = %outcome.user.id,
                    "User logged in"
                );
                Ok(outcome)
            }
            Err(err) => {
                context.log_error(&err);
                Err(err)
            }
        }
    }

    async fn attempt_login(
        &self,
        email: &str,
        password: &str,
        context: &mut ErrorContext,
    ) -> Result<LoginOutcome, AppError> {
        let user = self.users.get_user_by_email(email).await?;
        if let Some(user) = &user {
            context.user_id = Some(user.id.to_string());
        }

        let password = password.to_string();
        let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
        tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => verify_password(&password, &hash),
            None => reject_unknown_account(&password),
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))??;

        // Verification only succeeds against a real hash.
        let user = user.ok_or(AuthError::IncorrectCredentials)?;

        let access_token = self.codec.issue(user.id, access_token_ttl())?;
        let refresh_token = generate_refresh_token()?;

        let expires_at = Utc::now() + refresh_token_ttl();
        self.sessions
            .create_refresh_token(user.id, &refresh_token, expires_at)
            .await?;

        Ok(LoginOutcome {
            user: User::from(&user),
            access_token,
            refresh_token,
        })
    }

    /// Exchange the bearer refresh token for a fresh access token.
    pub async fn refresh(&self, headers: &HeaderMap) -> Result<String, AppError> {
        let token = extract_bearer(headers)?;

        let record = self.sessions.get_refresh_token(&token).await?;
        let now = Utc::now();
        let rejection = match &record {
            None => Some(RefreshRejection::NotFound),
            Some(r) if r.is_revoked() => Some(RefreshRejection::Revoked),
            Some(r) if r.is_expired_at(now) => Some(RefreshRejection::Expired),
            Some(_) => None,
        };

        let record = match (record, rejection) {
            (Some(record), None) => record,
            (record, reason) => {
                tracing::warn!(
                    reason = ?reason,
                    user_id = ?record.map(|r| r.user_id),
                    "Refresh token refused"
                );
                return Err(AuthError::Unauthorized.into());
            }
        };

        let access_token = self.codec.issue(record.user_id, access_token_ttl())?;

        tracing::info!(user_id = %record.user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke the bearer refresh token. Unknown or already revoked tokens succeed.
    pub async fn revoke(&self, headers: &HeaderMap) -> Result<(), AppError> {
        let token = extract_bearer(headers)?;

        self.sessions.revoke_refresh_token(&token).await?;

        tracing::info!("Refresh token revoked");
        Ok(())
    }

    /// Verify an access token and return the user id it was issued for.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<uuid::Uuid, AppError> {
        let token = extract_bearer(headers)?;
        Ok(self.codec.verify(&token)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::store::MemoryStore;
    use actix_web::http::header::{HeaderValue, AUTHORIZATION};

    const SECRET: &str = "unit-test-secret";

    fn manager() -> (SessionManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let manager = SessionManager::new(
            store.clone(),
            store.clone(),
            AccessTokenCodec::new(SECRET),
        );
        (manager, store)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_ttls() {
        assert_eq!(access_token_ttl().num_seconds(), 3600);
        assert_eq!(refresh_token_ttl().num_days(), 60);
    }

    #[tokio::test]
    async fn test_expired_row_is_unauthorized() {
        let (manager, store) = manager();
        store
            .create_refresh_token(uuid::Uuid::new_v4(), "stale", Utc::now() - Duration::seconds(1))
            .await
            .unwrap();

        let err = manager.refresh(&bearer("stale")).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_response_shape() {
        let (manager, store) = manager();
        store
            .insert_user("lane@example.com", &hash_password("04234").unwrap())
            .unwrap();

        let outcome = manager.login("lane@example.com", "04234").await.unwrap();
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["email"], "lane@example.com");
        assert!(json["token"].is_string());
        assert!(json["refresh_token"].is_string());
        assert!(json.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_failed_login_context_keeps_one_request_id() {
        let (manager, store) = manager();
        let user = store
            .insert_user("lane@example.com", &hash_password("04234").unwrap())
            .unwrap();

        let mut context = ErrorContext::new("login");
        let request_id = context.request_id.clone();
        let err = manager
            .attempt_login("lane@example.com", "wrong", &mut context)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Auth(AuthError::IncorrectCredentials)));
        assert_eq!(context.request_id, request_id);
        assert_eq!(context.user_id, Some(user.id.to_string()));

        let mut context = ErrorContext::new("login");
        manager
            .attempt_login("nobody@example.com", "04234", &mut context)
            .await
            .unwrap_err();
        assert!(context.user_id.is_none());
    }

    #[tokio::test]
    async fn test_authenticate_with_issued_token() {
        let (manager, _) = manager();
        let user_id = uuid::Uuid::new_v4();
        let token = manager.codec().issue(user_id, access_token_ttl()).unwrap();

        assert_eq!(manager.authenticate(&bearer(&token)).unwrap(), user_id);
        assert!(manager.authenticate(&HeaderMap::new()).is_err());
    }
}
