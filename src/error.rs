//! Error handling for the credential and session subsystem.
//!
//! Domain failures are typed enums. `AppError` is what every flow returns, and
//! its `ResponseError` impl is the only place that decides what a client gets
//! to see. Login and refresh failures are deliberately blurred there.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

// ============================================================================
// 1. DOMAIN-SPECIFIC ERROR TYPES
// ============================================================================

/// Why an access token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token is malformed")]
    Malformed,
    #[error("token subject is not a user id")]
    InvalidSubject,
}

/// Authentication failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Unknown email or wrong password. Both paths produce this exact value.
    #[error("Incorrect email or password")]
    IncorrectCredentials,
    #[error("Missing or malformed authorization header")]
    MissingOrMalformedHeader,
    /// Refresh token not found, expired or revoked.
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid access token: {0}")]
    Token(#[from] TokenError),
    #[error("Invalid API key")]
    InvalidApiKey,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Secure random source unavailable: {0}")]
    Entropy(String),
}

/// Persistence failures reported by a session or user store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Duplicate entry: {0}")]
    Duplicate(String),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Query error: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                StoreError::Duplicate(db_err.message().to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

// ============================================================================
// 2. UNIFIED APPLICATION ERROR TYPE
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("No user with id {0}")]
    UserNotFound(uuid::Uuid),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::Auth(AuthError::Token(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Store(err.into())
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Error body returned to clients.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    /// Correlates the response with the server-side log line
    pub error_id: String,
    pub message: String,
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl AppError {
    /// Status, code and client-facing message. Internal detail never leaks here.
    fn public_parts(&self) -> (StatusCode, &'static str, &'static str) {
        match self {
            AppError::Auth(e) => match e {
                AuthError::IncorrectCredentials => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_CREDENTIALS",
                    "Incorrect email or password",
                ),
                AuthError::MissingOrMalformedHeader => (
                    StatusCode::BAD_REQUEST,
                    "MISSING_TOKEN",
                    "Couldn't find token",
                ),
                AuthError::Unauthorized => (
                    StatusCode::UNAUTHORIZED,
                    "UNAUTHORIZED",
                    "Couldn't get user for refresh token",
                ),
                AuthError::Token(_) => (
                    StatusCode::UNAUTHORIZED,
                    "TOKEN_INVALID",
                    "Invalid or expired token",
                ),
                AuthError::InvalidApiKey => (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_API_KEY",
                    "Invalid API key",
                ),
                AuthError::Hashing(_) | AuthError::Entropy(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error",
                ),
            },
            AppError::UserNotFound(_) => (
                StatusCode::NOT_FOUND,
                "USER_NOT_FOUND",
                "Couldn't find user",
            ),
            AppError::Store(StoreError::Unavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "Service temporarily unavailable",
            ),
            AppError::Store(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "Internal server error",
            ),
        }
    }

    pub fn log_error(&self, error_id: &str) {
        match self {
            AppError::Auth(AuthError::Hashing(_)) | AppError::Auth(AuthError::Entropy(_)) => {
                tracing::error!(error_id = error_id, error = %self, "Crypto backend failure");
            }
            AppError::Auth(e) => {
                tracing::warn!(error_id = error_id, error = %e, "Authentication error");
            }
            AppError::UserNotFound(user_id) => {
                tracing::info!(error_id = error_id, user_id = %user_id, "User not found");
            }
            AppError::Store(e) => {
                tracing::error!(error_id = error_id, error = %e, "Store error");
            }
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.public_parts().0
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&error_id);

        let (status, code, message) = self.public_parts();
        HttpResponse::build(status).json(ErrorResponse::new(
            error_id,
            message.to_string(),
            code.to_string(),
            status.as_u16(),
        ))
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-operation context attached to log lines.
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
        }
    }

    pub fn log_error(&self, error: &AppError) {
        tracing::warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            user_id = ?self.user_id,
            error = %error,
            "Operation failed"
        );
    }
}
