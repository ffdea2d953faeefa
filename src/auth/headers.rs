//! Credential extraction from the `Authorization` header.

use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AuthError;

pub const BEARER_SCHEME: &str = "Bearer";
pub const API_KEY_SCHEME: &str = "ApiKey";

/// Extract the token from `Authorization: Bearer <token>`.
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_credential(headers, BEARER_SCHEME)
}

/// Extract the key from `Authorization: ApiKey <key>`.
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_credential(headers, API_KEY_SCHEME)
}

/// The scheme is matched case-sensitively and must be followed by a single
/// credential with no embedded whitespace.
fn extract_credential(headers: &HeaderMap, scheme: &str) -> Result<String, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingOrMalformedHeader)?
        .to_str()
        .map_err(|_| AuthError::MissingOrMalformedHeader)?;

    let credential = value
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::trim)
        .ok_or(AuthError::MissingOrMalformedHeader)?;

    if credential.is_empty() || credential.contains(char::is_whitespace) {
        return Err(AuthError::MissingOrMalformedHeader);
    }

    Ok(credential.to_string())
}
