//! Service-to-service authentication with a static API key.

use actix_web::http::header::HeaderMap;
use sha2::{Digest, Sha256};

use crate::auth::headers::extract_api_key;
use crate::error::AuthError;

/// The configured key trusted callers present as `Authorization: ApiKey <key>`.
#[derive(Clone)]
pub struct ApiKey {
    digest: [u8; 32],
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

impl ApiKey {
    pub fn new(key: &str) -> Self {
        Self { digest: sha256(key) }
    }

    /// Check that the request carries the configured key.
    pub fn verify(&self, headers: &HeaderMap) -> Result<(), AuthError> {
        let presented = extract_api_key(headers)?;
        if self.matches(&presented) {
            Ok(())
        } else {
            Err(AuthError::InvalidApiKey)
        }
    }

    /// Comparing fixed-size digests keeps the running time independent of
    /// the key length and of where the first differing byte sits.
    pub fn matches(&self, presented: &str) -> bool {
        let presented = sha256(presented);
        self.digest
            .iter()
            .zip(presented.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

fn sha256(input: &str) -> [u8; 32] {
    Sha256::digest(input.as_bytes()).into()
}
