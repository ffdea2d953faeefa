//! Refresh token generation.
//!
//! Refresh tokens are opaque: 32 bytes from the OS CSPRNG, hex encoded.
//! Expiry and revocation live with the stored row, not in the token.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::AuthError;

/// Random bytes per token (256 bits).
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a new refresh token.
///
/// # Errors
/// Returns `AuthError::Entropy` if the OS random source is unavailable.
pub fn generate_refresh_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::Entropy(e.to_string()))?;

    Ok(hex::encode(bytes))
}
