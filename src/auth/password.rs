//! Password hashing and verification with bcrypt.

use bcrypt::{hash, verify};
use lazy_static::lazy_static;

use crate::error::AuthError;

/// Fixed work factor. Keeps one verification in the tens of milliseconds.
pub const HASH_COST: u32 = 10;

/// bcrypt only reads this many bytes of input. Longer passwords are refused
/// instead of being truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

lazy_static! {
    // Verified against when the account does not exist, so a miss costs the
    // same bcrypt round as a wrong password.
    static ref DUMMY_HASH: String = match hash("chirpy-unknown-account", HASH_COST) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build dummy password hash");
            String::new()
        }
    };
}

/// Hash a password with a fresh random salt.
///
/// # Errors
/// Returns `AuthError::Hashing` if the password exceeds `MAX_PASSWORD_BYTES`
/// or bcrypt cannot produce a hash.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AuthError::Hashing(format!(
            "password longer than {} bytes",
            MAX_PASSWORD_BYTES
        )));
    }
    hash(password, HASH_COST).map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a stored bcrypt hash.
///
/// Any failure, including an unreadable stored hash or an over-long password,
/// is reported as `AuthError::IncorrectCredentials`.
pub fn verify_password(password: &str, password_hash: &str) -> Result<(), AuthError> {
    if password.len() > MAX_PASSWORD_BYTES {
        // Nothing this long was ever hashed; spend the round anyway.
        return reject_unknown_account(password);
    }
    match verify(password, password_hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(AuthError::IncorrectCredentials),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash could not be read");
            Err(AuthError::IncorrectCredentials)
        }
    }
}

/// Burn one verification against a throwaway hash and always fail.
pub fn reject_unknown_account(password: &str) -> Result<(), AuthError> {
    let _ = verify(password, DUMMY_HASH.as_str());
    Err(AuthError::IncorrectCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "04234";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("correct horse battery staple").unwrap();

        assert_eq!(verify_password("correct horse battery staple", &hash), Ok(()));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("correct horse battery staple").unwrap();

        assert_eq!(
            verify_password("correct horse battery stapler", &hash),
            Err(AuthError::IncorrectCredentials)
        );
        assert_eq!(verify_password("", &hash), Err(AuthError::IncorrectCredentials));
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("hunter2", &first).is_ok());
        assert!(verify_password("hunter2", &second).is_ok());
    }

    #[test]
    fn test_long_password_rejected_at_hash_time() {
        let password = "a".repeat(MAX_PASSWORD_BYTES + 1);

        assert!(matches!(
            hash_password(&password),
            Err(AuthError::Hashing(_))
        ));
        assert!(hash_password(&"a".repeat(MAX_PASSWORD_BYTES)).is_ok());
    }

    #[test]
    fn test_shared_72_byte_prefix_does_not_verify() {
        let prefix = "a".repeat(MAX_PASSWORD_BYTES);
        let hash = hash_password(&prefix).unwrap();

        assert_eq!(verify_password(&prefix, &hash), Ok(()));
        assert_eq!(
            verify_password(&format!("{}correct", prefix), &hash),
            Err(AuthError::IncorrectCredentials)
        );
        assert_eq!(
            verify_password(&format!("{}WRONG", prefix), &hash),
            Err(AuthError::IncorrectCredentials)
        );
    }

    #[test]
    fn test_dummy_hash_is_a_real_hash() {
        assert!(DUMMY_HASH.starts_with("$2"));
        assert_eq!(DUMMY_HASH.len(), 60);
    }

    #[test]
    fn test_unreadable_hash_is_a_mismatch() {
        assert_eq!(
            verify_password("hunter2", "not-a-bcrypt-hash"),
            Err(AuthError::IncorrectCredentials)
        );
    }

    #[test]
    fn test_unknown_account_matches_wrong_password() {
        let hash = hash_password("hunter2").unwrap();

        assert_eq!(
            reject_unknown_account("hunter2"),
            verify_password("hunter3", &hash)
        );
    }
}
