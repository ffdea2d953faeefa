//! Credential primitives: password hashing, access tokens, refresh tokens,
//! header parsing and API keys. Everything here is stateless.

mod api_key;
mod claims;
mod headers;
mod jwt;
mod password;
mod refresh_token;

pub use api_key::ApiKey;
pub use claims::{Claims, ISSUER};
pub use headers::{extract_api_key, extract_bearer, API_KEY_SCHEME, BEARER_SCHEME};
pub use jwt::AccessTokenCodec;
pub use password::{
    hash_password, reject_unknown_account, verify_password, HASH_COST, MAX_PASSWORD_BYTES,
};
pub use refresh_token::{generate_refresh_token, REFRESH_TOKEN_BYTES};
