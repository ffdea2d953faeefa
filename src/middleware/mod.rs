//! Request guards for access tokens and service API keys.

mod api_key;
mod jwt_middleware;

pub use api_key::TrustedService;
pub use jwt_middleware::{AuthenticatedUser, JwtMiddleware};
