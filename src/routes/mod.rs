mod auth;
mod health_check;
mod webhooks;

pub use auth::{current_user, login, refresh, revoke, CurrentUserResponse, LoginRequest, RefreshResponse};
pub use health_check::health_check;
pub use webhooks::{polka_webhook, WebhookData, WebhookEvent, USER_UPGRADED};
