use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::TrustedService;
use crate::store::UserStore;

pub const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

/// POST /api/polka/webhooks
///
/// Payment provider callback, authenticated with `Authorization: ApiKey <key>`.
/// Events other than `user.upgraded` are acknowledged and ignored.
pub async fn polka_webhook(
    _caller: TrustedService,
    body: web::Json<WebhookEvent>,
    users: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    if body.event != USER_UPGRADED {
        return Ok(HttpResponse::NoContent().finish());
    }

    let user_id = body.data.user_id;
    if !users.upgrade_to_premium(user_id).await? {
        return Err(AppError::UserNotFound(user_id));
    }

    tracing::info!(user_id = %user_id, "User upgraded");
    Ok(HttpResponse::NoContent().finish())
}
