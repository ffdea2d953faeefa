//! Session endpoints.
//!
//! Translation of flow errors into status codes happens in `AppError`'s
//! `ResponseError` impl; handlers only move data in and out.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::session::SessionManager;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct CurrentUserResponse {
    pub user_id: uuid::Uuid,
}

/// POST /api/login
///
/// # Errors
/// - 401: Unknown email or wrong password (same body for both)
/// - 500: Token generation or persistence failed
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let outcome = sessions.login(&form.email, &form.password).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /api/refresh
///
/// Requires `Authorization: Bearer <refresh_token>`.
///
/// # Errors
/// - 400: Missing or malformed header
/// - 401: Refresh token unknown, expired or revoked
pub async fn refresh(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    let token = sessions.refresh(req.headers()).await?;
    Ok(HttpResponse::Ok().json(RefreshResponse { token }))
}

/// POST /api/revoke
///
/// Requires `Authorization: Bearer <refresh_token>`. Always 204 once the
/// header parses, whether or not the token existed.
pub async fn revoke(
    req: HttpRequest,
    sessions: web::Data<SessionManager>,
) -> Result<HttpResponse, AppError> {
    sessions.revoke(req.headers()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/me
///
/// Wrapped by `JwtMiddleware`.
pub async fn current_user(user: web::ReqData<AuthenticatedUser>) -> HttpResponse {
    HttpResponse::Ok().json(CurrentUserResponse { user_id: user.0 })
}
