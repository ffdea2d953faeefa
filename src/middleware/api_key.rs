use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::ApiKey;
use crate::error::AppError;

/// Extractor that only succeeds for callers presenting the configured API key.
#[derive(Debug, Clone, Copy)]
pub struct TrustedService;

impl FromRequest for TrustedService {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate_service(req))
    }
}

fn authenticate_service(req: &HttpRequest) -> Result<TrustedService, AppError> {
    let api_key = req
        .app_data::<web::Data<ApiKey>>()
        .ok_or_else(|| AppError::Internal("API key is not configured".to_string()))?;

    api_key.verify(req.headers())?;
    Ok(TrustedService)
}
