use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
};
use sqlx::SqlitePool;
use tracing::{debug, error};

use crate::{
    auth::{auth::AuthUser, jwt::verify_token},
    config::Config,
    error::AppError,
    utils::employee_cache::ActiveEmployeeCache,
};

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let resp = AppError::Unauthenticated(message.to_string()).error_response();
    req.into_response(resp)
}

/// Decodes the bearer token, refuses disabled employees and attaches the
/// resulting `AuthUser` to the request.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;
    let pool = req
        .app_data::<Data<SqlitePool>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Database pool missing"))?;
    let cache = req
        .app_data::<Data<ActiveEmployeeCache>>()
        .cloned()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Employee cache missing"))?;

    let Some(header_value) = req.headers().get("Authorization") else {
        return Ok(unauthorized(req, "missing Authorization header"));
    };
    let Ok(header_value) = header_value.to_str() else {
        return Ok(unauthorized(req, "invalid Authorization header encoding"));
    };
    let Some(token) = header_value.strip_prefix("Bearer ") else {
        return Ok(unauthorized(req, "Authorization header must start with Bearer"));
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            return Ok(unauthorized(req, "invalid or expired token"));
        }
    };

    match cache.is_active(pool.get_ref(), claims.employee_id).await {
        Ok(true) => {}
        Ok(false) => {
            debug!(employee_id = claims.employee_id, "Token of inactive employee");
            return Ok(unauthorized(req, "employee account is disabled"));
        }
        Err(e) => {
            error!(error = %e, "Failed to check employee status");
            return Err(AppError::from(e).into());
        }
    }

    req.extensions_mut().insert(AuthUser {
        employee_id: claims.employee_id,
        username: claims.sub,
        role: claims.role,
    });

    next.call(req).await
}
