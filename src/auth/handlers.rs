use actix_web::{HttpResponse, web};
use sqlx::SqlitePool;
use tracing::{debug, error, info, instrument};

use crate::{
    auth::{jwt::generate_access_token, password::verify_password},
    config::Config,
    directory,
    error::AppError,
    models::{LoginReqDto, LoginResponse},
};

/// Exchanges credentials of an active employee for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials or disabled account")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let username = user.username.trim().to_lowercase();
    if username.is_empty() || user.password.is_empty() {
        return Err(AppError::Validation(
            "username and password are required".into(),
        ));
    }

    let Some(creds) = directory::credentials(pool.get_ref(), &username).await? else {
        info!("Invalid credentials: unknown username");
        return Err(AppError::Unauthenticated("invalid credentials".into()));
    };

    if let Err(e) = verify_password(&user.password, &creds.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::Unauthenticated("invalid credentials".into()));
    }

    if !creds.active {
        info!(employee_id = creds.id, "Login refused: account disabled");
        return Err(AppError::Unauthenticated(
            "employee account is disabled".into(),
        ));
    }

    debug!(employee_id = creds.id, "Generating access token");
    let access_token = generate_access_token(
        creds.id,
        creds.username,
        creds.role,
        &config.jwt_secret,
        config.access_token_ttl,
    )
    .map_err(|e| {
        error!(error = %e, "Failed to sign access token");
        AppError::Internal(e.to_string())
    })?;

    info!(employee_id = creds.id, "Login successful");
    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer".into(),
        expires_in: config.access_token_ttl,
    }))
}
