//! Authentication handlers

use axum::{extract::{State, rejection::JsonRejection}, Json};
use chrono::{Utc, Duration};
use jsonwebtoken::{encode, Header, EncodingKey};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AppState, AppError, AppResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Admin username
    pub exp: usize,       // Expiration timestamp
    pub iat: usize,       // Issued at
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: u64,
}

/// Login endpoint: exchange the static credential pair for a JWT
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let (Some(admin_user), Some(admin_password)) =
        (state.config.admin_user.as_deref(), state.config.admin_password.as_deref())
    else {
        return Err(AppError::NotFound("Authentication is disabled".to_string()));
    };

    let Json(req) = payload?;
    req.validate()?;

    if !constant_time_eq(req.username.as_bytes(), admin_user.as_bytes())
        | !constant_time_eq(req.password.as_bytes(), admin_password.as_bytes())
    {
        tracing::warn!("Failed login attempt for '{}'", req.username);
        return Err(AppError::InvalidCredentials);
    }

    let token = create_token(&req.username, &state.config.jwt_secret, state.config.jwt_expiration_hours)?;

    tracing::info!("Admin logged in: {}", req.username);

    Ok(Json(LoginResponse {
        token,
        expires_in: state.config.jwt_expiration_hours * 3600,
    }))
}

/// Create JWT token
pub fn create_token(username: &str, secret: &str, expiration_hours: u64) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours as i64);

    let claims = Claims {
        sub: username.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes())
    ).map_err(|e| AppError::InternalError(e.to_string()))
}

/// Compare without short-circuiting on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
