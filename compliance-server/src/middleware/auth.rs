//! Authentication middleware

use axum::{
    extract::{State, Request},
    middleware::Next,
    response::Response,
    http::header::AUTHORIZATION,
};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};

use crate::{AppState, AppError};
use crate::handlers::auth::Claims;

/// Admin identity extracted from a verified token
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub username: String,
}

/// Middleware: require an admin JWT when a credential pair is configured.
/// With auth disabled every request passes through untouched.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(admin_user) = state.config.admin_user.as_deref().filter(|_| state.config.auth_enabled()) else {
        return Ok(next.run(req).await);
    };

    let token = extract_bearer_token(&req)?;

    let token_data = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(state.config.jwt_secret.as_bytes()),
        &Validation::default()
    )?;

    if token_data.claims.sub != admin_user {
        tracing::warn!("Token subject '{}' is not the configured admin", token_data.claims.sub);
        return Err(AppError::TokenInvalid);
    }

    req.extensions_mut().insert(AdminContext {
        username: token_data.claims.sub,
    });

    Ok(next.run(req).await)
}

/// Extract bearer token from Authorization header
fn extract_bearer_token(req: &Request) -> Result<String, AppError> {
    let auth_header = req.headers()
        .get(AUTHORIZATION)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .ok_or(AppError::Unauthorized)
}

// Implement FromRequestParts for AdminContext
#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions
            .get::<AdminContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
