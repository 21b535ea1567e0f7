use auth::TokenError;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;

use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::role::models::RoleName;

/// Extension type carrying the caller established from a bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub username: String,
    pub authorities: Vec<String>,
}

/// Middleware admitting only bearers of a valid token granting ADMIN.
///
/// Missing, malformed, forged or expired tokens yield 401. A valid token
/// without the ADMIN authority yields 403.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token_from_header(&req)?;

    let claims = state.tokens.validate(token).map_err(|e| {
        tracing::warn!(error = %e, "Token validation failed");
        match e {
            TokenError::ExpiredToken => ApiError::Unauthorized("Token is expired".to_string()),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    })?;

    if !claims.has_authority(RoleName::Admin.as_str()) {
        tracing::warn!(username = %claims.subject(), "Admin route refused");
        return Err(ApiError::Forbidden("Access denied".to_string()));
    }

    req.extensions_mut().insert(AuthenticatedPrincipal {
        username: claims.subject().to_string(),
        authorities: claims.authorities().to_vec(),
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, ApiError> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )
    })
}
