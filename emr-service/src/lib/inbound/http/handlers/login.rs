use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use crate::domain::user::models::AuthenticatedSession;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    state
        .authenticator
        .authenticate(&body.username, &body.password)
        .await
        .map_err(ApiError::from)
        .map(|session| ApiSuccess::new(StatusCode::OK, session.into()))
}

/// HTTP request body for logging in (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub id: i64,
    pub username: String,
    pub email: String,
    pub roles: Vec<String>,
}

impl From<AuthenticatedSession> for LoginResponseData {
    fn from(session: AuthenticatedSession) -> Self {
        Self {
            token: session.token.token,
            token_type: "Bearer".to_string(),
            id: session.user.id.0,
            username: session.user.username.as_str().to_string(),
            email: session.user.email.as_str().to_string(),
            roles: session.authorities,
        }
    }
}
