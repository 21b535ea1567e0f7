use std::collections::BTreeSet;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Deserialize;
use thiserror::Error;

use super::ApiError;
use super::ApiSuccess;
use super::JsonBody;
use super::MessageResponse;
use crate::domain::user::models::CreateAccountCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Password;
use crate::domain::user::models::Username;
use crate::inbound::http::middleware::AuthenticatedPrincipal;
use crate::inbound::http::router::AppState;
use crate::user::errors::EmailError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::UsernameError;

/// Public self-service registration.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<CreateAccountRequest>,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    provision(&state, body).await
}

/// Account creation on behalf of an administrator.
pub async fn add_user(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    JsonBody(body): JsonBody<CreateAccountRequest>,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    tracing::info!(admin = %principal.username, "Admin account creation");
    provision(&state, body).await
}

async fn provision(
    state: &AppState,
    body: CreateAccountRequest,
) -> Result<ApiSuccess<MessageResponse>, ApiError> {
    state
        .provisioner
        .create_account(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|_| {
            ApiSuccess::new(
                StatusCode::OK,
                MessageResponse::new("User created successfully!"),
            )
        })
}

/// HTTP request body for creating an account (raw JSON)
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct CreateAccountRequest {
    username: String,
    email: String,
    password: String,
    #[serde(default)]
    role: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Error)]
enum ParseCreateAccountRequestError {
    #[error("Invalid username: {0}")]
    Username(#[from] UsernameError),

    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    #[error("Invalid password: {0}")]
    Password(#[from] PasswordPolicyError),
}

impl CreateAccountRequest {
    fn try_into_command(self) -> Result<CreateAccountCommand, ParseCreateAccountRequestError> {
        let username = Username::new(self.username)?;
        let email = EmailAddress::new(self.email)?;
        let password = Password::new(self.password)?;
        Ok(CreateAccountCommand::new(
            username, email, password, self.role,
        ))
    }
}

impl From<ParseCreateAccountRequestError> for ApiError {
    fn from(err: ParseCreateAccountRequestError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
