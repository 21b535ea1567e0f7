use std::sync::Arc;
use std::time::Duration;

use auth::TokenService;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::create_account::add_user;
use super::handlers::create_account::signup;
use super::handlers::login::login;
use super::middleware::require_admin;
use crate::user::ports::AccountProvisioning;
use crate::user::ports::Authentication;

#[derive(Clone)]
pub struct AppState {
    pub provisioner: Arc<dyn AccountProvisioning>,
    pub authenticator: Arc<dyn Authentication>,
    pub tokens: Arc<TokenService>,
}

pub fn create_router(
    provisioner: Arc<dyn AccountProvisioning>,
    authenticator: Arc<dyn Authentication>,
    tokens: Arc<TokenService>,
) -> Router {
    let state = AppState {
        provisioner,
        authenticator,
        tokens,
    };

    let public_routes = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/signup", post(signup));

    let admin_routes = Router::new()
        .route("/api/admin/user/add", post(add_user))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Headers stay out of the span: Authorization carries bearer tokens.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
