use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::current_session::current_session;
use super::handlers::dummy_login::dummy_login;
use super::handlers::health::health;
use super::handlers::login::login;
use super::handlers::refresh_tokens::refresh_tokens;
use super::handlers::register::register;
use super::handlers::revoke_tokens::revoke_tokens;
use super::middleware::authenticate;
use super::middleware::request_context;
use super::middleware::require_roles;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::user::models::UserRole;

/// Roles admitted to the session endpoint.
const SESSION_ROLES: &[UserRole] = &[UserRole::Employee, UserRole::Moderator];

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthServicePort>,
}

pub fn create_router(auth_service: Arc<dyn AuthServicePort>) -> Router {
    let state = AppState { auth_service };

    let public_routes = Router::new()
        .route("/healthz", get(health))
        .route("/api/auth/dummy-login", post(dummy_login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/tokens/refresh", post(refresh_tokens))
        .route("/api/auth/tokens/revoke", post(revoke_tokens));

    // Layers run bottom-up: authenticate before require_roles.
    let protected_routes = Router::new()
        .route("/api/auth/session", get(current_session))
        .route_layer(middleware::from_fn_with_state(SESSION_ROLES, require_roles))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            authenticate,
        ));

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
        .merge(protected_routes)
        .layer(middleware::from_fn(request_context))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
