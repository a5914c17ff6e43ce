use axum::extract::Request;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use tracing::Instrument;

use super::handlers::ApiError;
use super::router::AppState;
use crate::domain::auth::context::RequestContext;
use crate::domain::auth::context::RequestId;
use crate::domain::auth::errors::ContextError;
use crate::domain::user::models::UserRole;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that opens the per-request context and its tracing span.
///
/// The request id is echoed in the `x-request-id` response header.
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    req.extensions_mut().insert(RequestContext::new(request_id));

    let span = tracing::info_span!(
        "request_context",
        request_id = %request_id,
        user_id = tracing::field::Empty,
    );
    let mut response = next.run(req).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Middleware that verifies the bearer access token and attaches its claims
/// to the request context.
pub async fn authenticate(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        bearer.ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    let claims = state
        .auth_service
        .token_claims(bearer.token())
        .map_err(|e| {
            tracing::warn!(error = %e, "Access token rejected");
            ApiError::from(e)
        })?;

    tracing::Span::current().record("user_id", claims.sub.as_str());

    let context = req
        .extensions_mut()
        .remove::<RequestContext>()
        .unwrap_or_else(|| RequestContext::new(RequestId::new()));
    req.extensions_mut().insert(context.with_claims(claims));

    Ok(next.run(req).await)
}

/// Middleware that admits only the given roles. Runs after `authenticate`.
pub async fn require_roles(
    State(allowed): State<&'static [UserRole]>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<RequestContext>()
        .ok_or(ContextError::ClaimsNotPresent)?
        .claims()?;

    let permitted = claims
        .role
        .parse::<UserRole>()
        .map(|role| allowed.contains(&role))
        .unwrap_or(false);

    if !permitted {
        tracing::warn!(role = %claims.role, "Role not allowed");
        return Err(ApiError::Forbidden("insufficient role".to_string()));
    }

    Ok(next.run(req).await)
}
