use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::context::RequestContext;

/// Describe the session behind the presented access token.
pub async fn current_session(
    Extension(context): Extension<RequestContext>,
) -> Result<ApiSuccess<SessionResponseData>, ApiError> {
    let claims = context.claims()?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        SessionResponseData {
            request_id: context.request_id().to_string(),
            user_id: claims.sub.clone(),
            role: claims.role.clone(),
            expires_at: claims.exp,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionResponseData {
    pub request_id: String,
    pub user_id: String,
    pub role: String,
    /// Access token expiry, seconds since the Unix epoch
    pub expires_at: i64,
}
