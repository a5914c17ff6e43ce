use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRole;
use crate::inbound::http::router::AppState;

/// Issue an access token for a throwaway user id with the requested role.
///
/// No refresh token is issued and nothing is persisted.
pub async fn dummy_login(
    State(state): State<AppState>,
    Json(body): Json<DummyLoginRequest>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let role = body
        .role
        .parse::<UserRole>()
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    let token = state
        .auth_service
        .generate_access_token(&UserId::new(), role)?;

    Ok(ApiSuccess::new(StatusCode::OK, TokenResponseData { token }))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DummyLoginRequest {
    role: String,
}
