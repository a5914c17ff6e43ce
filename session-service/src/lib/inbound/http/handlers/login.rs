use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::domain::auth::models::LoginCommand;
use crate::inbound::http::client::ClientInfo;
use crate::inbound::http::cookies::set_refresh_token;
use crate::inbound::http::router::AppState;

/// Exchange credentials for an access token; the refresh token is set as an
/// HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, ApiSuccess<TokenResponseData>), ApiError> {
    let pair = state
        .auth_service
        .login_user(LoginCommand::new(body.email, body.password, client))
        .await?;

    Ok((
        set_refresh_token(jar, &pair.refresh_token),
        ApiSuccess::new(
            StatusCode::OK,
            TokenResponseData {
                token: pair.access_token,
            },
        ),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}
