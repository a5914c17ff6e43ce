use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;

use super::ApiError;
use super::ApiSuccess;
use super::TokenResponseData;
use crate::inbound::http::client::ClientInfo;
use crate::inbound::http::cookies::presented_refresh_token;
use crate::inbound::http::cookies::set_refresh_token;
use crate::inbound::http::router::AppState;

/// Rotate the refresh token cookie and issue a new access token.
pub async fn refresh_tokens(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    jar: CookieJar,
) -> Result<(CookieJar, ApiSuccess<TokenResponseData>), ApiError> {
    let presented = presented_refresh_token(&jar, client)?;

    let pair = state.auth_service.refresh_tokens(presented).await?;

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
