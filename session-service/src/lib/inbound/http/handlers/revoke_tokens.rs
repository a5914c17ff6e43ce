use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;

use super::ApiError;
use crate::inbound::http::client::ClientInfo;
use crate::inbound::http::cookies::clear_refresh_token;
use crate::inbound::http::cookies::presented_refresh_token;
use crate::inbound::http::router::AppState;

/// Revoke the refresh token cookie (logout).
pub async fn revoke_tokens(
    State(state): State<AppState>,
    ClientInfo(client): ClientInfo,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), ApiError> {
    let presented = presented_refresh_token(&jar, client)?;

    state.auth_service.logout_user(presented).await?;

    Ok((clear_refresh_token(jar), StatusCode::NO_CONTENT))
}
