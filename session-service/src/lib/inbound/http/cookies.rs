use auth::ClientContext;
use auth::PresentedRefreshToken;
use auth::RefreshToken;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;
use chrono::Utc;

use super::handlers::ApiError;

pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Only the refresh token routes receive the cookie.
pub const REFRESH_TOKEN_COOKIE_PATH: &str = "/api/auth/tokens";

fn base_cookie(value: String) -> Cookie<'static> {
    Cookie::build((REFRESH_TOKEN_COOKIE, value))
        .path(REFRESH_TOKEN_COOKIE_PATH)
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .build()
}

/// Cookie carrying a refresh token for its remaining lifetime.
pub fn refresh_token_cookie(token: &RefreshToken) -> Cookie<'static> {
    let max_age = token.remaining_lifetime(Utc::now()).num_seconds();

    let mut cookie = base_cookie(token.token.clone());
    cookie.set_max_age(time::Duration::seconds(max_age));
    cookie
}

/// Add the refresh token cookie to the response jar.
pub fn set_refresh_token(jar: CookieJar, token: &RefreshToken) -> CookieJar {
    jar.add(refresh_token_cookie(token))
}

/// Expire the refresh token cookie on the client.
pub fn clear_refresh_token(jar: CookieJar) -> CookieJar {
    jar.remove(base_cookie(String::new()))
}

/// Refresh token sent by the client, bound to its request context.
///
/// # Errors
/// * `Unauthorized` - Cookie is missing or empty
pub fn presented_refresh_token(
    jar: &CookieJar,
    client: ClientContext,
) -> Result<PresentedRefreshToken, ApiError> {
    jar.get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(|value| PresentedRefreshToken::new(value, client))
        .ok_or_else(|| ApiError::Unauthorized("missing refresh token".to_string()))
}
