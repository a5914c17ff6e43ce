use std::convert::Infallible;
use std::net::SocketAddr;

use async_trait::async_trait;
use auth::ClientContext;
use axum::extract::ConnectInfo;
use axum::extract::FromRequestParts;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::HeaderMap;

const X_REAL_IP: &str = "x-real-ip";
const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// User agent and address of the client sending the request.
///
/// Refresh tokens are fingerprinted against these values, so every refresh
/// token route extracts them the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo(pub ClientContext);

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self(ClientContext::new(
            user_agent,
            client_ip(&parts.headers, peer),
        )))
    }
}

/// Client address: `X-Real-IP`, else the first `X-Forwarded-For` entry, else
/// the socket peer.
///
/// Both headers are taken as sent. Deploy behind a reverse proxy that
/// overwrites them, otherwise a caller chooses the ip its refresh token is
/// bound to.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(ip) = header_value(headers, X_REAL_IP) {
        return ip.to_string();
    }

    if let Some(ip) = header_value(headers, X_FORWARDED_FOR)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return ip.to_string();
    }

    peer.map(|addr| addr.ip().to_string()).unwrap_or_default()
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
