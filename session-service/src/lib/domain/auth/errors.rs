use std::error::Error as StdError;

use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Category of an authentication failure, as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthErrorKind {
    #[error("invalid credentials")]
    WrongCredentials,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    ExpiredToken,

    #[error("email already registered")]
    EmailAlreadyExists,

    #[error("unexpected error")]
    Unexpected,
}

/// Error returned by the authentication service.
///
/// Carries the operation that failed and, for wrapped failures, the lower
/// level cause.
#[derive(Debug, Error)]
#[error("{op}: {kind}")]
pub struct AuthError {
    op: &'static str,
    kind: AuthErrorKind,
    #[source]
    source: Option<BoxError>,
}

impl AuthError {
    pub fn new(op: &'static str, kind: AuthErrorKind) -> Self {
        Self {
            op,
            kind,
            source: None,
        }
    }

    /// Wrap a lower level error with the operation and kind.
    pub fn wrap<E>(op: &'static str, kind: AuthErrorKind, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self {
            op,
            kind,
            source: Some(source.into()),
        }
    }

    pub fn op(&self) -> &'static str {
        self.op
    }

    pub fn kind(&self) -> AuthErrorKind {
        self.kind
    }
}

/// Error for reading the per-request context.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContextError {
    /// Claims were read on a route the authentication middleware did not run on.
    #[error("access token claims are not present in the request context")]
    ClaimsNotPresent,
}
