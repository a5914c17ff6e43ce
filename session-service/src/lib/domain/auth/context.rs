use std::fmt;

use auth::AccessTokenClaims;
use uuid::Uuid;

use crate::domain::auth::errors::ContextError;

/// Identifier of one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Values scoped to a single request.
///
/// Created when the request enters the router and dropped with it; the
/// authentication middleware attaches verified claims.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    claims: Option<AccessTokenClaims>,
}

impl RequestContext {
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            claims: None,
        }
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Attach verified access token claims.
    pub fn with_claims(self, claims: AccessTokenClaims) -> Self {
        Self {
            claims: Some(claims),
            ..self
        }
    }

    /// Claims attached by the authentication middleware.
    ///
    /// # Errors
    /// * `ClaimsNotPresent` - No claims were attached to this request
    pub fn claims(&self) -> Result<&AccessTokenClaims, ContextError> {
        self.claims.as_ref().ok_or(ContextError::ClaimsNotPresent)
    }
}
