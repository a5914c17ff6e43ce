use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Claims carried by a signed access token.
///
/// Exists only inside a token string: built once at issuance, decoded on every
/// authenticated request, never persisted and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenClaims {
    /// Subject (string form of the user identifier)
    pub sub: String,

    /// Role of the subject at issuance time
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Unique token identifier, for traceability only
    pub jti: String,
}

impl AccessTokenClaims {
    /// Build claims for a subject valid from now for `lifetime`.
    ///
    /// # Arguments
    /// * `subject` - User identifier
    /// * `role` - Role name
    /// * `lifetime` - Time until the token expires
    ///
    /// # Returns
    /// Claims with sub, role, iat, exp and a fresh jti set
    pub fn new(subject: impl ToString, role: impl ToString, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: subject.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Override issued-at and expiration timestamps.
    pub fn with_validity(mut self, iat: i64, exp: i64) -> Self {
        self.iat = iat;
        self.exp = exp;
        self
    }
}
