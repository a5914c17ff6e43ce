use std::fmt;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::errors::RefreshTokenError;

/// Client attributes a refresh token is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientContext {
    pub user_agent: String,
    pub ip: String,
}

impl ClientContext {
    pub fn new(user_agent: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ip: ip.into(),
        }
    }
}

/// Freshly issued refresh token.
///
/// The plaintext `token` is only known to the client and to the issuing call.
/// It is never persisted and never logged: the `Debug` output redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token: String,
    pub user_id: String,
    pub client: ClientContext,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshToken {
    /// Time left until expiration, zero once expired.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        (self.expires_at - now).max(Duration::zero())
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshToken")
            .field("token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("client", &self.client)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("revoked", &self.revoked)
            .finish()
    }
}

/// Refresh token value handed back by a client, with the context of the
/// request presenting it.
#[derive(Clone, PartialEq, Eq)]
pub struct PresentedRefreshToken {
    pub token: String,
    pub client: ClientContext,
}

impl PresentedRefreshToken {
    pub fn new(token: impl Into<String>, client: ClientContext) -> Self {
        Self {
            token: token.into(),
            client,
        }
    }
}

impl fmt::Debug for PresentedRefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentedRefreshToken")
            .field("token", &"<redacted>")
            .field("client", &self.client)
            .finish()
    }
}

const HASH_LENGTH: usize = 32;

/// SHA-256 digest of a refresh token plaintext, used as the storage key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenHash([u8; HASH_LENGTH]);

impl TokenHash {
    pub const LENGTH: usize = HASH_LENGTH;

    pub fn new(bytes: [u8; Self::LENGTH]) -> Self {
        Self(bytes)
    }

    /// Rebuild a hash read back from storage.
    ///
    /// # Errors
    /// * `InvalidHashLength` - Slice is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RefreshTokenError> {
        <[u8; Self::LENGTH]>::try_from(bytes)
            .map(Self)
            .map_err(|_| RefreshTokenError::InvalidHashLength {
                expected: Self::LENGTH,
                actual: bytes.len(),
            })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for TokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenHash({})", self.to_hex())
    }
}
