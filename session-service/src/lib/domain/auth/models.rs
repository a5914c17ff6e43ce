use auth::ClientContext;
use auth::RefreshToken;
use auth::TokenHash;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRole;

/// Command to exchange credentials for a token pair.
pub struct LoginCommand {
    pub email: String,
    pub password: String,
    pub client: ClientContext,
}

impl LoginCommand {
    pub fn new(email: String, password: String, client: ClientContext) -> Self {
        Self {
            email,
            password,
            client,
        }
    }
}

/// Persisted form of a refresh token.
///
/// Holds the storage hash and the client-binding fingerprint, never the
/// plaintext value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token_hash: TokenHash,
    pub fingerprint: String,
    pub user_id: UserId,
    pub user_agent: String,
    pub ip: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl RefreshTokenRecord {
    /// Build the record to persist for a freshly issued token.
    ///
    /// # Arguments
    /// * `token` - Issued refresh token (plaintext is not copied)
    /// * `token_hash` - Storage hash of the plaintext
    /// * `fingerprint` - Fingerprint of the plaintext and client
    /// * `user_id` - Owner of the token
    pub fn issued(
        token: &RefreshToken,
        token_hash: TokenHash,
        fingerprint: String,
        user_id: UserId,
    ) -> Self {
        Self {
            token_hash,
            fingerprint,
            user_id,
            user_agent: token.client.user_agent.clone(),
            ip: token.client.ip.clone(),
            created_at: token.created_at,
            expires_at: token.expires_at,
            revoked: token.revoked,
        }
    }

    /// Not revoked and not past its expiration.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && now <= self.expires_at
    }

    pub fn client(&self) -> ClientContext {
        ClientContext::new(self.user_agent.clone(), self.ip.clone())
    }
}

/// Refresh token record joined with the role of its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRoleAndRefreshToken {
    pub role: UserRole,
    pub token: RefreshTokenRecord,
}

/// Access token and refresh token issued together.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: RefreshToken,
}
