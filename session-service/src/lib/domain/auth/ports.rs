use async_trait::async_trait;
use auth::AccessTokenClaims;
use auth::PresentedRefreshToken;
use auth::TokenHash;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::RefreshTokenRecord;
use crate::domain::auth::models::TokenPair;
use crate::domain::auth::models::UserRoleAndRefreshToken;
use crate::domain::errors::RepositoryError;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRole;

/// Authentication operations exposed to the inbound adapters.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user with a hashed password.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Unexpected` - Hashing or persistence failed
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, AuthError>;

    /// Exchange email and password for an access token and a refresh token.
    ///
    /// # Errors
    /// * `WrongCredentials` - Unknown email or password mismatch
    /// * `Unexpected` - Signing, entropy or persistence failed
    async fn login_user(&self, command: LoginCommand) -> Result<TokenPair, AuthError>;

    /// Rotate a refresh token: revoke the presented one and issue a new pair.
    ///
    /// # Errors
    /// * `WrongCredentials` - Token unknown, bound to another client, revoked
    ///   or expired, or concurrently rotated by another request
    /// * `Unexpected` - Signing, entropy or persistence failed
    async fn refresh_tokens(&self, presented: PresentedRefreshToken)
        -> Result<TokenPair, AuthError>;

    /// Revoke the presented refresh token.
    ///
    /// # Errors
    /// * `WrongCredentials` - Token unknown, bound to another client or no
    ///   longer active
    /// * `Unexpected` - Persistence failed
    async fn logout_user(&self, presented: PresentedRefreshToken) -> Result<(), AuthError>;

    /// Sign an access token for a user and role.
    fn generate_access_token(&self, user_id: &UserId, role: UserRole)
        -> Result<String, AuthError>;

    /// Verify an access token and return its claims.
    ///
    /// # Errors
    /// * `InvalidToken` - Signature, algorithm or structure is invalid
    /// * `ExpiredToken` - Signature is valid but the token has expired
    fn token_claims(&self, token: &str) -> Result<AccessTokenClaims, AuthError>;
}

/// Durable storage of refresh token records.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Persist a newly issued refresh token.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn save_refresh_token(&self, record: &RefreshTokenRecord)
        -> Result<(), RepositoryError>;

    /// Look up a record by its hash, joined with the owner's role.
    ///
    /// # Returns
    /// Optional record (None if no row has this hash)
    ///
    /// # Errors
    /// * `CorruptRecord` - Stored row cannot be decoded
    /// * `DatabaseError` - Database operation failed
    async fn find_by_hash(
        &self,
        token_hash: &TokenHash,
    ) -> Result<Option<UserRoleAndRefreshToken>, RepositoryError>;

    /// Revoke the used token and insert its replacement as one atomic unit.
    ///
    /// Neither change is visible unless both succeed.
    ///
    /// # Errors
    /// * `NotActive` - Used token is missing or already revoked
    /// * `DatabaseError` - Database operation failed
    async fn revoke_and_insert(
        &self,
        used: &TokenHash,
        replacement: &RefreshTokenRecord,
    ) -> Result<(), RepositoryError>;

    /// Revoke a token.
    ///
    /// # Errors
    /// * `NotActive` - Token is missing or already revoked
    /// * `DatabaseError` - Database operation failed
    async fn revoke(&self, token_hash: &TokenHash) -> Result<(), RepositoryError>;
}
