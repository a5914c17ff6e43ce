use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AccessTokenClaims;
use auth::AccessTokenCodec;
use auth::ClientContext;
use auth::PresentedRefreshToken;
use auth::RefreshToken;
use auth::RefreshTokenFactory;
use auth::TokenError;
use auth::TokenHash;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::AuthErrorKind;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::RefreshTokenRecord;
use crate::domain::auth::models::TokenPair;
use crate::domain::auth::models::UserRoleAndRefreshToken;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::SessionStore;
use crate::domain::errors::RepositoryError;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRole;
use crate::domain::user::ports::PasswordService;
use crate::domain::user::ports::UserRepository;

/// Domain service implementing login, refresh token rotation and logout.
///
/// Every operation is bounded by the configured timeout. Refresh tokens are
/// single use: a successful rotation revokes the presented token in the same
/// transaction that stores its replacement, so presenting it again fails.
pub struct AuthService<UR, SS, PS>
where
    UR: UserRepository,
    SS: SessionStore,
    PS: PasswordService,
{
    user_repository: Arc<UR>,
    session_store: Arc<SS>,
    password_service: Arc<PS>,
    access_tokens: Arc<AccessTokenCodec>,
    refresh_tokens: Arc<RefreshTokenFactory>,
    operation_timeout: Duration,
}

impl<UR, SS, PS> AuthService<UR, SS, PS>
where
    UR: UserRepository,
    SS: SessionStore,
    PS: PasswordService,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `user_repository` - User lookup and creation
    /// * `session_store` - Refresh token persistence
    /// * `password_service` - Password hashing and verification
    /// * `access_tokens` - Access token signer and verifier
    /// * `refresh_tokens` - Refresh token generator
    /// * `operation_timeout` - Upper bound for each operation
    ///
    /// # Returns
    /// Configured authentication service instance
    pub fn new(
        user_repository: Arc<UR>,
        session_store: Arc<SS>,
        password_service: Arc<PS>,
        access_tokens: Arc<AccessTokenCodec>,
        refresh_tokens: Arc<RefreshTokenFactory>,
        operation_timeout: Duration,
    ) -> Self {
        Self {
            user_repository,
            session_store,
            password_service,
            access_tokens,
            refresh_tokens,
            operation_timeout,
        }
    }

    /// Run an operation under the service timeout.
    ///
    /// On elapse the operation future is dropped, which aborts any store call
    /// in flight and rolls back its open transaction.
    async fn bounded<T, F>(&self, op: &'static str, operation: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, AuthError>>,
    {
        match tokio::time::timeout(self.operation_timeout, operation).await {
            Ok(result) => result,
            Err(elapsed) => {
                tracing::warn!(op, timeout = ?self.operation_timeout, "Operation timed out");
                Err(AuthError::wrap(op, AuthErrorKind::Unexpected, elapsed))
            }
        }
    }

    fn issue_access_token(
        &self,
        op: &'static str,
        user_id: &UserId,
        role: UserRole,
    ) -> Result<String, AuthError> {
        self.access_tokens
            .generate_access_token(&user_id.to_string(), role.as_str())
            .map_err(|e| AuthError::wrap(op, AuthErrorKind::Unexpected, e))
    }

    fn issue_refresh_token(
        &self,
        op: &'static str,
        user_id: UserId,
        client: ClientContext,
    ) -> Result<(RefreshToken, RefreshTokenRecord), AuthError> {
        let token = self
            .refresh_tokens
            .generate(user_id, client)
            .map_err(|e| AuthError::wrap(op, AuthErrorKind::Unexpected, e))?;

        let record = RefreshTokenRecord::issued(
            &token,
            self.refresh_tokens.hash(&token.token),
            self.refresh_tokens.fingerprint_of(&token),
            user_id,
        );

        Ok((token, record))
    }

    /// Resolve a presented refresh token to its active stored record.
    ///
    /// Lookup is by hash; the fingerprint is recomputed from the presented
    /// value and the presenting client and compared in constant time.
    async fn active_session(
        &self,
        op: &'static str,
        presented: &PresentedRefreshToken,
    ) -> Result<(TokenHash, UserRoleAndRefreshToken), AuthError> {
        let token_hash = self.refresh_tokens.hash(&presented.token);

        let session = self
            .session_store
            .find_by_hash(&token_hash)
            .await
            .map_err(|e| AuthError::wrap(op, AuthErrorKind::Unexpected, e))?
            .ok_or_else(|| {
                tracing::debug!(op, token_hash = ?token_hash, "Refresh token not found");
                AuthError::new(op, AuthErrorKind::WrongCredentials)
            })?;

        let fingerprint = self
            .refresh_tokens
            .fingerprint(&presented.token, &presented.client);
        if !RefreshTokenFactory::fingerprints_match(&fingerprint, &session.token.fingerprint) {
            tracing::debug!(
                op,
                user_id = %session.token.user_id,
                "Refresh token presented by a different client"
            );
            return Err(AuthError::new(op, AuthErrorKind::WrongCredentials));
        }

        if !session.token.is_active(Utc::now()) {
            tracing::debug!(
                op,
                user_id = %session.token.user_id,
                revoked = session.token.revoked,
                "Refresh token no longer active"
            );
            return Err(AuthError::new(op, AuthErrorKind::WrongCredentials));
        }

        Ok((token_hash, session))
    }
}

/// Revocation races and missing rows mean the caller's token is spent.
fn revocation_error(op: &'static str, err: RepositoryError) -> AuthError {
    let kind = match err {
        RepositoryError::NotActive => AuthErrorKind::WrongCredentials,
        _ => AuthErrorKind::Unexpected,
    };
    AuthError::wrap(op, kind, err)
}

#[async_trait]
impl<UR, SS, PS> AuthServicePort for AuthService<UR, SS, PS>
where
    UR: UserRepository,
    SS: SessionStore,
    PS: PasswordService,
{
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, AuthError> {
        const OP: &str = "service.register_user";

        self.bounded(OP, async move {
            let password_hash = self
                .password_service
                .hash(&command.password)
                .map_err(|e| AuthError::wrap(OP, AuthErrorKind::Unexpected, e))?;

            let user = User {
                id: UserId::new(),
                email: command.email,
                password_hash,
                role: command.role,
                created_at: Utc::now(),
            };

            let created = self.user_repository.create(user).await.map_err(|e| {
                let kind = match e {
                    RepositoryError::Conflict(_) => AuthErrorKind::EmailAlreadyExists,
                    _ => AuthErrorKind::Unexpected,
                };
                AuthError::wrap(OP, kind, e)
            })?;

            tracing::info!(user_id = %created.id, role = %created.role, "User registered");
            Ok(created)
        })
        .await
    }

    async fn login_user(&self, command: LoginCommand) -> Result<TokenPair, AuthError> {
        const OP: &str = "service.login_user";

        self.bounded(OP, async move {
            let found = self
                .user_repository
                .find_by_email(&command.email)
                .await
                .map_err(|e| AuthError::wrap(OP, AuthErrorKind::Unexpected, e))?;

            let Some(user) = found else {
                // Same hashing cost as a real comparison, so timing does not
                // reveal whether the email is registered.
                let _ = self.password_service.hash(&command.password);
                tracing::debug!("Login attempt for unknown email");
                return Err(AuthError::new(OP, AuthErrorKind::WrongCredentials));
            };

            let matches = self
                .password_service
                .compare(&user.password_hash, &command.password)
                .map_err(|e| AuthError::wrap(OP, AuthErrorKind::WrongCredentials, e))?;
            if !matches {
                tracing::debug!(user_id = %user.id, "Login attempt with wrong password");
                return Err(AuthError::new(OP, AuthErrorKind::WrongCredentials));
            }

            let access_token = self.issue_access_token(OP, &user.id, user.role)?;
            let (refresh_token, record) = self.issue_refresh_token(OP, user.id, command.client)?;

            self.session_store
                .save_refresh_token(&record)
                .await
                .map_err(|e| AuthError::wrap(OP, AuthErrorKind::Unexpected, e))?;

            tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

            Ok(TokenPair {
                access_token,
                refresh_token,
            })
        })
        .await
    }

    async fn refresh_tokens(
        &self,
        presented: PresentedRefreshToken,
    ) -> Result<TokenPair, AuthError> {
        const OP: &str = "service.refresh_tokens";

        self.bounded(OP, async move {
            let (used, session) = self.active_session(OP, &presented).await?;
            let UserRoleAndRefreshToken { role, token: stored } = session;

            let access_token = self.issue_access_token(OP, &stored.user_id, role)?;
            let (refresh_token, replacement) =
                self.issue_refresh_token(OP, stored.user_id, stored.client())?;

            self.session_store
                .revoke_and_insert(&used, &replacement)
                .await
                .map_err(|e| revocation_error(OP, e))?;

            tracing::info!(user_id = %stored.user_id, "Refresh token rotated");

            Ok(TokenPair {
                access_token,
                refresh_token,
            })
        })
        .await
    }

    async fn logout_user(&self, presented: PresentedRefreshToken) -> Result<(), AuthError> {
        const OP: &str = "service.logout_user";

        self.bounded(OP, async move {
            let (token_hash, session) = self.active_session(OP, &presented).await?;

            self.session_store
                .revoke(&token_hash)
                .await
                .map_err(|e| revocation_error(OP, e))?;

            tracing::info!(user_id = %session.token.user_id, "Refresh token revoked");
            Ok(())
        })
        .await
    }

    fn generate_access_token(
        &self,
        user_id: &UserId,
        role: UserRole,
    ) -> Result<String, AuthError> {
        self.issue_access_token("service.generate_access_token", user_id, role)
    }

    fn token_claims(&self, token: &str) -> Result<AccessTokenClaims, AuthError> {
        const OP: &str = "service.token_claims";

        self.access_tokens.token_claims(token).map_err(|e| {
            let kind = match e {
                TokenError::Expired => AuthErrorKind::ExpiredToken,
                TokenError::Invalid(_) => AuthErrorKind::InvalidToken,
                _ => AuthErrorKind::Unexpected,
            };
            AuthError::wrap(OP, kind, e)
        })
    }
}
