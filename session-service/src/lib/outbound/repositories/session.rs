use async_trait::async_trait;
use auth::TokenHash;
use sqlx::postgres::PgRow;
use sqlx::PgConnection;
use sqlx::PgExecutor;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Row;
use sqlx::Transaction;

use crate::domain::auth::models::RefreshTokenRecord;
use crate::domain::auth::models::UserRoleAndRefreshToken;
use crate::domain::auth::ports::SessionStore;
use crate::domain::errors::RepositoryError;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserRole;

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

/// Refresh token storage in PostgreSQL.
///
/// Rows are keyed by the token hash. Rotation runs in a READ COMMITTED
/// transaction whose revoke only matches a row that is still active, so of
/// two concurrent rotations of the same token exactly one commits.
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_session(row: &PgRow) -> Result<UserRoleAndRefreshToken, RepositoryError> {
        let corrupt = |e: sqlx::Error| RepositoryError::CorruptRecord(e.to_string());

        let token_hash: Vec<u8> = row.try_get("token_hash").map_err(corrupt)?;
        let role: String = row.try_get("role").map_err(corrupt)?;

        let token = RefreshTokenRecord {
            token_hash: TokenHash::from_slice(&token_hash)
                .map_err(|e| RepositoryError::CorruptRecord(e.to_string()))?,
            fingerprint: row.try_get("fingerprint").map_err(corrupt)?,
            user_id: UserId(row.try_get("user_id").map_err(corrupt)?),
            user_agent: row.try_get("user_agent").map_err(corrupt)?,
            ip: row.try_get("ip_address").map_err(corrupt)?,
            created_at: row.try_get("created_at").map_err(corrupt)?,
            expires_at: row.try_get("expires_at").map_err(corrupt)?,
            revoked: row.try_get("revoked").map_err(corrupt)?,
        };

        Ok(UserRoleAndRefreshToken {
            role: role
                .parse::<UserRole>()
                .map_err(|e| RepositoryError::CorruptRecord(e.to_string()))?,
            token,
        })
    }

    async fn insert<'e, E>(executor: E, record: &RefreshTokenRecord) -> Result<(), RepositoryError>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens
                (token_hash, fingerprint, user_id, user_agent, ip_address, created_at, expires_at, revoked)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.token_hash.as_bytes())
        .bind(&record.fingerprint)
        .bind(record.user_id.0)
        .bind(&record.user_agent)
        .bind(&record.ip)
        .bind(record.created_at)
        .bind(record.expires_at)
        .bind(record.revoked)
        .execute(executor)
        .await
        .map_err(database_error)?;

        Ok(())
    }

    /// Revoke a row that is still active.
    ///
    /// # Errors
    /// * `NotActive` - No active row has this hash
    async fn revoke_active(
        conn: &mut PgConnection,
        token_hash: &TokenHash,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token_hash = $1 AND revoked = FALSE
            "#,
        )
        .bind(token_hash.as_bytes())
        .execute(conn)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotActive);
        }

        Ok(())
    }

    async fn begin(&self) -> Result<Transaction<'_, Postgres>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL READ COMMITTED")
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        Ok(tx)
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn save_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), RepositoryError> {
        Self::insert(&self.pool, record).await
    }

    async fn find_by_hash(
        &self,
        token_hash: &TokenHash,
    ) -> Result<Option<UserRoleAndRefreshToken>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT rt.token_hash, rt.fingerprint, rt.user_id, rt.user_agent, rt.ip_address,
                   rt.created_at, rt.expires_at, rt.revoked, u.role
            FROM refresh_tokens rt
            JOIN users u ON u.id = rt.user_id
            WHERE rt.token_hash = $1
            "#,
        )
        .bind(token_hash.as_bytes())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(Self::row_to_session).transpose()
    }

    async fn revoke_and_insert(
        &self,
        used: &TokenHash,
        replacement: &RefreshTokenRecord,
    ) -> Result<(), RepositoryError> {
        // Dropping the transaction without commit rolls it back.
        let mut tx = self.begin().await?;
        Self::revoke_active(&mut tx, used).await?;
        Self::insert(&mut *tx, replacement).await?;
        tx.commit().await.map_err(database_error)
    }

    async fn revoke(&self, token_hash: &TokenHash) -> Result<(), RepositoryError> {
        let mut tx = self.begin().await?;
        Self::revoke_active(&mut tx, token_hash).await?;
        tx.commit().await.map_err(database_error)
    }
}
