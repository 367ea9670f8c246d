//! Credential repository implementation.

use sqlx::PgPool;

use memberhub_core::error::{AppError, ErrorKind};
use memberhub_core::result::AppResult;
use memberhub_core::types::id::MemberId;
use memberhub_entity::credential::CredentialRecord;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Repository for the `member_credentials` table.
///
/// Every write is conditional on the row version so that concurrent
/// verification attempts against one member cannot lose updates.
#[derive(Debug, Clone)]
pub struct CredentialRepository {
    pool: PgPool,
}

impl CredentialRepository {
    /// Create a new credential repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the credential belonging to a member.
    pub async fn find_by_member(&self, member_id: MemberId) -> AppResult<Option<CredentialRecord>> {
        sqlx::query_as::<_, CredentialRecord>(
            "SELECT member_id, password_hash, failed_attempts, version, created_at, updated_at \
             FROM member_credentials WHERE member_id = $1",
        )
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to load credential", e))
    }

    /// Insert a freshly provisioned credential at version 0.
    ///
    /// Fails with a conflict if the member already has a credential.
    pub async fn insert(
        &self,
        member_id: MemberId,
        password_hash: &str,
    ) -> AppResult<CredentialRecord> {
        sqlx::query_as::<_, CredentialRecord>(
            "INSERT INTO member_credentials (member_id, password_hash, failed_attempts, version) \
             VALUES ($1, $2, 0, 0) \
             RETURNING member_id, password_hash, failed_attempts, version, created_at, updated_at",
        )
        .bind(member_id)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                AppError::conflict(format!("Member {member_id} already has a credential"))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to insert credential", e),
        })
    }

    /// Write new credential state if the stored version still equals
    /// `expected_version`.
    ///
    /// Returns the updated row, or `None` when another writer got there first.
    pub async fn update_if_version(
        &self,
        member_id: MemberId,
        password_hash: &str,
        failed_attempts: i32,
        expected_version: i64,
    ) -> AppResult<Option<CredentialRecord>> {
        sqlx::query_as::<_, CredentialRecord>(
            "UPDATE member_credentials \
             SET password_hash = $2, failed_attempts = $3, version = version + 1, updated_at = NOW() \
             WHERE member_id = $1 AND version = $4 \
             RETURNING member_id, password_hash, failed_attempts, version, created_at, updated_at",
        )
        .bind(member_id)
        .bind(password_hash)
        .bind(failed_attempts)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update credential", e))
    }
}
