//! Member lookup repository.

use sqlx::PgPool;

use memberhub_core::error::{AppError, ErrorKind};
use memberhub_core::result::AppResult;
use memberhub_core::types::id::MemberId;
use memberhub_entity::member::Member;

/// Read-only access to the `members` table.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Create a new member repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a member by ID.
    pub async fn find_by_id(&self, id: MemberId) -> AppResult<Option<Member>> {
        sqlx::query_as::<_, Member>(
            "SELECT id, profile_id, email, created_at FROM members WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find member", e))
    }
}
