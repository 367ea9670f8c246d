//! Persisted credential row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use memberhub_core::types::id::MemberId;

/// The stored form of a member's credential.
///
/// `version` increases by one on every write and is the optimistic
/// concurrency token: an update only applies if the row still carries the
/// version that was read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CredentialRecord {
    /// Owning member.
    pub member_id: MemberId,
    /// Argon2id PHC string.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Consecutive failed verifications since the last success.
    pub failed_attempts: i32,
    /// Row version for optimistic concurrency.
    pub version: i64,
    /// When the credential was provisioned.
    pub created_at: DateTime<Utc>,
    /// When the credential was last written.
    pub updated_at: DateTime<Utc>,
}
