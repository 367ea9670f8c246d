//! Persistence seam for member credentials.

use async_trait::async_trait;

use memberhub_core::result::AppResult;
use memberhub_core::types::id::MemberId;
use memberhub_entity::credential::CredentialRecord;

/// Storage for credential rows with optimistic concurrency.
///
/// Implementations must make `update_if_version` atomic per member: the write
/// applies only if the stored version still equals `expected_version`, and a
/// successful write bumps the version by one. Two implementations are provided:
/// - PostgreSQL (conditional `UPDATE ... WHERE version = $n`)
/// - In-memory (`DashMap` entry lock)
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load a member's credential row.
    async fn load(&self, member_id: MemberId) -> AppResult<Option<CredentialRecord>>;

    /// Insert a new credential at version 0; conflicts if one exists.
    async fn insert(&self, member_id: MemberId, password_hash: &str)
    -> AppResult<CredentialRecord>;

    /// Compare-and-set write. `Ok(None)` means the version moved on.
    async fn update_if_version(
        &self,
        member_id: MemberId,
        password_hash: &str,
        failed_attempts: i32,
        expected_version: i64,
    ) -> AppResult<Option<CredentialRecord>>;
}
