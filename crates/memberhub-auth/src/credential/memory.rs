//! In-memory credential store for single-node deployments and tests.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use memberhub_core::error::AppError;
use memberhub_core::result::AppResult;
use memberhub_core::types::id::MemberId;
use memberhub_entity::credential::CredentialRecord;

use super::store::CredentialStore;

/// Credential rows held in a sharded concurrent map.
///
/// Each compare-and-set holds only the shard lock of the member being
/// written, so different members never contend.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    rows: Arc<DashMap<MemberId, CredentialRecord>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self, member_id: MemberId) -> AppResult<Option<CredentialRecord>> {
        Ok(self.rows.get(&member_id).map(|row| row.value().clone()))
    }

    async fn insert(
        &self,
        member_id: MemberId,
        password_hash: &str,
    ) -> AppResult<CredentialRecord> {
        match self.rows.entry(member_id) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Member {member_id} already has a credential"
            ))),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let record = CredentialRecord {
                    member_id,
                    password_hash: password_hash.to_string(),
                    failed_attempts: 0,
                    version: 0,
                    created_at: now,
                    updated_at: now,
                };
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn update_if_version(
        &self,
        member_id: MemberId,
        password_hash: &str,
        failed_attempts: i32,
        expected_version: i64,
    ) -> AppResult<Option<CredentialRecord>> {
        let Some(mut row) = self.rows.get_mut(&member_id) else {
            return Err(AppError::not_found(format!(
                "No credential for member {member_id}"
            )));
        };

        if row.version != expected_version {
            return Ok(None);
        }

        row.password_hash = password_hash.to_string();
        row.failed_attempts = failed_attempts;
        row.version += 1;
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_twice_conflicts() {
        let store = MemoryCredentialStore::new();
        let id = MemberId::new();
        store.insert(id, "h1").await.unwrap();
        let err = store.insert(id, "h2").await.unwrap_err();
        assert_eq!(err.kind, memberhub_core::error::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_stale_version_is_not_written() {
        let store = MemoryCredentialStore::new();
        let id = MemberId::new();
        store.insert(id, "h1").await.unwrap();

        let first = store.update_if_version(id, "h1", 1, 0).await.unwrap();
        assert_eq!(first.map(|r| r.version), Some(1));

        let stale = store.update_if_version(id, "h1", 1, 0).await.unwrap();
        assert!(stale.is_none());

        let row = store.load(id).await.unwrap().unwrap();
        assert_eq!(row.failed_attempts, 1);
        assert_eq!(row.version, 1);
    }

    #[tokio::test]
    async fn test_update_missing_member_is_not_found() {
        let store = MemoryCredentialStore::new();
        let err = store
            .update_if_version(MemberId::new(), "h", 0, 0)
            .await
            .unwrap_err();
        assert_eq!(err.kind, memberhub_core::error::ErrorKind::NotFound);
    }
}
