//! PostgreSQL-backed credential store.

use async_trait::async_trait;

use memberhub_core::result::AppResult;
use memberhub_core::types::id::MemberId;
use memberhub_database::repositories::CredentialRepository;
use memberhub_entity::credential::CredentialRecord;

use super::store::CredentialStore;

#[async_trait]
impl CredentialStore for CredentialRepository {
    async fn load(&self, member_id: MemberId) -> AppResult<Option<CredentialRecord>> {
        self.find_by_member(member_id).await
    }

    async fn insert(
        &self,
        member_id: MemberId,
        password_hash: &str,
    ) -> AppResult<CredentialRecord> {
        CredentialRepository::insert(self, member_id, password_hash).await
    }

    async fn update_if_version(
        &self,
        member_id: MemberId,
        password_hash: &str,
        failed_attempts: i32,
        expected_version: i64,
    ) -> AppResult<Option<CredentialRecord>> {
        CredentialRepository::update_if_version(
            self,
            member_id,
            password_hash,
            failed_attempts,
            expected_version,
        )
        .await
    }
}
