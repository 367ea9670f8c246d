//! Member profile lookup for auxiliary token claims.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use memberhub_core::result::AppResult;
use memberhub_core::types::id::MemberId;
use memberhub_database::repositories::MemberRepository;
use memberhub_entity::member::MemberProfile;

/// Resolves the attributes embedded in a member's tokens.
#[async_trait]
pub trait MemberDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Profile id and email of a member, or `None` if the member is unknown.
    async fn find_profile(&self, member_id: MemberId) -> AppResult<Option<MemberProfile>>;
}

#[async_trait]
impl MemberDirectory for MemberRepository {
    async fn find_profile(&self, member_id: MemberId) -> AppResult<Option<MemberProfile>> {
        Ok(self.find_by_id(member_id).await?.map(|m| m.profile()))
    }
}

/// Directory held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryMemberDirectory {
    profiles: Arc<DashMap<MemberId, MemberProfile>>,
}

impl MemoryMemberDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a member's profile.
    pub fn insert(&self, member_id: MemberId, profile: MemberProfile) {
        self.profiles.insert(member_id, profile);
    }
}

#[async_trait]
impl MemberDirectory for MemoryMemberDirectory {
    async fn find_profile(&self, member_id: MemberId) -> AppResult<Option<MemberProfile>> {
        Ok(self.profiles.get(&member_id).map(|p| p.value().clone()))
    }
}
