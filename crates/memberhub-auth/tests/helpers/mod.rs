//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use memberhub_auth::{
    AuthDependencies, AuthService, CredentialService, CredentialStore, MemoryCredentialStore,
    MemoryMemberDirectory, PasswordHasher,
};
use memberhub_core::config::AuthConfig;
use memberhub_core::error::AppError;
use memberhub_core::result::AppResult;
use memberhub_core::traits::cache::CacheProvider;
use memberhub_core::types::id::{MemberId, ProfileId};
use memberhub_core::types::{Clock, ManualClock};
use memberhub_entity::credential::CredentialRecord;
use memberhub_entity::member::MemberProfile;

/// Secret every test member is provisioned with.
pub const SECRET: &str = "abcdefg123";

/// Shared signing key for test tokens.
pub const JWT_SECRET: &str = "integration-test-secret";

/// Cache whose entries expire against a [`ManualClock`].
///
/// Reads and writes yield to the scheduler first, so concurrent callers interleave
/// the way they would against a networked backend.
#[derive(Debug)]
pub struct ManualClockCache {
    clock: ManualClock,
    /// Key → (value, expiry in epoch millis).
    entries: DashMap<String, (String, i64)>,
    down: AtomicBool,
}

impl ManualClockCache {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            entries: DashMap::new(),
            down: AtomicBool::new(false),
        }
    }

    /// Simulates the backend becoming unreachable.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// Number of entries that have not yet expired.
    pub fn live_entries(&self) -> usize {
        let now = self.clock.now().timestamp_millis();
        self.entries.iter().filter(|e| e.value().1 > now).count()
    }

    fn check_up(&self) -> AppResult<()> {
        if self.down.load(Ordering::SeqCst) {
            return Err(AppError::cache("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheProvider for ManualClockCache {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        tokio::task::yield_now().await;
        self.check_up()?;
        let now = self.clock.now().timestamp_millis();
        Ok(self
            .entries
            .get(key)
            .filter(|e| e.value().1 > now)
            .map(|e| e.value().0.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()> {
        tokio::task::yield_now().await;
        self.check_up()?;
        let expires = self.clock.now().timestamp_millis() + ttl.as_millis() as i64;
        self.entries
            .insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> AppResult<bool> {
        tokio::task::yield_now().await;
        self.check_up()?;
        let now = self.clock.now().timestamp_millis();
        let fresh = (value.to_string(), now + ttl.as_millis() as i64);
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(slot) if slot.get().1 > now => Ok(false),
            Entry::Occupied(mut slot) => {
                slot.insert(fresh);
                Ok(true)
            }
            Entry::Vacant(slot) => {
                slot.insert(fresh);
                Ok(true)
            }
        }
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.check_up()?;
        self.entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        Ok(self.get(key).await?.is_some())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(!self.down.load(Ordering::SeqCst))
    }
}

/// Credential store that yields to the scheduler around every call, so
/// concurrent read-modify-write sequences interleave.
#[derive(Debug, Clone)]
pub struct YieldingCredentialStore {
    inner: MemoryCredentialStore,
}

impl YieldingCredentialStore {
    pub fn new(inner: MemoryCredentialStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CredentialStore for YieldingCredentialStore {
    async fn load(&self, member_id: MemberId) -> AppResult<Option<CredentialRecord>> {
        tokio::task::yield_now().await;
        let row = self.inner.load(member_id).await;
        tokio::task::yield_now().await;
        row
    }

    async fn insert(&self, member_id: MemberId, password_hash: &str) -> AppResult<CredentialRecord> {
        self.inner.insert(member_id, password_hash).await
    }

    async fn update_if_version(
        &self,
        member_id: MemberId,
        password_hash: &str,
        failed_attempts: i32,
        expected_version: i64,
    ) -> AppResult<Option<CredentialRecord>> {
        tokio::task::yield_now().await;
        self.inner
            .update_if_version(member_id, password_hash, failed_attempts, expected_version)
            .await
    }
}

/// Test application context
pub struct TestApp {
    pub auth: AuthService,
    pub clock: ManualClock,
    pub cache: Arc<ManualClockCache>,
    pub directory: MemoryMemberDirectory,
    pub credentials: MemoryCredentialStore,
    pub config: AuthConfig,
}

impl TestApp {
    /// Create a new test application with in-memory collaborators.
    pub fn new() -> Self {
        let config = AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
            ..AuthConfig::default()
        };
        Self::with_config(config)
    }

    pub fn with_config(config: AuthConfig) -> Self {
        let clock = ManualClock::starting_now();
        let cache = Arc::new(ManualClockCache::new(clock.clone()));
        let directory = MemoryMemberDirectory::new();
        let credentials = MemoryCredentialStore::new();

        let auth = AuthService::new(
            &config,
            AuthDependencies {
                credentials: Arc::new(credentials.clone()),
                directory: Arc::new(directory.clone()),
                cache: cache.clone(),
                clock: Arc::new(clock.clone()),
                hasher: PasswordHasher::with_cost(256, 1).expect("valid argon2 params"),
            },
        );

        Self {
            auth,
            clock,
            cache,
            directory,
            credentials,
            config,
        }
    }

    /// Registers a member with a profile and a provisioned credential.
    pub async fn create_member(&self, email: &str) -> MemberId {
        let member_id = MemberId::new();
        self.directory.insert(
            member_id,
            MemberProfile {
                profile_id: Some(ProfileId::new()),
                email: Some(email.to_string()),
            },
        );
        self.auth
            .provision_credential(member_id, SECRET)
            .await
            .expect("provision credential");
        member_id
    }

    /// A second credential service over the same rows, standing in for
    /// another node. It has its own lock table, so only the version check
    /// orders its writes against this app's.
    pub fn peer_credentials(&self) -> CredentialService {
        CredentialService::new(
            Arc::new(YieldingCredentialStore::new(self.credentials.clone())),
            PasswordHasher::with_cost(256, 1).expect("valid argon2 params"),
            &self.config,
        )
    }

    /// Moves simulated time forward.
    pub fn advance(&self, by: chrono::Duration) {
        self.clock.advance(by);
    }
}
