//! Credential operations, serialized per member.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use memberhub_core::config::AuthConfig;
use memberhub_core::error::AppError;
use memberhub_core::types::id::MemberId;
use memberhub_entity::credential::CredentialState;

use crate::error::AuthError;
use crate::password::{PasswordHasher, PasswordPolicy, PolicyViolation};

use super::lock::MemberLocks;
use super::state::MemberCredential;
use super::store::CredentialStore;

/// Result of checking a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerifyOutcome {
    /// The secret matched.
    Success,
    /// The secret did not match.
    Failure {
        /// Attempts left before lockout.
        remaining_attempts: u32,
    },
    /// The credential is locked; the secret was not checked.
    LockedOut,
}

/// Result of a secret change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ChangeOutcome {
    /// The new secret is in place.
    Success,
    /// The new secret was refused.
    PolicyViolation {
        /// Why it was refused.
        reason: PolicyViolation,
    },
    /// The old secret did not match.
    Failure {
        /// Attempts left before lockout.
        remaining_attempts: u32,
    },
    /// The credential is locked.
    LockedOut,
}

/// Read-only view of a credential, for operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    /// Active or locked.
    pub state: CredentialState,
    /// Consecutive failed verifications.
    pub failed_attempts: u32,
    /// Attempts left before lockout.
    pub remaining_attempts: u32,
}

/// Applies the credential state machine against a [`CredentialStore`].
///
/// Mutating calls for one member queue on a per-member lock, then read the
/// row and its version, run the transition in memory, and write back only if
/// the version is unchanged. A lost race can only come from another process
/// sharing the store; it is retried from a fresh read until the write lands.
#[derive(Debug, Clone)]
pub struct CredentialService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    policy: PasswordPolicy,
    lockout_threshold: u32,
    locks: MemberLocks,
}

impl CredentialService {
    /// Creates a service from the auth configuration.
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, config: &AuthConfig) -> Self {
        Self {
            store,
            hasher,
            policy: PasswordPolicy::new(config),
            lockout_threshold: config.max_failed_attempts,
            locks: MemberLocks::new(),
        }
    }

    /// The policy applied to new secrets.
    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Stores a fresh credential for a member who has none.
    pub async fn provision_credential(
        &self,
        member_id: MemberId,
        secret: &str,
    ) -> Result<(), AuthError> {
        let credential =
            MemberCredential::provision(secret, &self.policy, &self.hasher, self.lockout_threshold)?;
        self.store
            .insert(member_id, credential.password_hash())
            .await?;

        info!(member_id = %member_id, "Credential provisioned");
        Ok(())
    }

    /// Checks a secret, counting failures toward lockout.
    pub async fn verify_credential(
        &self,
        member_id: MemberId,
        secret: &str,
    ) -> Result<VerifyOutcome, AuthError> {
        let result = self
            .mutate(member_id, |credential| {
                let matched = credential.verify(secret, &self.hasher)?;
                Ok((matched, credential.remaining_attempts()))
            })
            .await;

        match result {
            Ok((true, _)) => Ok(VerifyOutcome::Success),
            Ok((false, remaining_attempts)) => Ok(VerifyOutcome::Failure { remaining_attempts }),
            Err(AuthError::LockedOut) => Ok(VerifyOutcome::LockedOut),
            Err(e) => Err(e),
        }
    }

    /// Replaces the secret after checking the current one.
    pub async fn change_credential(
        &self,
        member_id: MemberId,
        old: &str,
        new: &str,
    ) -> Result<ChangeOutcome, AuthError> {
        let result = self
            .mutate(member_id, |credential| {
                credential.change_secret(old, new, &self.policy, &self.hasher)
            })
            .await;

        match result {
            Ok(()) => {
                info!(member_id = %member_id, "Credential changed");
                Ok(ChangeOutcome::Success)
            }
            Err(AuthError::PolicyViolation(reason)) => Ok(ChangeOutcome::PolicyViolation { reason }),
            Err(AuthError::VerificationFailed { remaining_attempts }) => {
                Ok(ChangeOutcome::Failure { remaining_attempts })
            }
            Err(AuthError::LockedOut) => Ok(ChangeOutcome::LockedOut),
            Err(e) => Err(e),
        }
    }

    /// Replaces the secret without the old one and clears any lockout.
    ///
    /// The caller must have authenticated the reset out of band.
    pub async fn reset_credential(
        &self,
        member_id: MemberId,
        new_secret: &str,
    ) -> Result<(), AuthError> {
        self.mutate(member_id, |credential| {
            credential.reset_secret(new_secret, &self.policy, &self.hasher)
        })
        .await?;

        info!(member_id = %member_id, "Credential reset");
        Ok(())
    }

    /// Current lockout state of a member's credential.
    pub async fn credential_status(&self, member_id: MemberId) -> Result<CredentialStatus, AuthError> {
        let credential = self.load(member_id).await?.1;
        Ok(CredentialStatus {
            state: credential.state(),
            failed_attempts: credential.failed_attempts(),
            remaining_attempts: credential.remaining_attempts(),
        })
    }

    async fn load(&self, member_id: MemberId) -> Result<(i64, MemberCredential), AuthError> {
        let record = self
            .store
            .load(member_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No credential for member {member_id}")))?;
        Ok((
            record.version,
            MemberCredential::from_record(&record, self.lockout_threshold),
        ))
    }

    /// Runs `op` against a fresh copy of the credential and persists the result.
    ///
    /// The state is written even when `op` fails, so a wrong secret inside a
    /// failed change still counts toward lockout. A version conflict means
    /// another writer committed, so the loop always makes progress.
    async fn mutate<T, F>(&self, member_id: MemberId, op: F) -> Result<T, AuthError>
    where
        F: Fn(&mut MemberCredential) -> Result<T, AuthError> + Send + Sync,
        T: Send,
    {
        let _guard = self.locks.acquire(member_id).await;
        let mut attempt: u32 = 0;

        loop {
            let (version, mut credential) = self.load(member_id).await?;
            let before = credential.clone();
            let outcome = op(&mut credential);

            if credential == before {
                return outcome;
            }

            let failed_attempts = i32::try_from(credential.failed_attempts()).unwrap_or(i32::MAX);
            let written = self
                .store
                .update_if_version(member_id, credential.password_hash(), failed_attempts, version)
                .await?;

            if written.is_some() {
                if credential.is_locked() && !before.is_locked() {
                    warn!(
                        member_id = %member_id,
                        attempts = credential.failed_attempts(),
                        "Credential locked after repeated failures"
                    );
                }
                return outcome;
            }

            attempt += 1;
            debug!(member_id = %member_id, attempt, "Credential version conflict, retrying");
        }
    }
}
