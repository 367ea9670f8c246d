//! Per-member credential with failed-attempt lockout.
//!
//! ```text
//!            mismatch (count+1 < threshold)
//!              ┌────────┐
//!              ▼        │
//!   ──────► Active ─────┘
//!            │   ▲
//!  mismatch  │   │ reset_secret
//!  (count+1  ▼   │
//!  = thr.)  Locked ──► verify: LockedOut, no state change
//! ```
//!
//! Wrong secrets are soft failures (`Ok(false)`) until the counter reaches
//! the threshold; every verification after that is refused with
//! [`AuthError::LockedOut`] without touching the hash.

use memberhub_entity::credential::{CredentialRecord, CredentialState};

use crate::error::AuthError;
use crate::password::{PasswordHasher, PasswordPolicy, PolicyViolation};

/// The hashed secret and attempt counter of one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberCredential {
    /// Argon2id PHC string of the current secret.
    password_hash: String,
    /// Consecutive failed verifications since the last success.
    failed_attempts: u32,
    /// Failed verifications that lock the credential.
    lockout_threshold: u32,
}

impl MemberCredential {
    /// Provisions a credential for a new member.
    ///
    /// The secret is checked against `policy` before it is hashed.
    pub fn provision(
        secret: &str,
        policy: &PasswordPolicy,
        hasher: &PasswordHasher,
        lockout_threshold: u32,
    ) -> Result<Self, AuthError> {
        policy.validate(secret)?;
        Ok(Self {
            password_hash: hasher.hash_password(secret)?,
            failed_attempts: 0,
            lockout_threshold,
        })
    }

    /// Rebuilds the state machine from a persisted row.
    pub fn from_record(record: &CredentialRecord, lockout_threshold: u32) -> Self {
        Self {
            password_hash: record.password_hash.clone(),
            failed_attempts: u32::try_from(record.failed_attempts).unwrap_or(0),
            lockout_threshold,
        }
    }

    /// Current hash, for persistence.
    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    /// Consecutive failed verifications.
    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Attempts left before lockout.
    pub fn remaining_attempts(&self) -> u32 {
        self.lockout_threshold.saturating_sub(self.failed_attempts)
    }

    /// Lockout state derived from the counter.
    pub fn state(&self) -> CredentialState {
        CredentialState::from_attempts(self.failed_attempts, self.lockout_threshold)
    }

    /// Whether further verification is refused.
    pub fn is_locked(&self) -> bool {
        self.state() == CredentialState::Locked
    }

    /// Checks `candidate` against the stored hash.
    ///
    /// - `Ok(true)`: match; the counter is reset.
    /// - `Ok(false)`: mismatch; the counter is incremented.
    /// - `Err(LockedOut)`: already locked; nothing is hashed or counted.
    pub fn verify(&mut self, candidate: &str, hasher: &PasswordHasher) -> Result<bool, AuthError> {
        if self.is_locked() {
            return Err(AuthError::LockedOut);
        }

        if hasher.verify_password(candidate, &self.password_hash)? {
            self.failed_attempts = 0;
            Ok(true)
        } else {
            self.failed_attempts = self.failed_attempts.saturating_add(1);
            Ok(false)
        }
    }

    /// Replaces the secret after proving knowledge of the current one.
    ///
    /// Nothing but the attempt counter changes unless every check passes.
    pub fn change_secret(
        &mut self,
        old: &str,
        new: &str,
        policy: &PasswordPolicy,
        hasher: &PasswordHasher,
    ) -> Result<(), AuthError> {
        if !self.verify(old, hasher)? {
            return Err(AuthError::VerificationFailed {
                remaining_attempts: self.remaining_attempts(),
            });
        }

        policy.validate(new)?;

        if hasher.verify_password(new, &self.password_hash)? {
            return Err(PolicyViolation::SameAsCurrent.into());
        }

        self.password_hash = hasher.hash_password(new)?;
        self.failed_attempts = 0;
        Ok(())
    }

    /// Replaces the secret without the current one and clears any lockout.
    ///
    /// This is the out-of-band recovery path (e.g. a password-reset link);
    /// callers are responsible for authenticating the reset request.
    pub fn reset_secret(
        &mut self,
        new: &str,
        policy: &PasswordPolicy,
        hasher: &PasswordHasher,
    ) -> Result<(), AuthError> {
        policy.validate(new)?;
        self.password_hash = hasher.hash_password(new)?;
        self.failed_attempts = 0;
        Ok(())
    }
}
