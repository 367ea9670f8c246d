//! Authentication outcome taxonomy.
//!
//! Every failure the credential authority can produce is a distinct variant,
//! so calling layers map outcomes to responses without inspecting messages.

use thiserror::Error;

use memberhub_core::error::AppError;

use crate::password::PolicyViolation;

/// Why a presented token was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenRejection {
    /// The token is not a structurally valid JWT.
    #[error("token is malformed")]
    Malformed,
    /// The signature does not match the claims under the shared key.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// The token is past its expiry (including the clock-skew grace window).
    #[error("token has expired")]
    Expired,
    /// The token was explicitly revoked before its natural expiry.
    #[error("token has been revoked")]
    Revoked,
    /// An access token was presented where a refresh token is required, or vice versa.
    #[error("unexpected token type")]
    WrongTokenType,
    /// The token was issued to a different member than the one presenting it.
    #[error("token belongs to another member")]
    SubjectMismatch,
}

/// Errors surfaced by the credential and session authority.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The candidate secret does not satisfy the password policy.
    #[error("password policy violation: {0}")]
    PolicyViolation(#[from] PolicyViolation),
    /// The secret did not match; the caller may retry.
    #[error("credential verification failed ({remaining_attempts} attempts remaining)")]
    VerificationFailed {
        /// Attempts left before the credential locks.
        remaining_attempts: u32,
    },
    /// Too many consecutive failures; only an explicit reset unlocks.
    #[error("too many failed attempts; credential is locked")]
    LockedOut,
    /// The token was rejected.
    #[error("token rejected: {0}")]
    Rejected(#[from] TokenRejection),
    /// The revocation store could not be consulted; the token was not trusted.
    #[error("revocation store unavailable: {0}")]
    StoreUnavailable(String),
    /// Infrastructure or lookup failure.
    #[error(transparent)]
    App(#[from] AppError),
}

impl AuthError {
    /// Whether the same request may succeed if retried later unchanged.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::StoreUnavailable(_) => true,
            Self::App(e) => e.kind.is_transient(),
            _ => false,
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::PolicyViolation(v) => AppError::validation(v.to_string()),
            AuthError::VerificationFailed { .. } => {
                AppError::authentication("Invalid member credentials")
            }
            AuthError::LockedOut => {
                AppError::locked("Too many failed attempts. Reset your password to continue.")
            }
            AuthError::Rejected(r) => AppError::authentication(r.to_string()),
            AuthError::StoreUnavailable(msg) => AppError::service_unavailable(format!(
                "Unable to validate token right now: {msg}"
            )),
            AuthError::App(e) => e,
        }
    }
}
