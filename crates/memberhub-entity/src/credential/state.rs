//! Credential lockout state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lockout state of a credential, derived from its failed-attempt counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialState {
    /// Verification attempts are evaluated normally.
    Active,
    /// Verification attempts are refused until the credential is reset.
    Locked,
}

impl CredentialState {
    /// Derives the state from a failed-attempt count and the lockout threshold.
    pub fn from_attempts(failed_attempts: u32, threshold: u32) -> Self {
        if failed_attempts >= threshold {
            Self::Locked
        } else {
            Self::Active
        }
    }

    /// Return the state as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Locked => "locked",
        }
    }
}

impl fmt::Display for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_boundary() {
        assert_eq!(CredentialState::from_attempts(4, 5), CredentialState::Active);
        assert_eq!(CredentialState::from_attempts(5, 5), CredentialState::Locked);
        assert_eq!(CredentialState::from_attempts(9, 5), CredentialState::Locked);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&CredentialState::Locked).unwrap();
        assert_eq!(json, "\"locked\"");
    }
}
