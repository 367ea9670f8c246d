//! Password policy enforcement for new secrets.

use serde::Serialize;
use thiserror::Error;

use memberhub_core::config::AuthConfig;

/// The first rule a candidate secret broke.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PolicyViolation {
    /// Fewer characters than the minimum.
    #[error("password must be at least {min} characters long")]
    TooShort {
        /// Minimum length, inclusive.
        min: usize,
    },
    /// More characters than the maximum.
    #[error("password must be at most {max} characters long")]
    TooLong {
        /// Maximum length, inclusive.
        max: usize,
    },
    /// Contains any whitespace character.
    #[error("password must not contain whitespace")]
    ContainsWhitespace,
    /// No ASCII letter.
    #[error("password must contain at least one latin letter")]
    MissingLetter,
    /// No ASCII digit.
    #[error("password must contain at least one digit")]
    MissingDigit,
    /// The new password equals the current one.
    #[error("new password must be different from the current password")]
    SameAsCurrent,
}

/// Validates candidate secrets against the length and composition rules.
///
/// Stateless; applied to the *new* secret whenever one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in characters, inclusive.
    min_length: usize,
    /// Maximum length in characters, inclusive.
    max_length: usize,
}

impl PasswordPolicy {
    /// Creates a policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            max_length: config.password_max_length,
        }
    }

    /// Validates a candidate secret.
    ///
    /// Length is counted in characters, not bytes. Letters outside the
    /// Latin alphabet do not satisfy the letter rule.
    pub fn validate(&self, candidate: &str) -> Result<(), PolicyViolation> {
        let length = candidate.chars().count();
        if length < self.min_length {
            return Err(PolicyViolation::TooShort {
                min: self.min_length,
            });
        }
        if length > self.max_length {
            return Err(PolicyViolation::TooLong {
                max: self.max_length,
            });
        }

        if candidate.chars().any(char::is_whitespace) {
            return Err(PolicyViolation::ContainsWhitespace);
        }

        if !candidate.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(PolicyViolation::MissingLetter);
        }

        if !candidate.chars().any(|c| c.is_ascii_digit()) {
            return Err(PolicyViolation::MissingDigit);
        }

        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(&AuthConfig::default())
    }
}
