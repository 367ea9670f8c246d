//! Authentication configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Placeholder secret shipped in the default configuration.
pub const DEFAULT_JWT_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Longest accepted access token lifetime (one week).
pub const MAX_ACCESS_TTL_MINUTES: u64 = 7 * 24 * 60;

/// Longest accepted refresh token lifetime (one year).
pub const MAX_REFRESH_TTL_HOURS: u64 = 366 * 24;

/// Credential lockout and token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub jwt_access_ttl_minutes: u64,
    /// Refresh token TTL in hours.
    #[serde(default = "default_refresh_ttl")]
    pub jwt_refresh_ttl_hours: u64,
    /// Minimum password length (inclusive).
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
    /// Maximum password length (inclusive).
    #[serde(default = "default_password_max")]
    pub password_max_length: usize,
    /// Consecutive failed verifications that lock a credential.
    #[serde(default = "default_max_failed")]
    pub max_failed_attempts: u32,
    /// Grace window applied to `exp` checks for issuer/validator clock skew.
    #[serde(default = "default_leeway")]
    pub clock_skew_leeway_seconds: u64,
    /// Upper bound on a single revocation store round-trip.
    #[serde(default = "default_revocation_timeout")]
    pub revocation_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            jwt_access_ttl_minutes: default_access_ttl(),
            jwt_refresh_ttl_hours: default_refresh_ttl(),
            password_min_length: default_password_min(),
            password_max_length: default_password_max(),
            max_failed_attempts: default_max_failed(),
            clock_skew_leeway_seconds: default_leeway(),
            revocation_timeout_ms: default_revocation_timeout(),
        }
    }
}

impl AuthConfig {
    /// Rejects combinations that can never produce a usable authority.
    pub fn check(&self) -> Result<(), AppError> {
        if self.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }
        if self.password_min_length == 0 || self.password_min_length > self.password_max_length {
            return Err(AppError::configuration(format!(
                "auth.password_min_length ({}) must be between 1 and password_max_length ({})",
                self.password_min_length, self.password_max_length
            )));
        }
        if self.max_failed_attempts == 0 {
            return Err(AppError::configuration(
                "auth.max_failed_attempts must be at least 1",
            ));
        }
        if self.jwt_access_ttl_minutes == 0 || self.jwt_refresh_ttl_hours == 0 {
            return Err(AppError::configuration("auth token TTLs must be positive"));
        }
        if self.jwt_access_ttl_minutes > MAX_ACCESS_TTL_MINUTES {
            return Err(AppError::configuration(format!(
                "auth.jwt_access_ttl_minutes ({}) must not exceed {MAX_ACCESS_TTL_MINUTES}",
                self.jwt_access_ttl_minutes
            )));
        }
        if self.jwt_refresh_ttl_hours > MAX_REFRESH_TTL_HOURS {
            return Err(AppError::configuration(format!(
                "auth.jwt_refresh_ttl_hours ({}) must not exceed {MAX_REFRESH_TTL_HOURS}",
                self.jwt_refresh_ttl_hours
            )));
        }
        if self.jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("auth.jwt_secret is the shipped placeholder; set a real secret");
        }
        Ok(())
    }
}

fn default_jwt_secret() -> String {
    DEFAULT_JWT_SECRET.to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_refresh_ttl() -> u64 {
    14 * 24
}

fn default_password_min() -> usize {
    8
}

fn default_password_max() -> usize {
    20
}

fn default_max_failed() -> u32 {
    5
}

fn default_leeway() -> u64 {
    5
}

fn default_revocation_timeout() -> u64 {
    500
}
