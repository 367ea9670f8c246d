//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use memberhub_core::config::AuthConfig;
use memberhub_core::config::auth::{MAX_ACCESS_TTL_MINUTES, MAX_REFRESH_TTL_HOURS};
use memberhub_core::error::AppError;
use memberhub_core::types::id::{MemberId, TokenId};

use super::claims::{AuxiliaryClaims, Claims, TokenType};

/// Creates signed HS256 access and refresh tokens.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Access token TTL.
    access_ttl: Duration,
    /// Refresh token TTL.
    refresh_ttl: Duration,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    ///
    /// TTLs beyond the configured maximums are clamped to them.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: bounded_ttl(
                config.jwt_access_ttl_minutes,
                MAX_ACCESS_TTL_MINUTES,
                Duration::try_minutes,
            ),
            refresh_ttl: bounded_ttl(
                config.jwt_refresh_ttl_hours,
                MAX_REFRESH_TTL_HOURS,
                Duration::try_hours,
            ),
        }
    }

    /// Lifetime of a token of the given kind.
    pub fn ttl(&self, kind: TokenType) -> Duration {
        match kind {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        }
    }

    /// Signs a fresh token issued at `now`.
    pub fn encode(
        &self,
        subject: MemberId,
        aux: AuxiliaryClaims,
        kind: TokenType,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims), AppError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: subject,
            aux,
            iat,
            exp: iat.saturating_add(self.ttl(kind).num_seconds()),
            jti: TokenId::new(),
            token_type: kind,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode {kind} token: {e}")))?;

        Ok((token, claims))
    }
}

fn bounded_ttl(value: u64, max: u64, unit: fn(i64) -> Option<Duration>) -> Duration {
    i64::try_from(value.min(max))
        .ok()
        .and_then(unit)
        .unwrap_or_else(Duration::zero)
}
