//! Token issuance and validation against the revocation list.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use memberhub_core::config::AuthConfig;
use memberhub_core::types::Clock;
use memberhub_core::types::id::MemberId;

use crate::error::{AuthError, TokenRejection};
use crate::revocation::RevocationStore;

use super::claims::{AuxiliaryClaims, Claims, TokenType};
use super::decoder::JwtDecoder;
use super::encoder::JwtEncoder;

/// Scheme prefix accepted in front of a presented token.
const BEARER_PREFIX: &str = "Bearer ";

/// Result of a successful token pair generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived access token.
    pub access_token: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub access_ttl_seconds: i64,
    /// Access token expiration timestamp.
    pub access_expires_at: DateTime<Utc>,
    /// Refresh token expiration timestamp.
    pub refresh_expires_at: DateTime<Utc>,
}

/// Issues tokens and decides whether a presented token can be trusted.
///
/// Validation order is fixed: revocation lookup, then signature, then
/// expiry. A token whose revocation status cannot be determined is never
/// accepted.
#[derive(Debug, Clone)]
pub struct TokenAuthority {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    revocations: RevocationStore,
    clock: Arc<dyn Clock>,
    /// Grace window past `exp`, in seconds.
    leeway: i64,
}

impl TokenAuthority {
    /// Creates an authority from auth configuration.
    pub fn new(config: &AuthConfig, revocations: RevocationStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoder: JwtEncoder::new(config),
            decoder: JwtDecoder::new(config),
            revocations,
            clock,
            leeway: i64::try_from(config.clock_skew_leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    /// The revocation list this authority consults.
    pub fn revocations(&self) -> &RevocationStore {
        &self.revocations
    }

    /// Signs a single token. Never touches the revocation list.
    pub fn issue(
        &self,
        subject: MemberId,
        aux: AuxiliaryClaims,
        kind: TokenType,
    ) -> Result<String, AuthError> {
        let (token, _) = self.encoder.encode(subject, aux, kind, self.clock.now())?;
        Ok(token)
    }

    /// Signs an access token and a refresh token issued at the same instant.
    pub fn issue_token_pair(
        &self,
        subject: MemberId,
        aux: AuxiliaryClaims,
    ) -> Result<TokenPair, AuthError> {
        let now = self.clock.now();
        let (access_token, access) =
            self.encoder.encode(subject, aux.clone(), TokenType::Access, now)?;
        let (refresh_token, refresh) = self.encoder.encode(subject, aux, TokenType::Refresh, now)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_ttl_seconds: access.exp - access.iat,
            access_expires_at: access.expires_at().unwrap_or(now),
            refresh_expires_at: refresh.expires_at().unwrap_or(now),
        })
    }

    /// Returns the claims of an authentic token that is neither revoked nor expired.
    pub async fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let token = strip_bearer(token);

        if self.revocations.contains(token).await? {
            return Err(TokenRejection::Revoked.into());
        }

        let claims = self.decoder.decode(token)?;

        if claims.seconds_remaining(self.clock.timestamp(), self.leeway) <= 0 {
            return Err(TokenRejection::Expired.into());
        }

        Ok(claims)
    }

    /// [`validate`](Self::validate), additionally requiring an access token.
    pub async fn validate_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_kind(token, TokenType::Access).await
    }

    /// [`validate`](Self::validate), additionally requiring a refresh token.
    pub async fn validate_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.validate_kind(token, TokenType::Refresh).await
    }

    async fn validate_kind(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self.validate(token).await?;
        if claims.token_type != expected {
            return Err(TokenRejection::WrongTokenType.into());
        }
        Ok(claims)
    }

    /// Revokes a token until its own expiry, grace window included.
    ///
    /// The signature must verify. A token that has already expired is left
    /// alone. Revoking twice is harmless.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let token = strip_bearer(token);
        let claims = self.decoder.decode(token)?;

        let Some(ttl) = self.revocation_ttl(&claims) else {
            debug!(member_id = %claims.sub, "Token already expired, nothing to revoke");
            return Ok(());
        };

        self.revocations.put(token, ttl).await
    }

    /// Validates a refresh token and revokes it in one atomic step.
    ///
    /// Of any number of concurrent calls with the same token, exactly one
    /// gets the claims back; the rest see [`TokenRejection::Revoked`].
    pub async fn consume_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.validate_refresh(token).await?;
        let token = strip_bearer(token);

        let Some(ttl) = self.revocation_ttl(&claims) else {
            return Err(TokenRejection::Expired.into());
        };

        if !self.revocations.claim(token, ttl).await? {
            debug!(member_id = %claims.sub, "Refresh token already consumed");
            return Err(TokenRejection::Revoked.into());
        }

        Ok(claims)
    }

    /// Checks that a token is a `kind` token issued to `subject`.
    ///
    /// Only the signature is verified; an expired or revoked token still
    /// passes so that it can be revoked again harmlessly.
    pub fn check_owner(
        &self,
        token: &str,
        subject: MemberId,
        kind: TokenType,
    ) -> Result<Claims, AuthError> {
        let claims = self.decoder.decode(strip_bearer(token))?;
        if claims.token_type != kind {
            return Err(TokenRejection::WrongTokenType.into());
        }
        if claims.sub != subject {
            return Err(TokenRejection::SubjectMismatch.into());
        }
        Ok(claims)
    }

    /// Time until `claims` stop being accepted, or `None` if already past.
    fn revocation_ttl(&self, claims: &Claims) -> Option<Duration> {
        let deadline_ms = claims.exp.saturating_add(self.leeway).saturating_mul(1_000);
        let remaining_ms = deadline_ms.saturating_sub(self.clock.now().timestamp_millis());
        u64::try_from(remaining_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}

fn strip_bearer(token: &str) -> &str {
    token.strip_prefix(BEARER_PREFIX).unwrap_or(token)
}

#[cfg(test)]
mod tests {
    use memberhub_cache::memory::MemoryCacheProvider;
    use memberhub_core::config::cache::MemoryCacheConfig;
    use memberhub_core::types::ManualClock;
    use memberhub_core::types::id::ProfileId;

    use super::*;

    fn authority(clock: ManualClock) -> TokenAuthority {
        let config = AuthConfig {
            jwt_secret: "unit-test-secret".into(),
            ..AuthConfig::default()
        };
        let cache = Arc::new(MemoryCacheProvider::new(&MemoryCacheConfig::default()));
        let revocations = RevocationStore::new(cache, Duration::from_millis(500));
        TokenAuthority::new(&config, revocations, Arc::new(clock))
    }

    fn aux() -> AuxiliaryClaims {
        AuxiliaryClaims {
            profile_id: Some(ProfileId::new()),
            email: Some("lee@example.com".into()),
        }
    }

    /// Replaces one character of the payload segment.
    fn tamper(token: &str) -> String {
        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let payload = &mut parts[1];
        let last = payload.pop().unwrap();
        payload.push(if last == 'A' { 'B' } else { 'A' });
        parts.join(".")
    }

    #[tokio::test]
    async fn test_issue_then_validate() {
        let authority = authority(ManualClock::starting_now());
        let member = MemberId::new();
        let aux = aux();

        let token = authority
            .issue(member, aux.clone(), TokenType::Access)
            .unwrap();
        let claims = authority.validate(&token).await.unwrap();

        assert_eq!(claims.sub, member);
        assert_eq!(claims.aux, aux);
        assert_eq!(claims.exp - claims.iat, 3_600);
    }

    #[tokio::test]
    async fn test_bearer_prefix_is_accepted() {
        let authority = authority(ManualClock::starting_now());
        let token = authority
            .issue(MemberId::new(), AuxiliaryClaims::default(), TokenType::Access)
            .unwrap();
        assert!(authority.validate(&format!("Bearer {token}")).await.is_ok());
    }

    #[tokio::test]
    async fn test_token_pair_ttls() {
        let authority = authority(ManualClock::starting_now());
        let pair = authority
            .issue_token_pair(MemberId::new(), AuxiliaryClaims::default())
            .unwrap();

        assert_eq!(pair.access_ttl_seconds, 3_600);
        assert_eq!(
            (pair.refresh_expires_at - pair.access_expires_at).num_hours(),
            14 * 24 - 1
        );
        let refresh = authority.validate(&pair.refresh_token).await.unwrap();
        assert_eq!(refresh.token_type, TokenType::Refresh);
    }

    #[tokio::test]
    async fn test_tampered_payload_is_invalid_signature() {
        let authority = authority(ManualClock::starting_now());
        let token = authority
            .issue(MemberId::new(), aux(), TokenType::Access)
            .unwrap();

        let err = authority.validate(&tamper(&token)).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Rejected(TokenRejection::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn test_garbage_is_malformed() {
        let authority = authority(ManualClock::starting_now());
        for garbage in ["", "not-a-token", "a.b.c"] {
            let err = authority.validate(garbage).await.unwrap_err();
            assert!(
                matches!(err, AuthError::Rejected(TokenRejection::Malformed)),
                "{garbage:?} gave {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_expiry_honours_leeway() {
        let clock = ManualClock::starting_now();
        let authority = authority(clock.clone());
        let token = authority
            .issue(MemberId::new(), AuxiliaryClaims::default(), TokenType::Access)
            .unwrap();

        clock.advance(chrono::Duration::seconds(3_600 + 4));
        assert!(authority.validate(&token).await.is_ok());

        clock.advance(chrono::Duration::seconds(1));
        let err = authority.validate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(TokenRejection::Expired)));
    }

    #[tokio::test]
    async fn test_wrong_token_type() {
        let authority = authority(ManualClock::starting_now());
        let pair = authority
            .issue_token_pair(MemberId::new(), AuxiliaryClaims::default())
            .unwrap();

        let err = authority
            .validate_access(&pair.refresh_token)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Rejected(TokenRejection::WrongTokenType)
        ));
        assert!(authority.validate_refresh(&pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let authority = authority(ManualClock::starting_now());
        let token = authority
            .issue(MemberId::new(), AuxiliaryClaims::default(), TokenType::Access)
            .unwrap();

        authority.revoke(&token).await.unwrap();
        authority.revoke(&format!("Bearer {token}")).await.unwrap();

        let err = authority.validate(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(TokenRejection::Revoked)));
    }

    #[tokio::test]
    async fn test_revoking_expired_token_stores_nothing() {
        let clock = ManualClock::starting_now();
        let authority = authority(clock.clone());
        let token = authority
            .issue(MemberId::new(), AuxiliaryClaims::default(), TokenType::Access)
            .unwrap();

        clock.advance(chrono::Duration::hours(2));
        authority.revoke(&token).await.unwrap();
        assert!(!authority.revocations().contains(&token).await.unwrap());
    }

    #[tokio::test]
    async fn test_revoking_forged_token_fails() {
        let authority = authority(ManualClock::starting_now());
        let token = authority
            .issue(MemberId::new(), AuxiliaryClaims::default(), TokenType::Access)
            .unwrap();

        let err = authority.revoke(&tamper(&token)).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Rejected(TokenRejection::InvalidSignature)
        ));
    }

    #[tokio::test]
    async fn test_consume_refresh_only_once() {
        let authority = authority(ManualClock::starting_now());
        let member = MemberId::new();
        let token = authority
            .issue(member, aux(), TokenType::Refresh)
            .unwrap();

        let claims = authority.consume_refresh(&token).await.unwrap();
        assert_eq!(claims.sub, member);

        let err = authority.consume_refresh(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(TokenRejection::Revoked)));
    }

    #[tokio::test]
    async fn test_consume_refresh_requires_refresh_kind() {
        let authority = authority(ManualClock::starting_now());
        let token = authority
            .issue(MemberId::new(), aux(), TokenType::Access)
            .unwrap();

        let err = authority.consume_refresh(&token).await.unwrap_err();
        assert!(matches!(
            err,
            AuthError::Rejected(TokenRejection::WrongTokenType)
        ));
        assert!(authority.validate(&token).await.is_ok());
    }

    #[tokio::test]
    async fn test_check_owner() {
        let authority = authority(ManualClock::starting_now());
        let member = MemberId::new();
        let token = authority
            .issue(member, aux(), TokenType::Refresh)
            .unwrap();

        assert!(authority.check_owner(&token, member, TokenType::Refresh).is_ok());
        assert!(matches!(
            authority.check_owner(&token, MemberId::new(), TokenType::Refresh),
            Err(AuthError::Rejected(TokenRejection::SubjectMismatch))
        ));
        assert!(matches!(
            authority.check_owner(&token, member, TokenType::Access),
            Err(AuthError::Rejected(TokenRejection::WrongTokenType))
        ));
        assert!(matches!(
            authority.check_owner(&tamper(&token), member, TokenType::Refresh),
            Err(AuthError::Rejected(TokenRejection::InvalidSignature))
        ));
    }
}
