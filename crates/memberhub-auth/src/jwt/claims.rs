//! JWT claims structure used in access and refresh tokens.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use memberhub_core::types::id::{MemberId, ProfileId, TokenId};
use memberhub_entity::member::MemberProfile;

/// JWT claims payload embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the member ID.
    pub sub: MemberId,
    /// Member attributes fixed at issuance.
    #[serde(flatten)]
    pub aux: AuxiliaryClaims,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Random token ID.
    pub jti: TokenId,
    /// Token type: "access" or "refresh".
    pub token_type: TokenType,
}

/// Optional member attributes carried alongside the subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuxiliaryClaims {
    /// The member's profile, if one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
    /// The member's email, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<MemberProfile> for AuxiliaryClaims {
    fn from(profile: MemberProfile) -> Self {
        Self {
            profile_id: profile.profile_id,
            email: profile.email,
        }
    }
}

/// Distinguishes access tokens from refresh tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token for API requests.
    Access,
    /// Long-lived refresh token for obtaining a new pair.
    Refresh,
}

impl TokenType {
    /// Return the type as its claim value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Claims {
    /// Returns the member ID from the subject claim.
    pub fn member_id(&self) -> MemberId {
        self.sub
    }

    /// Returns the issue time as a `DateTime<Utc>`.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Seconds until `exp + leeway`, counted from `now` (may be negative).
    pub fn seconds_remaining(&self, now: i64, leeway: i64) -> i64 {
        self.exp.saturating_add(leeway).saturating_sub(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(aux: AuxiliaryClaims) -> Claims {
        Claims {
            sub: MemberId::new(),
            aux,
            iat: 1_000,
            exp: 4_600,
            jti: TokenId::new(),
            token_type: TokenType::Access,
        }
    }

    #[test]
    fn test_absent_auxiliary_claims_are_omitted() {
        let json = serde_json::to_value(claims(AuxiliaryClaims::default())).unwrap();
        assert!(json.get("profile_id").is_none());
        assert!(json.get("email").is_none());
        assert_eq!(json["token_type"], "access");
    }

    #[test]
    fn test_auxiliary_claims_are_flat() {
        let aux = AuxiliaryClaims {
            profile_id: Some(ProfileId::new()),
            email: Some("kim@example.com".into()),
        };
        let original = claims(aux);
        let json = serde_json::to_value(&original).unwrap();
        assert_eq!(json["email"], "kim@example.com");

        let back: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn test_seconds_remaining_includes_leeway() {
        let c = claims(AuxiliaryClaims::default());
        assert_eq!(c.seconds_remaining(4_600, 5), 5);
        assert_eq!(c.seconds_remaining(4_610, 5), -5);
    }
}
