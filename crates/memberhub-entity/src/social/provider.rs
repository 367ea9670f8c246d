//! Social login provider enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// External identity providers a member can sign in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProviderKind {
    /// Kakao accounts.
    Kakao,
    /// Naver accounts.
    Naver,
    /// Google accounts.
    Google,
}

impl SocialProviderKind {
    /// Return the provider id as used in callback paths and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kakao => "kakao",
            Self::Naver => "naver",
            Self::Google => "google",
        }
    }
}

impl fmt::Display for SocialProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SocialProviderKind {
    type Err = memberhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kakao" => Ok(Self::Kakao),
            "naver" => Ok(Self::Naver),
            "google" => Ok(Self::Google),
            _ => Err(memberhub_core::AppError::validation(format!(
                "Unknown social provider: '{s}'"
            ))),
        }
    }
}
