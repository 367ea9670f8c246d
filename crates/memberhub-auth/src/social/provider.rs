//! Trait implemented by each external identity provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use memberhub_core::result::AppResult;
use memberhub_entity::social::SocialProviderKind;

/// Identity asserted by an external provider after the OAuth exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialIdentity {
    /// Which provider asserted it.
    pub provider: SocialProviderKind,
    /// The provider's stable user identifier.
    pub subject: String,
    /// Email, if the member granted it.
    pub email: Option<String>,
    /// Display name, if the member granted it.
    pub nickname: Option<String>,
}

/// One OAuth2 identity provider.
///
/// Request and response shapes are the implementor's concern; the
/// authority only needs the redirect target and the resulting identity.
#[async_trait]
pub trait SocialProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Which provider this is.
    fn kind(&self) -> SocialProviderKind;

    /// URL to send the member to, carrying the anti-forgery `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Exchanges an authorization code for the member's identity.
    async fn fetch_identity(&self, authorization_code: &str) -> AppResult<SocialIdentity>;
}
