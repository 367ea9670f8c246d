//! Startup-time registry of social login providers.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use memberhub_core::error::AppError;
use memberhub_core::result::AppResult;
use memberhub_entity::social::SocialProviderKind;

use super::provider::{SocialIdentity, SocialProvider};

/// Providers keyed by kind.
///
/// Filled once at startup and then shared read-only.
#[derive(Debug, Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<SocialProviderKind, Arc<dyn SocialProvider>>,
}

impl ProviderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider. Each kind may be registered once.
    pub fn register(&mut self, provider: Arc<dyn SocialProvider>) -> AppResult<()> {
        let kind = provider.kind();
        if self.providers.contains_key(&kind) {
            return Err(AppError::configuration(format!(
                "Social provider '{kind}' is already registered"
            )));
        }

        info!(provider = %kind, "Registering social provider");
        self.providers.insert(kind, provider);
        Ok(())
    }

    /// Looks up a provider by kind.
    pub fn get(&self, kind: SocialProviderKind) -> AppResult<&dyn SocialProvider> {
        self.providers
            .get(&kind)
            .map(|p| p.as_ref())
            .ok_or_else(|| AppError::not_found(format!("Social provider '{kind}' is not enabled")))
    }

    /// Looks up a provider by its id as it appears in callback paths.
    pub fn resolve(&self, provider_id: &str) -> AppResult<&dyn SocialProvider> {
        self.get(provider_id.parse()?)
    }

    /// Runs the code exchange with the named provider.
    pub async fn authenticate(
        &self,
        provider_id: &str,
        authorization_code: &str,
    ) -> AppResult<SocialIdentity> {
        self.resolve(provider_id)?
            .fetch_identity(authorization_code)
            .await
    }

    /// Registered kinds, in a stable order.
    pub fn kinds(&self) -> Vec<SocialProviderKind> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort_by_key(|k| k.as_str());
        kinds
    }
}
