//! Social login providers.

pub mod provider;
pub mod registry;

pub use provider::{SocialIdentity, SocialProvider};
pub use registry::ProviderRegistry;
