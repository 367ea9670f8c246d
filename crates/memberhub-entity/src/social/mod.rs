//! Social login provider identifiers.

pub mod provider;

pub use provider::SocialProviderKind;
