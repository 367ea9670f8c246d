//! Credential domain entities.

pub mod model;
pub mod state;

pub use model::CredentialRecord;
pub use state::CredentialState;
