//! Member credential state machine and its persistence.

pub mod lock;
pub mod memory;
pub mod postgres;
pub mod service;
pub mod state;
pub mod store;

pub use lock::MemberLocks;
pub use memory::MemoryCredentialStore;
pub use service::{ChangeOutcome, CredentialService, CredentialStatus, VerifyOutcome};
pub use state::MemberCredential;
pub use store::CredentialStore;
