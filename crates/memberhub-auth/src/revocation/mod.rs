//! Revoked-token tracking with automatic expiry.

pub mod store;

pub use store::RevocationStore;
