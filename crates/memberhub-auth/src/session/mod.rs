//! Token-backed session lifecycle.

pub mod manager;

pub use manager::SessionManager;
