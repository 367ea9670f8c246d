//! # memberhub-database
//!
//! PostgreSQL connection management and the repositories the credential
//! authority persists through.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
