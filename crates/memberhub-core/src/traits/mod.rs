//! Core traits defined in `memberhub-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
