//! Repository implementations for MemberHub entities.

pub mod credential;
pub mod member;

pub use credential::CredentialRepository;
pub use member::MemberRepository;
