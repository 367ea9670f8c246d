//! # memberhub-auth
//!
//! Credential and session authority for the MemberHub platform.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing and password policy enforcement
//! - `credential`: Per-member lockout state machine and its persistence
//! - `jwt`: Token issuance, validation, and claims
//! - `revocation`: Cache-backed revocation list with per-entry expiry
//! - `session`: Refresh rotation and logout
//! - `directory`: Member profile lookup for token claims
//! - `social`: Social login provider registry
//! - `service`: [`AuthService`], the entry point for calling layers

pub mod credential;
pub mod directory;
pub mod error;
pub mod jwt;
pub mod password;
pub mod revocation;
pub mod service;
pub mod session;
pub mod social;

pub use credential::{
    ChangeOutcome, CredentialService, CredentialStatus, CredentialStore, MemoryCredentialStore,
    VerifyOutcome,
};
pub use directory::{MemberDirectory, MemoryMemberDirectory};
pub use error::{AuthError, TokenRejection};
pub use jwt::{AuxiliaryClaims, Claims, JwtDecoder, JwtEncoder, TokenAuthority, TokenPair, TokenType};
pub use password::{PasswordHasher, PasswordPolicy, PolicyViolation};
pub use revocation::RevocationStore;
pub use service::{AuthDependencies, AuthService, LoginResult};
pub use session::SessionManager;
pub use social::{ProviderRegistry, SocialIdentity, SocialProvider};
