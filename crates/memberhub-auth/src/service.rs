//! The credential and session authority, as exposed to calling layers.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use memberhub_core::config::AuthConfig;
use memberhub_core::traits::cache::CacheProvider;
use memberhub_core::types::Clock;
use memberhub_core::types::id::MemberId;

use crate::credential::{
    ChangeOutcome, CredentialService, CredentialStatus, CredentialStore, VerifyOutcome,
};
use crate::directory::MemberDirectory;
use crate::error::AuthError;
use crate::jwt::{AuxiliaryClaims, Claims, TokenAuthority, TokenPair};
use crate::password::PasswordHasher;
use crate::revocation::RevocationStore;
use crate::session::SessionManager;

/// Result of a successful login.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    /// The authenticated member.
    pub member_id: MemberId,
    /// Generated token pair.
    pub tokens: TokenPair,
}

/// Collaborators the authority is built from.
#[derive(Debug, Clone)]
pub struct AuthDependencies {
    /// Credential persistence.
    pub credentials: Arc<dyn CredentialStore>,
    /// Member profile lookup.
    pub directory: Arc<dyn MemberDirectory>,
    /// Backend for the revocation list.
    pub cache: Arc<dyn CacheProvider>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Secret hasher.
    pub hasher: PasswordHasher,
}

/// Credential checks plus token lifecycle behind one handle.
#[derive(Debug, Clone)]
pub struct AuthService {
    credentials: CredentialService,
    sessions: SessionManager,
}

impl AuthService {
    /// Wires the authority from configuration and its collaborators.
    pub fn new(config: &AuthConfig, deps: AuthDependencies) -> Self {
        let revocations = RevocationStore::new(
            deps.cache,
            Duration::from_millis(config.revocation_timeout_ms),
        );
        let tokens = Arc::new(TokenAuthority::new(config, revocations, deps.clock));

        Self {
            credentials: CredentialService::new(deps.credentials, deps.hasher, config),
            sessions: SessionManager::new(tokens, deps.directory),
        }
    }

    /// Credential operations.
    pub fn credentials(&self) -> &CredentialService {
        &self.credentials
    }

    /// Token lifecycle operations.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// See [`CredentialService::provision_credential`].
    pub async fn provision_credential(
        &self,
        member_id: MemberId,
        secret: &str,
    ) -> Result<(), AuthError> {
        self.credentials.provision_credential(member_id, secret).await
    }

    /// See [`CredentialService::verify_credential`].
    pub async fn verify_credential(
        &self,
        member_id: MemberId,
        secret: &str,
    ) -> Result<VerifyOutcome, AuthError> {
        self.credentials.verify_credential(member_id, secret).await
    }

    /// See [`CredentialService::change_credential`].
    pub async fn change_credential(
        &self,
        member_id: MemberId,
        old: &str,
        new: &str,
    ) -> Result<ChangeOutcome, AuthError> {
        self.credentials.change_credential(member_id, old, new).await
    }

    /// See [`CredentialService::reset_credential`].
    pub async fn reset_credential(
        &self,
        member_id: MemberId,
        new_secret: &str,
    ) -> Result<(), AuthError> {
        self.credentials.reset_credential(member_id, new_secret).await
    }

    /// See [`CredentialService::credential_status`].
    pub async fn credential_status(
        &self,
        member_id: MemberId,
    ) -> Result<CredentialStatus, AuthError> {
        self.credentials.credential_status(member_id).await
    }

    /// Performs the complete login flow:
    ///
    /// 1. Verify the secret (counts toward lockout)
    /// 2. Look up the member's auxiliary claims
    /// 3. Issue a token pair
    pub async fn login(&self, member_id: MemberId, secret: &str) -> Result<LoginResult, AuthError> {
        match self.credentials.verify_credential(member_id, secret).await? {
            VerifyOutcome::Success => {}
            VerifyOutcome::Failure { remaining_attempts } => {
                warn!(member_id = %member_id, remaining_attempts, "Login failed");
                return Err(AuthError::VerificationFailed { remaining_attempts });
            }
            VerifyOutcome::LockedOut => {
                warn!(member_id = %member_id, "Login refused, credential locked");
                return Err(AuthError::LockedOut);
            }
        }

        let tokens = self.sessions.start(member_id).await?;
        info!(member_id = %member_id, "Login successful");

        Ok(LoginResult { member_id, tokens })
    }

    /// Issues a pair with caller-supplied claims.
    pub fn issue_token_pair(
        &self,
        member_id: MemberId,
        aux: AuxiliaryClaims,
    ) -> Result<TokenPair, AuthError> {
        self.sessions.issue_token_pair(member_id, aux)
    }

    /// Validates any token kind.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.sessions.validate_token(token).await
    }

    /// Validates an access token.
    pub async fn validate_access(&self, token: &str) -> Result<Claims, AuthError> {
        self.sessions.tokens().validate_access(token).await
    }

    /// Validates a refresh token.
    pub async fn validate_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        self.sessions.tokens().validate_refresh(token).await
    }

    /// Revokes a token until its expiry. Idempotent.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        self.sessions.revoke_token(token).await
    }

    /// See [`SessionManager::refresh`].
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.sessions.refresh(refresh_token).await
    }

    /// See [`SessionManager::logout`].
    pub async fn logout(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        self.sessions.logout(access_token, refresh_token).await
    }
}
