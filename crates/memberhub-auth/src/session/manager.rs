//! Session lifecycle manager for refresh rotation and logout.

use std::sync::Arc;

use tracing::{info, warn};

use memberhub_core::error::AppError;
use memberhub_core::types::id::MemberId;

use crate::directory::MemberDirectory;
use crate::error::AuthError;
use crate::jwt::{AuxiliaryClaims, Claims, TokenAuthority, TokenPair, TokenType};

/// Manages the token side of a member's session.
///
/// A session is nothing more than a live access/refresh pair; ending it
/// means revoking both tokens.
#[derive(Debug, Clone)]
pub struct SessionManager {
    /// Token issuance and validation.
    tokens: Arc<TokenAuthority>,
    /// Source of auxiliary claims.
    directory: Arc<dyn MemberDirectory>,
}

impl SessionManager {
    /// Creates a session manager.
    pub fn new(tokens: Arc<TokenAuthority>, directory: Arc<dyn MemberDirectory>) -> Self {
        Self { tokens, directory }
    }

    /// The underlying token authority.
    pub fn tokens(&self) -> &TokenAuthority {
        &self.tokens
    }

    /// Issues a pair for `member_id` with claims looked up from the directory.
    pub async fn start(&self, member_id: MemberId) -> Result<TokenPair, AuthError> {
        let aux = self.lookup_claims(member_id).await?;
        let tokens = self.tokens.issue_token_pair(member_id, aux)?;

        info!(member_id = %member_id, "Session started");
        Ok(tokens)
    }

    /// Issues a pair with caller-supplied claims.
    pub fn issue_token_pair(
        &self,
        member_id: MemberId,
        aux: AuxiliaryClaims,
    ) -> Result<TokenPair, AuthError> {
        self.tokens.issue_token_pair(member_id, aux)
    }

    /// Validates any token kind.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.tokens.validate(token).await
    }

    /// Revokes a token until its expiry.
    pub async fn revoke_token(&self, token: &str) -> Result<(), AuthError> {
        self.tokens.revoke(token).await
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// 1. Validate the refresh token and revoke it in one step, so only one
    ///    concurrent exchange of the same token wins
    /// 2. Re-read the member's claims
    /// 3. Issue a new pair
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.consume_refresh(refresh_token).await?;

        let aux = self.lookup_claims(claims.sub).await?;
        let tokens = self.tokens.issue_token_pair(claims.sub, aux)?;

        info!(member_id = %claims.sub, "Token refreshed");
        Ok(tokens)
    }

    /// Ends a session by revoking its tokens.
    ///
    /// The access token must be a currently valid access token. The refresh
    /// token, when given, must be a refresh token issued to the same member;
    /// both are checked before anything is revoked.
    pub async fn logout(
        &self,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), AuthError> {
        let claims = self.tokens.validate_access(access_token).await?;
        if let Some(refresh_token) = refresh_token {
            self.tokens
                .check_owner(refresh_token, claims.sub, TokenType::Refresh)?;
        }
        self.tokens.revoke(access_token).await?;

        if let Some(refresh_token) = refresh_token {
            if let Err(e) = self.tokens.revoke(refresh_token).await {
                warn!(member_id = %claims.sub, error = %e, "Failed to revoke refresh token on logout");
                return Err(e);
            }
        }

        info!(member_id = %claims.sub, "Logged out");
        Ok(())
    }

    async fn lookup_claims(&self, member_id: MemberId) -> Result<AuxiliaryClaims, AuthError> {
        let profile = self
            .directory
            .find_profile(member_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Member {member_id} not found")))?;
        Ok(profile.into())
    }
}
