//! Token administration commands.

use clap::{Args, Subcommand, ValueEnum};
use serde::Serialize;

use memberhub_auth::{AuthError, AuxiliaryClaims, TokenType};
use memberhub_core::error::AppError;
use memberhub_core::types::id::{MemberId, ProfileId};

use crate::output;

use super::Cli;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// What to issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IssueKind {
    /// A single access token
    Access,
    /// A single refresh token
    Refresh,
    /// An access/refresh pair
    Pair,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue a signed token for a member
    Issue {
        /// Subject member ID
        #[arg(long)]
        member: MemberId,
        /// Profile ID claim
        #[arg(long)]
        profile: Option<ProfileId>,
        /// Email claim
        #[arg(long)]
        email: Option<String>,
        /// Token kind
        #[arg(long, value_enum, default_value = "pair")]
        kind: IssueKind,
    },
    /// Validate a token and show its claims (requires the Redis cache)
    Inspect {
        /// The token, with or without a `Bearer ` prefix
        token: String,
    },
    /// Revoke a token until it expires (requires the Redis cache)
    Revoke {
        /// The token, with or without a `Bearer ` prefix
        token: String,
    },
}

/// Single-token issuance output
#[derive(Debug, Serialize)]
struct IssuedToken {
    token_type: TokenType,
    token: String,
}

/// Execute token commands
pub async fn execute(args: &TokenArgs, cli: &Cli) -> Result<(), AppError> {
    let config = cli.load_config()?;
    let needs_shared = match &args.command {
        TokenCommand::Inspect { .. } => Some("token inspect"),
        TokenCommand::Revoke { .. } => Some("token revoke"),
        TokenCommand::Issue { .. } => None,
    };
    if let Some(action) = needs_shared {
        super::require_shared_cache(&config.cache, action)?;
    }
    let authority = super::build_token_authority(&config).await?;

    match &args.command {
        TokenCommand::Issue {
            member,
            profile,
            email,
            kind,
        } => {
            let aux = AuxiliaryClaims {
                profile_id: *profile,
                email: email.clone(),
            };
            match kind {
                IssueKind::Pair => {
                    let pair = authority.issue_token_pair(*member, aux)?;
                    output::print_item(&pair, cli.format);
                }
                IssueKind::Access | IssueKind::Refresh => {
                    let token_type = if *kind == IssueKind::Access {
                        TokenType::Access
                    } else {
                        TokenType::Refresh
                    };
                    let token = authority.issue(*member, aux, token_type)?;
                    output::print_item(&IssuedToken { token_type, token }, cli.format);
                }
            }
        }
        TokenCommand::Inspect { token } => match authority.validate(token).await {
            Ok(claims) => output::print_item(&claims, cli.format),
            Err(AuthError::Rejected(reason)) => {
                output::print_warning(&format!("Token rejected: {reason}"));
                return Err(AuthError::Rejected(reason).into());
            }
            Err(e) => return Err(e.into()),
        },
        TokenCommand::Revoke { token } => {
            authority.revoke(token).await?;
            output::print_success("Token revoked");
        }
    }

    Ok(())
}
