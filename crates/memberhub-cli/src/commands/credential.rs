//! Member credential management commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use memberhub_auth::{AuthError, VerifyOutcome};
use memberhub_core::error::AppError;
use memberhub_core::types::id::MemberId;

use crate::output;

use super::Cli;

/// Arguments for credential commands
#[derive(Debug, Args)]
pub struct CredentialArgs {
    /// Credential subcommand
    #[command(subcommand)]
    pub command: CredentialCommand,
}

/// Credential subcommands
#[derive(Debug, Subcommand)]
pub enum CredentialCommand {
    /// Create the credential of a member who has none
    Provision {
        /// Member ID
        #[arg(long)]
        member: MemberId,
    },
    /// Check a password (counts toward lockout)
    Verify {
        /// Member ID
        #[arg(long)]
        member: MemberId,
    },
    /// Replace a password and clear any lockout
    Reset {
        /// Member ID
        #[arg(long)]
        member: MemberId,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
    /// Show lockout state
    Status {
        /// Member ID
        #[arg(long)]
        member: MemberId,
    },
}

/// Credential status row for table output
#[derive(Debug, Serialize, Tabled)]
struct StatusRow {
    /// Member ID
    member_id: String,
    /// Active or locked
    state: String,
    /// Consecutive failures
    failed_attempts: u32,
    /// Attempts left
    remaining_attempts: u32,
}

/// Execute credential commands
pub async fn execute(args: &CredentialArgs, cli: &Cli) -> Result<(), AppError> {
    let config = cli.load_config()?;
    let service = super::build_credential_service(&config).await?;

    match &args.command {
        CredentialCommand::Provision { member } => {
            let secret = super::read_secret(None, "New password", true)?;
            service.provision_credential(*member, &secret).await?;
            output::print_success(&format!("Credential provisioned for {member}"));
        }
        CredentialCommand::Verify { member } => {
            let secret = super::read_secret(None, "Password", false)?;
            match service.verify_credential(*member, &secret).await? {
                VerifyOutcome::Success => output::print_success("Password accepted"),
                VerifyOutcome::Failure { remaining_attempts } => {
                    return Err(AuthError::VerificationFailed { remaining_attempts }.into());
                }
                VerifyOutcome::LockedOut => return Err(AuthError::LockedOut.into()),
            }
        }
        CredentialCommand::Reset { member, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Replace the password of {member} and clear its lockout?"
                    ))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let secret = super::read_secret(None, "New password", true)?;
            service.reset_credential(*member, &secret).await?;
            output::print_success(&format!("Credential reset for {member}"));
        }
        CredentialCommand::Status { member } => {
            let status = service.credential_status(*member).await?;
            let row = StatusRow {
                member_id: member.to_string(),
                state: status.state.to_string(),
                failed_attempts: status.failed_attempts,
                remaining_attempts: status.remaining_attempts,
            };
            output::print_rows(&[row], cli.format);
        }
    }

    Ok(())
}
