//! Password policy and hashing commands.

use clap::{Args, Subcommand};
use tracing::warn;

use memberhub_auth::{PasswordHasher, PasswordPolicy};
use memberhub_core::config::AuthConfig;
use memberhub_core::error::AppError;

use crate::output;

use super::Cli;

/// Arguments for password commands
#[derive(Debug, Args)]
pub struct PasswordArgs {
    /// Password subcommand
    #[command(subcommand)]
    pub command: PasswordCommand,
}

/// Password subcommands
#[derive(Debug, Subcommand)]
pub enum PasswordCommand {
    /// Check a candidate against the password policy
    Check {
        /// Candidate password (prompted if omitted)
        password: Option<String>,
    },
    /// Produce an Argon2id hash of a policy-compliant password
    Hash {
        /// Password to hash (prompted if omitted)
        password: Option<String>,
    },
}

/// Execute password commands
pub async fn execute(args: &PasswordArgs, cli: &Cli) -> Result<(), AppError> {
    let policy = PasswordPolicy::new(&auth_config(cli));

    match &args.command {
        PasswordCommand::Check { password } => {
            let candidate = super::read_secret(password.as_deref(), "Password", false)?;
            match policy.validate(&candidate) {
                Ok(()) => output::print_success("Password satisfies the policy"),
                Err(violation) => {
                    return Err(AppError::validation(violation.to_string()));
                }
            }
        }
        PasswordCommand::Hash { password } => {
            let candidate = super::read_secret(password.as_deref(), "Password", true)?;
            policy
                .validate(&candidate)
                .map_err(|v| AppError::validation(v.to_string()))?;
            println!("{}", PasswordHasher::new().hash_password(&candidate)?);
        }
    }

    Ok(())
}

/// Policy settings do not need a database, so a missing config falls back to defaults.
fn auth_config(cli: &Cli) -> AuthConfig {
    match cli.load_config() {
        Ok(config) => config.auth,
        Err(e) => {
            warn!(error = %e, "Configuration unavailable, using default password policy");
            AuthConfig::default()
        }
    }
}
