//! Database migration management commands.

use clap::{Args, Subcommand};

use memberhub_core::error::AppError;

use crate::output;

use super::Cli;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, cli: &Cli) -> Result<(), AppError> {
    let config = cli.load_config()?;
    let pool = super::create_db_pool(&config).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            memberhub_database::migration::run_migrations(&pool).await?;
            output::print_success("All migrations applied successfully.");
        }
    }

    Ok(())
}
