//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use memberhub_core::config::AppConfig;
use memberhub_core::config::auth::DEFAULT_JWT_SECRET;
use memberhub_core::error::AppError;
use memberhub_database::connection::redact_url;

use crate::output;

use super::Cli;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration with secrets masked
    Show,
    /// Load and validate the configuration
    Validate,
}

/// Execute config commands
pub async fn execute(args: &ConfigArgs, cli: &Cli) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = masked(cli.load_config()?);
            output::print_item(&config, cli.format);
        }
        ConfigCommand::Validate => match cli.load_config() {
            Ok(config) => {
                output::print_success(&format!(
                    "Configuration '{}' ({}) is valid",
                    cli.config, cli.env
                ));
                output::print_kv("Database", &redact_url(&config.database.url));
                output::print_kv("Cache", &config.cache.provider);
                output::print_kv("Lockout threshold", &config.auth.max_failed_attempts.to_string());
                if config.auth.jwt_secret == DEFAULT_JWT_SECRET {
                    output::print_warning("jwt_secret is the built-in placeholder");
                }
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {e}"));
                return Err(e);
            }
        },
    }

    Ok(())
}

/// Hide credentials before display.
fn masked(mut config: AppConfig) -> AppConfig {
    config.database.url = redact_url(&config.database.url);
    config.cache.redis.url = redact_url(&config.cache.redis.url);
    config.auth.jwt_secret = "****".to_string();
    config
}
