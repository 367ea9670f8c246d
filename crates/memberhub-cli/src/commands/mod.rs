//! CLI command definitions and dispatch.

pub mod config;
pub mod credential;
pub mod migrate;
pub mod password;
pub mod token;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use memberhub_auth::{CredentialService, PasswordHasher, RevocationStore, TokenAuthority};
use memberhub_cache::CacheManager;
use memberhub_core::config::{AppConfig, CacheConfig};
use memberhub_core::error::AppError;
use memberhub_core::types::SystemClock;
use memberhub_database::repositories::CredentialRepository;

use crate::output::OutputFormat;

/// MemberHub credential and session administration
#[derive(Debug, Parser)]
#[command(name = "memberhub", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file (without extension)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay to merge on top of the base file
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Password policy and hashing
    Password(password::PasswordArgs),
    /// Issue and inspect tokens or revoke them
    Token(token::TokenArgs),
    /// Member credential management
    Credential(credential::CredentialArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Password(args) => password::execute(args, self).await,
            Commands::Token(args) => token::execute(args, self).await,
            Commands::Credential(args) => credential::execute(args, self).await,
            Commands::Migrate(args) => migrate::execute(args, self).await,
            Commands::Config(args) => config::execute(args, self).await,
        }
    }

    /// Load configuration for the selected environment
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load_from(&self.config, &self.env)
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<sqlx::PgPool, AppError> {
    let pool = memberhub_database::connection::DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}

/// Helper: token authority backed by the configured cache
pub async fn build_token_authority(config: &AppConfig) -> Result<TokenAuthority, AppError> {
    let cache = CacheManager::new(&config.cache).await?;
    let revocations = RevocationStore::new(
        Arc::new(cache),
        Duration::from_millis(config.auth.revocation_timeout_ms),
    );
    Ok(TokenAuthority::new(
        &config.auth,
        revocations,
        Arc::new(SystemClock),
    ))
}

/// Helper: refuse revocation-list commands against a process-local cache
///
/// Entries written to the in-memory provider vanish when the CLI exits and
/// are never seen by running services.
pub fn require_shared_cache(cache: &CacheConfig, action: &str) -> Result<(), AppError> {
    if cache.is_shared() {
        return Ok(());
    }
    Err(AppError::configuration(format!(
        "'{action}' needs the shared revocation list, but cache.provider is '{}'. \
         Set cache.provider = \"redis\" (or MEMBERHUB__CACHE__PROVIDER=redis).",
        cache.provider
    )))
}

/// Helper: credential service backed by PostgreSQL
pub async fn build_credential_service(config: &AppConfig) -> Result<CredentialService, AppError> {
    let pool = create_db_pool(config).await?;
    Ok(CredentialService::new(
        Arc::new(CredentialRepository::new(pool)),
        PasswordHasher::new(),
        &config.auth,
    ))
}

/// Helper: take a secret from the argument or prompt for it without echo
pub fn read_secret(given: Option<&str>, prompt: &str, confirm: bool) -> Result<String, AppError> {
    if let Some(secret) = given {
        return Ok(secret.to_string());
    }

    let mut input = dialoguer::Password::new().with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Repeat to confirm", "Entries do not match");
    }
    input
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_refused_for_revocation_commands() {
        let err = require_shared_cache(&CacheConfig::default(), "token revoke").unwrap_err();
        assert!(err.message.contains("token revoke"));
    }

    #[test]
    fn test_redis_cache_accepted() {
        let cache = CacheConfig {
            provider: "redis".into(),
            ..CacheConfig::default()
        };
        assert!(require_shared_cache(&cache, "token inspect").is_ok());
    }
}
