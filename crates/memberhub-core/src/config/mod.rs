//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod auth;
pub mod cache;
pub mod database;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::auth::AuthConfig;
pub use self::cache::CacheConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "MEMBERHUB";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Cache provider settings (backs the token revocation store).
    #[serde(default)]
    pub cache: CacheConfig,
    /// Credential and token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default`, the environment-specific overlay
    /// `config/<env>`, and environment variables prefixed with `MEMBERHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration starting from an explicit base file.
    ///
    /// The environment overlay is looked up next to the base file.
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let base = base.trim_end_matches(".toml");
        let overlay = match base.rsplit_once('/') {
            Some((dir, _)) => format!("{dir}/{env}"),
            None => env.to_string(),
        };

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.auth.check()?;
        Ok(app)
    }
}
