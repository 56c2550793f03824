//! Herald configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. `herald.toml` in the current directory (optional)
//! 3. `HERALD_*` environment variables, e.g. `HERALD_LOG_LEVEL=debug`
//! 4. `SECRET_DISCORD` for the Discord token
//!
//! A `.env` file is loaded into the environment first.

use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use herald_cache::EntityCacheConfig;
use herald_error::{ConfigError, HeraldResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Environment variable holding the Discord token.
pub const DISCORD_SECRET_VARIABLE: &str = "SECRET_DISCORD";

/// `User-Agent` sent with outbound requests unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = concat!("Herald/", env!("CARGO_PKG_VERSION"));

const REDACTED: &str = "[redacted]";

/// Runtime configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct HeraldConfig {
    /// Discord bot token
    #[serde(default)]
    discord_secret: String,
    /// `User-Agent` for outbound HTTP requests
    #[serde(default = "default_user_agent")]
    user_agent: String,
    /// Log filter used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    log_level: String,
    /// Emit logs as JSON
    #[serde(default)]
    json_logs: bool,
    /// Download attachment content when attachments are first seen
    #[serde(default = "default_fetch_attachments")]
    fetch_attachments: bool,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fetch_attachments() -> bool {
    true
}

impl std::fmt::Debug for HeraldConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeraldConfig")
            .field("discord_secret", &REDACTED)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .field("json_logs", &self.json_logs)
            .field("fetch_attachments", &self.fetch_attachments)
            .finish()
    }
}

impl HeraldConfig {
    /// Load configuration from `.env`, `herald.toml` and the environment.
    ///
    /// # Errors
    ///
    /// Fails if `herald.toml` is malformed or no Discord token is set.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use herald::HeraldConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = HeraldConfig::load()?;
    /// println!("{}", config.user_agent());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> HeraldResult<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) => debug!(error = %e, "No .env file loaded"),
        }

        let mut builder = Config::builder()
            .add_source(File::with_name("herald").required(false))
            .add_source(Environment::with_prefix("HERALD"));
        if let Ok(secret) = std::env::var(DISCORD_SECRET_VARIABLE) {
            builder = builder
                .set_override("discord_secret", secret)
                .map_err(ConfigError::from)?;
        }

        Self::build(builder.build().map_err(ConfigError::from)?)
    }

    /// Load configuration from a TOML file only.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> HeraldResult<Self> {
        debug!("Loading configuration from file");
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;
        Self::build(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> HeraldResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .map_err(ConfigError::from)?;
        Self::build(config)
    }

    fn build(config: Config) -> HeraldResult<Self> {
        let parsed: Self = config.try_deserialize().map_err(|e| {
            ConfigError::new(format!("Failed to parse configuration: {}", e))
        })?;

        if parsed.discord_secret.trim().is_empty() {
            return Err(ConfigError::missing_secret(DISCORD_SECRET_VARIABLE).into());
        }

        debug!(config = ?parsed, "Configuration loaded");
        Ok(parsed)
    }

    /// Entity cache settings derived from this configuration.
    pub fn cache_config(&self) -> EntityCacheConfig {
        EntityCacheConfig::default().with_fetch_attachments(self.fetch_attachments)
    }

    /// A copy safe to print, with the Discord token masked.
    pub fn redacted(&self) -> Self {
        Self {
            discord_secret: REDACTED.to_string(),
            ..self.clone()
        }
    }
}
