//! Application configuration
//!
//! Configuration is loaded once at startup from multiple sources with clear
//! precedence:
//!
//! 1. Environment variables (highest priority, `LOAM_` prefix, `__` nesting)
//! 2. `./config.toml`
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [server]
//! bind = "0.0.0.0:8080"
//!
//! [database]
//! url = "postgres://localhost/loam"
//!
//! [session]
//! backend = "redis"
//! redis_url = "redis://127.0.0.1:6379"
//! expiry_secs = 86400
//!
//! [email]
//! backend = "console"
//! support_address = "support@example.com"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind, e.g. `0.0.0.0:8080`
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DatabaseSettings {
    /// PostgreSQL connection URL
    pub url: String,
}

/// Session store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// In-process store, suitable for development and single-instance runs
    Memory,
    /// Redis-backed store for deployments
    Redis,
}

/// Session and cookie settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Which backing store holds session records
    pub backend: SessionBackend,

    /// Redis connection URL (used when `backend = "redis"`)
    pub redis_url: String,

    /// Name of the session cookie
    pub cookie_name: String,

    /// Sliding session TTL in seconds
    pub expiry_secs: u64,

    /// Mark the session cookie `Secure` (HTTPS only)
    pub secure_cookies: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            cookie_name: "loam_session".to_string(),
            expiry_secs: 86400, // 24 hours
            secure_cookies: !cfg!(debug_assertions),
        }
    }
}

/// Email backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailBackend {
    /// Log messages instead of sending them (development default)
    Console,
    /// Deliver via SMTP
    Smtp,
}

/// SMTP transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// SMTP server hostname
    pub host: String,
    /// SMTP server port (usually 587 for STARTTLS)
    pub port: u16,
    /// SMTP username
    pub username: String,
    /// SMTP password
    pub password: String,
    /// Use STARTTLS
    pub use_tls: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 587,
            username: String::new(),
            password: String::new(),
            use_tls: true,
        }
    }
}

/// Outbound email settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    /// Which delivery backend to use
    pub backend: EmailBackend,

    /// Address that receives contact-form messages
    pub support_address: String,

    /// SMTP transport settings (used when `backend = "smtp"`)
    pub smtp: SmtpSettings,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            backend: EmailBackend::Console,
            support_address: String::new(),
            smtp: SmtpSettings::default(),
        }
    }
}

/// Static-asset settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSettings {
    /// Directory holding the build fingerprint files (`css.txt`, `js.txt`)
    pub manifest_dir: PathBuf,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            manifest_dir: PathBuf::from("./assets/bust"),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerSettings,
    /// Database settings
    pub database: DatabaseSettings,
    /// Session and cookie settings
    pub session: SessionSettings,
    /// Outbound email settings
    pub email: EmailSettings,
    /// Static-asset settings
    pub assets: AssetSettings,
}

impl AppConfig {
    /// Load configuration from defaults, `./config.toml`, and `LOAM_*`
    /// environment variables (highest priority).
    ///
    /// Called once at startup; an invalid configuration is fatal.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read, a value fails type
    /// conversion, or validation rejects the merged configuration.
    pub fn load() -> anyhow::Result<Self> {
        let defaults =
            toml::to_string(&Self::default()).context("failed to serialize default config")?;

        let mut figment = Figment::new().merge(Toml::string(&defaults));

        let local_config = Path::new("./config.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(local_config));
        }

        figment = figment.merge(Env::prefixed("LOAM_").split("__").lowercase(true));

        let config: Self = figment.extract().context("invalid configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot run with.
    fn validate(&self) -> anyhow::Result<()> {
        if self.session.expiry_secs == 0 {
            bail!("session.expiry_secs must be greater than zero");
        }
        if self.session.cookie_name.is_empty() {
            bail!("session.cookie_name must not be empty");
        }
        Ok(())
    }
}
