//! Boot-time configuration for Chassis.
//!
//! Read once from a TOML file, optionally overridden by `CHASSIS_*`
//! environment variables, then immutable for the process lifetime. An
//! unreadable file is boot-fatal by design: the application builder
//! propagates the error and nothing is served.
//!
//! ```toml
//! [app]
//! name = "shop"
//! log_level = "info"
//! admin_path = "admin"
//!
//! [store]
//! host = "127.0.0.1"
//! port = 3306
//! user = "shop"
//! database = "shop"
//! engine = "mysql"
//!
//! [auth]
//! secret = "change-me"
//! effective_minutes = 120
//!
//! [whitelist]
//! items = "/login,^/public/.*"
//!
//! [tenant]
//! enforce = true
//! ```

pub mod error;

pub use error::{ConfigError, Result};

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct AppSection {
    pub name: String,
    pub log_level: String,
    pub admin_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { port: 9097 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreSection {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Backend selector, e.g. "memory" or "mysql".
    pub engine: String,
    pub table_prefix: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: String::new(),
            password: String::new(),
            database: String::new(),
            engine: "memory".to_string(),
            table_prefix: "ci".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AuthSection {
    pub secret: String,
    /// Token lifetime in minutes; non-positive values fall back to two hours.
    pub effective_minutes: i64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            secret: String::new(),
            effective_minutes: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct WhitelistSection {
    /// Comma-separated path patterns; `^`-prefixed entries are regexes.
    pub items: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TenantSection {
    pub enforce: bool,
    pub api_prefix: String,
}

impl Default for TenantSection {
    fn default() -> Self {
        Self {
            enforce: false,
            api_prefix: "/api".to_string(),
        }
    }
}

/// The whole configuration surface, read-only after boot.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ChassisConfig {
    pub app: AppSection,
    pub server: ServerSection,
    pub store: StoreSection,
    pub auth: AuthSection,
    pub whitelist: WhitelistSection,
    pub tenant: TenantSection,
}

impl ChassisConfig {
    /// Parse a TOML document.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    /// Load a file, apply `.env` if present, then `CHASSIS_*` overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        dotenvy::dotenv().ok();
        let mut config = Self::from_file(path)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Apply environment overrides for the secrets and knobs that commonly
    /// differ between deployments.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(value) = std::env::var("CHASSIS_APP_LOG_LEVEL") {
            self.app.log_level = value;
        }
        if let Ok(value) = std::env::var("CHASSIS_SERVER_PORT") {
            self.server.port = value.parse().map_err(|_| ConfigError::Invalid {
                key: "CHASSIS_SERVER_PORT".to_string(),
                message: format!("not a port number: {value}"),
            })?;
        }
        if let Ok(value) = std::env::var("CHASSIS_STORE_PASSWORD") {
            self.store.password = value;
        }
        if let Ok(value) = std::env::var("CHASSIS_AUTH_SECRET") {
            self.auth.secret = value;
        }
        if let Ok(value) = std::env::var("CHASSIS_WHITELIST_ITEMS") {
            self.whitelist.items = value;
        }
        if let Ok(value) = std::env::var("CHASSIS_TENANT_ENFORCE") {
            self.tenant.enforce = value.parse().map_err(|_| ConfigError::Invalid {
                key: "CHASSIS_TENANT_ENFORCE".to_string(),
                message: format!("not a boolean: {value}"),
            })?;
        }
        Ok(())
    }
}
