//! Configuration for tradein-gate.

use crate::catalog::DEFAULT_FRESHNESS;
use crate::gateway::DEFAULT_GATEWAY_TIMEOUT;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Trade-in catalog upstream.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Verification gateway.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Catalog upstream configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// URL of the catalog JSON document.
    #[serde(default = "default_catalog_url")]
    pub url: String,

    /// Seconds a snapshot stays fresh.
    #[serde(default = "default_freshness_secs")]
    pub freshness_secs: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Verification gateway configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// URL of the verification endpoint.
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Report unverifiable without calling when no session token is given.
    #[serde(default)]
    pub require_session_token: bool,

    /// Where customers verify their device out of band.
    #[serde(default = "default_portal_url")]
    pub portal_url: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            gateway: GatewayConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            freshness_secs: default_freshness_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            timeout_secs: default_timeout_secs(),
            require_session_token: false,
            portal_url: default_portal_url(),
        }
    }
}

fn default_catalog_url() -> String {
    "https://tradein.example.com/api/catalog.json".to_string()
}

fn default_gateway_url() -> String {
    "https://tradein.example.com/api/imei/verify".to_string()
}

fn default_portal_url() -> String {
    "https://tradein.example.com/verify".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_freshness_secs() -> u64 {
    DEFAULT_FRESHNESS.as_secs()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_GATEWAY_TIMEOUT.as_secs()
}

impl CatalogConfig {
    /// Freshness window.
    #[must_use]
    pub fn freshness(&self) -> Duration {
        Duration::from_secs(self.freshness_secs)
    }

    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GatewayConfig {
    /// Call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GateConfig {
    /// Default location of the config file, if the platform has one.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "tradein-gate")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn to_file(&self, path: &Path) -> crate::Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check values that would make the gate unusable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] naming the offending key.
    pub fn validate(&self) -> crate::Result<()> {
        if self.catalog.url.trim().is_empty() {
            return Err(crate::Error::Config("catalog.url is empty".to_string()));
        }
        if self.gateway.url.trim().is_empty() {
            return Err(crate::Error::Config("gateway.url is empty".to_string()));
        }
        if self.gateway.timeout_secs == 0 || self.catalog.timeout_secs == 0 {
            return Err(crate::Error::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
