//! Discovery Client Configuration Module
//!
//! Describes the local instance's identity and the logging setup, loaded from
//! an optional configuration file layered under environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::EnvFilter;
use validator::Validate;

/// Prefix for configuration environment variables, e.g. `EUREKA_DISCOVERY__INSTANCE__APP_NAME`
pub const ENV_PREFIX: &str = "EUREKA_DISCOVERY";

/// Main discovery client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryClientConfig {
    /// Local instance identity
    pub instance: EurekaInstanceConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Identity of this process as it registers itself with Eureka
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EurekaInstanceConfig {
    /// Application name, reported as the service id
    #[validate(length(min = 1, max = 255))]
    pub app_name: String,

    /// Host name other instances use to reach this one
    #[validate(length(min = 1, max = 255))]
    pub hostname: String,

    /// Plain port
    #[validate(range(min = 1))]
    pub non_secure_port: u16,

    /// Whether the instance serves TLS traffic
    pub secure_port_enabled: bool,

    /// Absolute health check URL, overrides the path when set
    pub health_check_url: Option<String>,

    /// Absolute health check URL used when TLS is enabled
    pub secure_health_check_url: Option<String>,

    /// Health check path appended to the instance URI
    pub health_check_url_path: String,

    /// Absolute status page URL, overrides the path when set
    pub status_page_url: Option<String>,

    /// Status page path appended to the instance URI
    pub status_page_url_path: String,
}

impl EurekaInstanceConfig {
    /// Create a configuration for the given identity, with default paths
    pub fn new(app_name: impl Into<String>, hostname: impl Into<String>, port: u16) -> Self {
        Self {
            app_name: app_name.into(),
            hostname: hostname.into(),
            non_secure_port: port,
            ..Self::default()
        }
    }

    /// The explicit health check URL for the current TLS setting, if it has any text
    pub fn effective_health_check_url(&self) -> Option<&str> {
        let url = if self.secure_port_enabled {
            self.secure_health_check_url.as_deref()
        } else {
            self.health_check_url.as_deref()
        };
        non_blank(url)
    }

    /// The explicit status page URL, if it has any text
    pub fn effective_status_page_url(&self) -> Option<&str> {
        non_blank(self.status_page_url.as_deref())
    }
}

impl Default for EurekaInstanceConfig {
    fn default() -> Self {
        Self {
            app_name: "unknown".to_string(),
            hostname: "localhost".to_string(),
            non_secure_port: 80,
            secure_port_enabled: false,
            health_check_url: None,
            secure_health_check_url: None,
            health_check_url_path: "/health".to_string(),
            status_page_url: None,
            status_page_url_path: "/info".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `eureka_discovery=debug`
    pub level: String,

    /// Output format: `json` or `pretty`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl DiscoveryClientConfig {
    /// Load configuration from an optional file and environment variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
        }

        settings = settings.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: DiscoveryClientConfig = settings
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(&self.instance).context("Invalid instance configuration")?;

        if self.instance.app_name.trim().is_empty() {
            return Err(anyhow::anyhow!("Application name cannot be blank"));
        }

        if self.instance.hostname.trim().is_empty() {
            return Err(anyhow::anyhow!("Hostname cannot be blank"));
        }

        for (name, path) in [
            ("health_check_url_path", &self.instance.health_check_url_path),
            ("status_page_url_path", &self.instance.status_page_url_path),
        ] {
            if !path.starts_with('/') {
                return Err(anyhow::anyhow!("{} must start with '/': {}", name, path));
            }
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(anyhow::anyhow!(
                "Unsupported log format: {}",
                self.logging.format
            ));
        }

        EnvFilter::try_new(&self.logging.level)
            .with_context(|| format!("Invalid log level: {}", self.logging.level))?;

        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
