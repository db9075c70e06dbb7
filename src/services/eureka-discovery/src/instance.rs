//! Service Instance Descriptors
//!
//! Normalized views of a service instance, either this process (built from
//! [`EurekaInstanceConfig`]) or a remote instance (built from a registry record).
//! Both are computed eagerly and never mutated.

use crate::config::EurekaInstanceConfig;
use crate::models::{InstanceInfo, PortType};
use crate::{DiscoveryError, Result};

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use url::Url;

const HTTP_SCHEME: &str = "http";
const HTTPS_SCHEME: &str = "https";

/// Read interface shared by every instance descriptor
pub trait ServiceInstance {
    /// Logical service id the instance is registered under
    fn service_id(&self) -> &str;

    /// Host name exactly as configured or registered
    fn host(&self) -> &str;

    /// Port callers should connect to
    fn port(&self) -> u16;

    /// Whether the instance serves TLS traffic
    fn is_secure(&self) -> bool;

    /// Base URI, `scheme://host:port`
    fn uri(&self) -> &InstanceUri;

    /// Health check URI, `None` only for remote records registered without one
    fn health_check_uri(&self) -> Option<&InstanceUri>;

    /// Status page URI, `None` only for remote records registered without one
    fn status_page_uri(&self) -> Option<&InstanceUri>;
}

/// An absolute URI kept in the exact text it was built or registered with.
///
/// Parsing only validates; the authority is never normalized, so explicit
/// default ports and host case survive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceUri {
    raw: String,
    parsed: Url,
}

impl InstanceUri {
    /// Validate and wrap an absolute URI
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let parsed = parse_uri(&raw)?;
        Ok(Self { raw, parsed })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed form, for callers that need the components
    pub fn url(&self) -> &Url {
        &self.parsed
    }

    /// Append a path to this URI
    fn with_path(&self, path: &str) -> Result<Self> {
        Self::parse(format!(
            "{}/{}",
            self.raw.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

impl fmt::Display for InstanceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Serialize for InstanceUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

/// Build the base URI of an instance from its address and TLS flag
pub fn base_uri(host: &str, port: u16, secure: bool) -> Result<InstanceUri> {
    let scheme = if secure { HTTPS_SCHEME } else { HTTP_SCHEME };
    // IPv6 literals need brackets in the authority
    if host.contains(':') && !host.starts_with('[') {
        InstanceUri::parse(format!("{}://[{}]:{}", scheme, host, port))
    } else {
        InstanceUri::parse(format!("{}://{}:{}", scheme, host, port))
    }
}

/// Parse an absolute URI, reporting the offending text on failure
pub fn parse_uri(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|source| DiscoveryError::InvalidUri {
        uri: raw.to_string(),
        source,
    })
}

/// This process's own instance, as described by its configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalServiceInstance {
    service_id: String,
    host: String,
    port: u16,
    secure: bool,
    uri: InstanceUri,
    health_check_uri: InstanceUri,
    status_page_uri: InstanceUri,
}

impl LocalServiceInstance {
    /// Describe the local instance.
    ///
    /// Explicit health check and status page URLs win over the configured paths.
    /// Otherwise the path is appended to the base URI.
    pub fn from_config(config: &EurekaInstanceConfig) -> Result<Self> {
        let secure = config.secure_port_enabled;
        let uri = base_uri(&config.hostname, config.non_secure_port, secure)?;

        let health_check_uri = match config.effective_health_check_url() {
            Some(url) => InstanceUri::parse(url)?,
            None => uri.with_path(&config.health_check_url_path)?,
        };

        let status_page_uri = match config.effective_status_page_url() {
            Some(url) => InstanceUri::parse(url)?,
            None => uri.with_path(&config.status_page_url_path)?,
        };

        Ok(Self {
            service_id: config.app_name.clone(),
            host: config.hostname.clone(),
            port: config.non_secure_port,
            secure,
            uri,
            health_check_uri,
            status_page_uri,
        })
    }
}

impl ServiceInstance for LocalServiceInstance {
    fn service_id(&self) -> &str {
        &self.service_id
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn uri(&self) -> &InstanceUri {
        &self.uri
    }

    fn health_check_uri(&self) -> Option<&InstanceUri> {
        Some(&self.health_check_uri)
    }

    fn status_page_uri(&self) -> Option<&InstanceUri> {
        Some(&self.status_page_uri)
    }
}

/// A remote instance, projected from the registry record it wraps
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EurekaServiceInstance {
    #[serde(skip)]
    info: InstanceInfo,
    service_id: String,
    host: String,
    port: u16,
    secure: bool,
    uri: InstanceUri,
    health_check_uri: Option<InstanceUri>,
    status_page_uri: Option<InstanceUri>,
}

impl EurekaServiceInstance {
    /// Describe a registry record.
    ///
    /// Fails if the record's health check or status page URL is not an absolute URI.
    pub fn from_info(info: &InstanceInfo) -> Result<Self> {
        let secure = info.is_port_enabled(PortType::Secure);
        let port = select_port(info);
        let uri = base_uri(&info.host_name, port, secure)?;

        let health_check_uri = select_health_check_url(info.health_check_urls(), secure)
            .map(InstanceUri::parse)
            .transpose()?;

        let status_page_uri = info
            .status_page_url
            .as_deref()
            .map(InstanceUri::parse)
            .transpose()?;

        Ok(Self {
            info: info.clone(),
            service_id: info.app_name.clone(),
            host: info.host_name.clone(),
            port,
            secure,
            uri,
            health_check_uri,
            status_page_uri,
        })
    }

    /// The registry record this descriptor was built from
    pub fn instance_info(&self) -> &InstanceInfo {
        &self.info
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.info.metadata
    }
}

impl ServiceInstance for EurekaServiceInstance {
    fn service_id(&self) -> &str {
        &self.service_id
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn uri(&self) -> &InstanceUri {
        &self.uri
    }

    fn health_check_uri(&self) -> Option<&InstanceUri> {
        self.health_check_uri.as_ref()
    }

    fn status_page_uri(&self) -> Option<&InstanceUri> {
        self.status_page_uri.as_ref()
    }
}

/// Plain port wins whenever it is enabled or TLS is not
fn select_port(info: &InstanceInfo) -> u16 {
    if info.is_port_enabled(PortType::Unsecure) || !info.is_port_enabled(PortType::Secure) {
        info.port
    } else {
        info.secure_port
    }
}

/// First `https` URL for secure instances, otherwise the first URL
fn select_health_check_url(urls: &[String], secure: bool) -> Option<&str> {
    if secure {
        if let Some(url) = urls.iter().find(|url| url.starts_with(HTTPS_SCHEME)) {
            return Some(url.as_str());
        }
    }
    urls.first().map(String::as_str)
}
