//! Eureka Discovery Library
//!
//! AI-CORE adapter exposing a Eureka registry client through a generic discovery interface.
//!
//! This library provides:
//! - A description of the local service instance built from its configuration
//! - Lookup of remote instances by logical service id
//! - Listing of the service names that currently have live instances
//!
//! Caching, heartbeats and registry refresh belong to the wrapped [`EurekaClient`];
//! every operation here is a synchronous projection of whatever view it holds.
//!
//! # Quick Start
//!
//! ```no_run
//! use eureka_discovery::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = DiscoveryClientConfig::load(None)?;
//!
//!     let registry = Arc::new(InMemoryEurekaClient::new());
//!     registry.register(InstanceInfo::new("ORDERS", "10.0.0.7", 8080));
//!
//!     let discovery = EurekaDiscoveryClient::new(Arc::new(config.instance), registry);
//!     for instance in discovery.list_instances("orders")? {
//!         println!("{}", instance.uri());
//!     }
//!
//!     Ok(())
//! }
//! ```

use thiserror::Error;

pub mod config;
pub mod discovery;
pub mod instance;
pub mod models;
pub mod registry;
pub mod telemetry;

// Re-export commonly used types
pub use config::{DiscoveryClientConfig, EurekaInstanceConfig, LoggingConfig};
pub use discovery::{DiscoveryClient, EurekaDiscoveryClient, DESCRIPTION};
pub use instance::{EurekaServiceInstance, InstanceUri, LocalServiceInstance, ServiceInstance};
pub use models::{Application, Applications, InstanceInfo, InstanceStatus, PortType};
pub use registry::{EurekaClient, InMemoryEurekaClient};

/// Eureka discovery library errors
#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Invalid URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
}

/// Result type alias for the discovery library
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        config::{DiscoveryClientConfig, EurekaInstanceConfig, LoggingConfig},
        discovery::{DiscoveryClient, EurekaDiscoveryClient},
        instance::{EurekaServiceInstance, InstanceUri, LocalServiceInstance, ServiceInstance},
        models::{Application, Applications, InstanceInfo, InstanceStatus, PortType},
        registry::{EurekaClient, InMemoryEurekaClient},
        DiscoveryError, Result,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_available() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_invalid_uri_message() {
        let err = instance::parse_uri("relative/path").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid URI 'relative/path': relative URL without a base"
        );
    }
}
