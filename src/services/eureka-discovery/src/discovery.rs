//! Discovery Client Module
//!
//! Generic discovery interface and its Eureka-backed implementation. Every
//! operation is a stateless read projected from the registry client's current view.

use crate::config::EurekaInstanceConfig;
use crate::instance::{EurekaServiceInstance, LocalServiceInstance, ServiceInstance};
use crate::registry::EurekaClient;
use crate::Result;

use std::sync::Arc;
use tracing::{debug, warn};

/// Human-readable name of the Eureka discovery client
pub const DESCRIPTION: &str = "Eureka Discovery Client";

/// Discovery client trait for dependency injection
pub trait DiscoveryClient: Send + Sync {
    /// Descriptor type returned for remote instances
    type Instance: ServiceInstance;

    /// Human-readable name of the implementation
    fn description(&self) -> &str;

    /// Describe this process's own instance
    fn describe_local_instance(&self) -> Result<LocalServiceInstance>;

    /// Instances registered under a logical service id, in registry order
    fn list_instances(&self, service_id: &str) -> Result<Vec<Self::Instance>>;

    /// Lower-cased names of all services with at least one instance
    fn list_service_names(&self) -> Vec<String>;
}

/// Discovery client answering from a Eureka registry client
#[derive(Clone)]
pub struct EurekaDiscoveryClient {
    /// Local instance identity
    config: Arc<EurekaInstanceConfig>,

    /// Registry client
    client: Arc<dyn EurekaClient>,
}

impl EurekaDiscoveryClient {
    /// Create a new discovery client
    pub fn new(config: Arc<EurekaInstanceConfig>, client: Arc<dyn EurekaClient>) -> Self {
        Self { config, client }
    }

    /// Local instance identity this client describes
    pub fn config(&self) -> &EurekaInstanceConfig {
        &self.config
    }
}

impl DiscoveryClient for EurekaDiscoveryClient {
    type Instance = EurekaServiceInstance;

    fn description(&self) -> &str {
        DESCRIPTION
    }

    fn describe_local_instance(&self) -> Result<LocalServiceInstance> {
        LocalServiceInstance::from_config(&self.config)
    }

    fn list_instances(&self, service_id: &str) -> Result<Vec<EurekaServiceInstance>> {
        let infos = self.client.instances_by_vip_address(service_id, false);
        debug!(service_id, count = infos.len(), "Resolved instances by virtual address");

        infos.iter().map(EurekaServiceInstance::from_info).collect()
    }

    fn list_service_names(&self) -> Vec<String> {
        let Some(applications) = self.client.applications() else {
            warn!("Registry snapshot not available, reporting no services");
            return Vec::new();
        };

        let names: Vec<String> = applications
            .registered_applications()
            .iter()
            .filter(|app| !app.instances().is_empty())
            .map(|app| app.name().to_lowercase())
            .collect();

        debug!(
            registered = applications.registered_applications().len(),
            live = names.len(),
            "Listed service names"
        );

        names
    }
}
