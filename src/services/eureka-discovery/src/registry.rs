//! Registry Client Module
//!
//! The narrow capability the discovery adapter needs from a Eureka registry client,
//! plus an in-memory implementation backed by a locally held registry snapshot.

use crate::models::{Applications, InstanceInfo};

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

/// Registry client trait for dependency injection
///
/// Implementations answer from whatever view of the registry they currently hold.
/// Fetching, caching and refreshing that view is their business, not the caller's.
#[cfg_attr(test, mockall::automock)]
pub trait EurekaClient: Send + Sync {
    /// Instances registered under a virtual address, in registry order
    fn instances_by_vip_address(&self, vip_address: &str, secure: bool) -> Vec<InstanceInfo>;

    /// Current registry snapshot, or `None` if none has been fetched yet
    fn applications(&self) -> Option<Arc<Applications>>;
}

/// Registry client answering from a snapshot held in memory
///
/// Useful for static deployments and tests. Writers swap the snapshot under a lock,
/// readers clone the `Arc` and never observe a half-applied update.
pub struct InMemoryEurekaClient {
    /// Current snapshot, `None` until the first registration or replacement
    snapshot: RwLock<Option<Arc<Applications>>>,

    /// Hide instances whose status is not `UP`
    filter_only_up_instances: bool,
}

impl InMemoryEurekaClient {
    /// Create a client with no snapshot, filtering to `UP` instances
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(None),
            filter_only_up_instances: true,
        }
    }

    /// Create a client seeded with a snapshot
    pub fn with_applications(applications: Applications) -> Self {
        let client = Self::new();
        client.replace_applications(applications);
        client
    }

    /// Choose whether instances that are not `UP` are hidden from readers
    pub fn filter_only_up_instances(mut self, enabled: bool) -> Self {
        self.filter_only_up_instances = enabled;
        self
    }

    /// Replace the whole snapshot
    pub fn replace_applications(&self, applications: Applications) {
        info!(
            applications = applications.registered_applications().len(),
            "Replacing registry snapshot"
        );
        *self.snapshot.write() = Some(Arc::new(applications));
    }

    /// Register an instance under its application
    pub fn register(&self, instance: InstanceInfo) {
        debug!(
            app = %instance.app_name,
            instance_id = %instance.instance_id,
            "Registering instance"
        );
        let mut guard = self.snapshot.write();
        let applications = guard.get_or_insert_with(|| Arc::new(Applications::default()));
        Arc::make_mut(applications).add_instance(instance);
    }

    /// Drop the snapshot entirely
    pub fn clear(&self) {
        *self.snapshot.write() = None;
    }

    fn current(&self) -> Option<Arc<Applications>> {
        self.snapshot.read().clone()
    }

    fn is_visible(&self, instance: &InstanceInfo) -> bool {
        !self.filter_only_up_instances || instance.is_up()
    }
}

impl Default for InMemoryEurekaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EurekaClient for InMemoryEurekaClient {
    fn instances_by_vip_address(&self, vip_address: &str, secure: bool) -> Vec<InstanceInfo> {
        let Some(applications) = self.current() else {
            return Vec::new();
        };

        applications
            .instances()
            .filter(|instance| self.is_visible(instance))
            .filter(|instance| matches_vip_address(instance, vip_address, secure))
            .cloned()
            .collect()
    }

    fn applications(&self) -> Option<Arc<Applications>> {
        let applications = self.current()?;
        if !self.filter_only_up_instances {
            return Some(applications);
        }

        let mut filtered = (*applications).clone();
        for app in &mut filtered.applications {
            app.instances.retain(InstanceInfo::is_up);
        }
        Some(Arc::new(filtered))
    }
}

/// Check an instance's (secure) virtual address list against a query, ignoring case.
/// Instances without a virtual address answer to their application name.
fn matches_vip_address(instance: &InstanceInfo, vip_address: &str, secure: bool) -> bool {
    let declared = if secure {
        instance.secure_vip_address.as_deref()
    } else {
        instance.vip_address.as_deref()
    };
    let declared = declared
        .filter(|addresses| !addresses.trim().is_empty())
        .unwrap_or(&instance.app_name);

    declared
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate.eq_ignore_ascii_case(vip_address))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Application, InstanceStatus};
    use pretty_assertions::assert_eq;

    fn ids(instances: &[InstanceInfo]) -> Vec<&str> {
        instances.iter().map(|i| i.instance_id.as_str()).collect()
    }

    #[test]
    fn test_no_snapshot() {
        let client = InMemoryEurekaClient::new();

        assert!(client.applications().is_none());
        assert!(client.instances_by_vip_address("orders", false).is_empty());
    }

    #[test]
    fn test_vip_lookup_keeps_registry_order() {
        let client = InMemoryEurekaClient::new();
        client.register(InstanceInfo::new("ORDERS", "h1", 8080).with_instance_id("a"));
        client.register(InstanceInfo::new("CART", "h2", 8080).with_instance_id("b"));
        client.register(InstanceInfo::new("ORDERS", "h3", 8080).with_instance_id("c"));

        let found = client.instances_by_vip_address("orders", false);
        assert_eq!(ids(&found), vec!["a", "c"]);
    }

    #[test]
    fn test_vip_lookup_matches_any_listed_address() {
        let client = InMemoryEurekaClient::new();
        client.register(
            InstanceInfo::new("ORDERS", "h1", 8080)
                .with_instance_id("a")
                .with_vip_address("orders-v1, Orders-Legacy"),
        );

        assert_eq!(ids(&client.instances_by_vip_address("orders-legacy", false)), vec!["a"]);
        assert!(client.instances_by_vip_address("orders", false).is_empty());
    }

    #[test]
    fn test_vip_lookup_uses_secure_address_when_asked() {
        let client = InMemoryEurekaClient::new();
        client.register(
            InstanceInfo::new("ORDERS", "h1", 8080)
                .with_instance_id("a")
                .with_vip_address("orders")
                .with_secure_vip_address("orders-tls"),
        );

        assert!(client.instances_by_vip_address("orders-tls", false).is_empty());
        assert_eq!(ids(&client.instances_by_vip_address("orders-tls", true)), vec!["a"]);
    }

    #[test]
    fn test_blank_vip_address_falls_back_to_app_name() {
        let client = InMemoryEurekaClient::new();
        client.register(
            InstanceInfo::new("ORDERS", "h1", 8080)
                .with_instance_id("a")
                .with_vip_address("  "),
        );

        assert_eq!(ids(&client.instances_by_vip_address("orders", false)), vec!["a"]);
    }

    #[test]
    fn test_up_filter_hides_instances() {
        let client = InMemoryEurekaClient::with_applications(Applications::new(vec![
            Application::new("ORDERS")
                .with_instance(InstanceInfo::new("ORDERS", "h1", 1).with_instance_id("up"))
                .with_instance(
                    InstanceInfo::new("ORDERS", "h2", 2)
                        .with_instance_id("down")
                        .with_status(InstanceStatus::Down),
                ),
        ]));

        assert_eq!(ids(&client.instances_by_vip_address("orders", false)), vec!["up"]);
        let apps = client.applications().unwrap();
        assert_eq!(ids(apps.registered_applications()[0].instances()), vec!["up"]);
    }

    #[test]
    fn test_up_filter_can_be_disabled() {
        let client = InMemoryEurekaClient::new().filter_only_up_instances(false);
        client.register(InstanceInfo::new("ORDERS", "h1", 1).with_status(InstanceStatus::Starting));

        assert_eq!(client.instances_by_vip_address("orders", false).len(), 1);
        assert_eq!(client.applications().unwrap().instances().count(), 1);
    }

    #[test]
    fn test_readers_keep_their_snapshot() {
        let client = InMemoryEurekaClient::new().filter_only_up_instances(false);
        client.register(InstanceInfo::new("ORDERS", "h1", 1));

        let before = client.applications().unwrap();
        client.register(InstanceInfo::new("CART", "h2", 2));

        assert_eq!(before.registered_applications().len(), 1);
        assert_eq!(client.applications().unwrap().registered_applications().len(), 2);
    }

    #[test]
    fn test_clear_drops_snapshot() {
        let client = InMemoryEurekaClient::new();
        client.register(InstanceInfo::new("ORDERS", "h1", 1));
        client.clear();

        assert!(client.applications().is_none());
    }
}
