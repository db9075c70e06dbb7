//! Registry Record Models
//!
//! Plain data structures mirroring what a Eureka registry client keeps in its local
//! cache: instance records, applications grouping them, and the full registry snapshot.
//! These are immutable values from the adapter's point of view.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Port kinds an instance can expose
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    /// Plain (non-TLS) port
    Unsecure,
    /// TLS port
    Secure,
}

/// Instance status as reported to the registry
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    /// Ready to receive traffic
    #[default]
    Up,
    /// Failed its health check
    Down,
    /// Still initializing
    Starting,
    /// Deliberately taken out of rotation
    OutOfService,
    /// Status never reported
    Unknown,
}

/// A single registered instance, as held by the registry client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceInfo {
    /// Registry-unique instance identifier
    pub instance_id: String,

    /// Application this instance belongs to
    pub app_name: String,

    /// Host name the instance advertises
    pub host_name: String,

    /// Plain port
    pub port: u16,

    /// Whether the plain port accepts traffic
    pub port_enabled: bool,

    /// TLS port
    pub secure_port: u16,

    /// Whether the TLS port accepts traffic
    pub secure_port_enabled: bool,

    /// Comma-separated virtual addresses for plain traffic
    pub vip_address: Option<String>,

    /// Comma-separated virtual addresses for TLS traffic
    pub secure_vip_address: Option<String>,

    /// Last reported status
    pub status: InstanceStatus,

    /// Status page URL, stored verbatim
    pub status_page_url: Option<String>,

    /// Candidate health check URLs in registration order, without duplicates
    pub health_check_urls: Vec<String>,

    /// Free-form instance metadata
    pub metadata: HashMap<String, String>,
}

impl InstanceInfo {
    /// Create an `UP` instance with only its plain port enabled.
    ///
    /// The instance id defaults to `host:app:port` and the virtual address to the
    /// app name, which is what a registering client does when nothing else is set.
    pub fn new(app_name: impl Into<String>, host_name: impl Into<String>, port: u16) -> Self {
        let app_name = app_name.into();
        let host_name = host_name.into();
        Self {
            instance_id: format!("{}:{}:{}", host_name, app_name.to_lowercase(), port),
            vip_address: Some(app_name.to_lowercase()),
            secure_vip_address: Some(app_name.to_lowercase()),
            app_name,
            host_name,
            port,
            port_enabled: true,
            secure_port: 443,
            secure_port_enabled: false,
            status: InstanceStatus::Up,
            status_page_url: None,
            health_check_urls: Vec::new(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = instance_id.into();
        self
    }

    /// Set the TLS port and enable it
    pub fn with_secure_port(mut self, secure_port: u16) -> Self {
        self.secure_port = secure_port;
        self.secure_port_enabled = true;
        self
    }

    pub fn with_port_enabled(mut self, port_type: PortType, enabled: bool) -> Self {
        match port_type {
            PortType::Unsecure => self.port_enabled = enabled,
            PortType::Secure => self.secure_port_enabled = enabled,
        }
        self
    }

    pub fn with_vip_address(mut self, vip_address: impl Into<String>) -> Self {
        self.vip_address = Some(vip_address.into());
        self
    }

    pub fn with_secure_vip_address(mut self, secure_vip_address: impl Into<String>) -> Self {
        self.secure_vip_address = Some(secure_vip_address.into());
        self
    }

    pub fn with_status(mut self, status: InstanceStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_status_page_url(mut self, url: impl Into<String>) -> Self {
        self.status_page_url = Some(url.into());
        self
    }

    /// Append a health check URL, keeping the set free of duplicates
    pub fn with_health_check_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        if !self.health_check_urls.contains(&url) {
            self.health_check_urls.push(url);
        }
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check whether the given port accepts traffic
    pub fn is_port_enabled(&self, port_type: PortType) -> bool {
        match port_type {
            PortType::Unsecure => self.port_enabled,
            PortType::Secure => self.secure_port_enabled,
        }
    }

    pub fn health_check_urls(&self) -> &[String] {
        &self.health_check_urls
    }

    pub fn is_up(&self) -> bool {
        self.status == InstanceStatus::Up
    }
}

/// All instances registered under one application name
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Application {
    /// Application name as registered (usually upper case)
    pub name: String,

    /// Instances in registration order
    pub instances: Vec<InstanceInfo>,
}

impl Application {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
        }
    }

    pub fn with_instance(mut self, instance: InstanceInfo) -> Self {
        self.add_instance(instance);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instances(&self) -> &[InstanceInfo] {
        &self.instances
    }

    /// Add an instance, replacing any earlier record with the same instance id
    pub fn add_instance(&mut self, instance: InstanceInfo) {
        match self
            .instances
            .iter_mut()
            .find(|existing| existing.instance_id == instance.instance_id)
        {
            Some(existing) => *existing = instance,
            None => self.instances.push(instance),
        }
    }
}

/// Full registry snapshot: every application the registry client knows about
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Applications {
    /// Applications in registration order
    pub applications: Vec<Application>,
}

impl Applications {
    pub fn new(applications: Vec<Application>) -> Self {
        Self { applications }
    }

    pub fn registered_applications(&self) -> &[Application] {
        &self.applications
    }

    /// Look up an application by name, ignoring case
    pub fn registered_application(&self, name: &str) -> Option<&Application> {
        self.applications
            .iter()
            .find(|app| app.name.eq_ignore_ascii_case(name))
    }

    /// Add an instance under its application, creating the application at the end if new
    pub fn add_instance(&mut self, instance: InstanceInfo) {
        match self
            .applications
            .iter_mut()
            .find(|app| app.name.eq_ignore_ascii_case(&instance.app_name))
        {
            Some(app) => app.add_instance(instance),
            None => {
                let app = Application::new(instance.app_name.clone()).with_instance(instance);
                self.applications.push(app);
            }
        }
    }

    /// Every instance across all applications, in application then instance order
    pub fn instances(&self) -> impl Iterator<Item = &InstanceInfo> {
        self.applications.iter().flat_map(|app| app.instances.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_instance_defaults() {
        let info = InstanceInfo::new("ORDERS", "h1", 8080);

        assert_eq!(info.instance_id, "h1:orders:8080");
        assert_eq!(info.vip_address.as_deref(), Some("orders"));
        assert!(info.is_port_enabled(PortType::Unsecure));
        assert!(!info.is_port_enabled(PortType::Secure));
        assert!(info.is_up());
    }

    #[test]
    fn test_health_check_urls_keep_order_and_drop_duplicates() {
        let info = InstanceInfo::new("orders", "h1", 8080)
            .with_health_check_url("http://h1:8080/health")
            .with_health_check_url("https://h1:8443/health")
            .with_health_check_url("http://h1:8080/health");

        assert_eq!(
            info.health_check_urls(),
            &[
                "http://h1:8080/health".to_string(),
                "https://h1:8443/health".to_string()
            ]
        );
    }

    #[test]
    fn test_add_instance_groups_by_app_name_ignoring_case() {
        let mut apps = Applications::default();
        apps.add_instance(InstanceInfo::new("CART", "h1", 1));
        apps.add_instance(InstanceInfo::new("orders", "h2", 2));
        apps.add_instance(InstanceInfo::new("cart", "h3", 3));

        let names: Vec<&str> = apps.registered_applications().iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["CART", "orders"]);
        assert_eq!(apps.registered_application("Cart").unwrap().instances().len(), 2);
    }

    #[test]
    fn test_add_instance_replaces_same_instance_id() {
        let mut app = Application::new("cart");
        app.add_instance(InstanceInfo::new("cart", "h1", 1));
        app.add_instance(InstanceInfo::new("cart", "h1", 1).with_status(InstanceStatus::Down));

        assert_eq!(app.instances().len(), 1);
        assert_eq!(app.instances()[0].status, InstanceStatus::Down);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&InstanceStatus::OutOfService).unwrap();
        assert_eq!(json, "\"OUT_OF_SERVICE\"");
    }
}
