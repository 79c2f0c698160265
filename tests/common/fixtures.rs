//! Test fixtures and builder patterns for Barbican.

use barbican_operator::crd::{
    Barbican, BarbicanSpec, Pkcs11Spec, RoutedOverrideSpec, SecretStore,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Builder for creating Barbican test fixtures.
///
/// # Example
/// ```
/// let resource = BarbicanBuilder::new("barbican")
///     .namespace("openstack")
///     .secret_stores(vec![SecretStore::Pkcs11])
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct BarbicanBuilder {
    name: String,
    namespace: Option<String>,
    spec: BarbicanSpec,
}

impl BarbicanBuilder {
    /// Create a new builder with the given resource name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            spec: BarbicanSpec::default(),
        }
    }

    /// Set the namespace for the resource.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the API container image.
    pub fn api_image(mut self, image: impl Into<String>) -> Self {
        self.spec.barbican_api.container_image = image.into();
        self
    }

    /// Set the worker container image.
    pub fn worker_image(mut self, image: impl Into<String>) -> Self {
        self.spec.barbican_worker.container_image = image.into();
        self
    }

    /// Set the keystone listener container image.
    pub fn keystone_listener_image(mut self, image: impl Into<String>) -> Self {
        self.spec.barbican_keystone_listener.container_image = image.into();
        self
    }

    /// Set the enabled secret stores.
    pub fn secret_stores(mut self, stores: Vec<SecretStore>) -> Self {
        self.spec.enabled_secret_stores = stores;
        self
    }

    /// Attach a PKCS#11 configuration block.
    pub fn pkcs11(mut self) -> Self {
        self.spec.pkcs11 = Some(Pkcs11Spec {
            client_data_path: "/usr/local/luna/config".to_string(),
            login_secret: "hsm-login".to_string(),
            client_data_secret: "hsm-client-data".to_string(),
        });
        self
    }

    /// Add a service override for an API endpoint.
    pub fn service_override(mut self, endpoint: impl Into<String>, spec: RoutedOverrideSpec) -> Self {
        self.spec
            .barbican_api
            .override_
            .service
            .insert(endpoint.into(), spec);
        self
    }

    /// Build the Barbican.
    pub fn build(self) -> Barbican {
        Barbican {
            metadata: ObjectMeta {
                name: Some(self.name),
                namespace: self.namespace,
                ..Default::default()
            },
            spec: self.spec,
            status: None,
        }
    }
}

impl Default for BarbicanBuilder {
    fn default() -> Self {
        Self::new("barbican")
    }
}

/// Create a minimal Barbican for testing.
pub fn minimal_resource(name: &str) -> Barbican {
    BarbicanBuilder::new(name).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let resource = BarbicanBuilder::new("test").build();
        assert_eq!(resource.metadata.name, Some("test".to_string()));
        assert!(resource.spec.enabled_secret_stores.is_empty());
        assert!(resource.spec.pkcs11.is_none());
    }

    #[test]
    fn test_builder_with_options() {
        let resource = BarbicanBuilder::new("test")
            .namespace("openstack")
            .api_image("custom/api:1")
            .secret_stores(vec![SecretStore::Pkcs11])
            .pkcs11()
            .build();

        assert_eq!(resource.metadata.namespace, Some("openstack".to_string()));
        assert_eq!(resource.spec.barbican_api.container_image, "custom/api:1");
        assert!(resource.spec.pkcs11.is_some());
    }
}
