//! Barbican Custom Resource Definition.
//!
//! Defines the Barbican CRD for deploying the Barbican key manager (API,
//! worker and keystone listener) on Kubernetes. The spec is layered by
//! composition:
//!
//! - [`BarbicanSpec`]: the full resource spec, one template per role plus
//!   secret store configuration.
//! - [`BarbicanSpecCore`]: the reduced variant embedded by the control plane
//!   aggregator, carrying the API role and the API timeout.
//! - [`BarbicanSpecBase`]: fields shared by both, flattened into their JSON
//!   form.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// API group of the Barbican resource
pub const BARBICAN_GROUP: &str = "barbican.openstack.org";

/// Kind of the Barbican resource
pub const BARBICAN_KIND: &str = "Barbican";

/// Barbican is a custom resource for deploying the Barbican key manager.
///
/// Example:
/// ```yaml
/// apiVersion: barbican.openstack.org/v1beta1
/// kind: Barbican
/// metadata:
///   name: barbican
/// spec:
///   databaseInstance: openstack
///   secret: osp-secret
///   enabledSecretStores:
///     - pkcs11
///   pkcs11:
///     clientDataPath: /usr/local/luna/config
///     loginSecret: hsm-login
///     clientDataSecret: hsm-client-data
///   barbicanAPI:
///     override:
///       service:
///         internal:
///           spec:
///             type: LoadBalancer
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "barbican.openstack.org",
    version = "v1beta1",
    kind = "Barbican",
    plural = "barbicans",
    status = "BarbicanStatus",
    namespaced,
    derive = "PartialEq",
    derive = "Default",
    printcolumn = r#"{"name":"Status", "type":"string", "jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct BarbicanSpec {
    /// Shared deployment settings.
    #[serde(flatten)]
    pub base: BarbicanSpecBase,

    /// Barbican API role.
    #[serde(default, rename = "barbicanAPI")]
    pub barbican_api: BarbicanApiTemplate,

    /// Barbican worker role.
    #[serde(default)]
    pub barbican_worker: BarbicanWorkerTemplate,

    /// Barbican keystone listener role.
    #[serde(default)]
    pub barbican_keystone_listener: BarbicanKeystoneListenerTemplate,

    /// Secret stores enabled for this deployment.
    #[serde(default)]
    pub enabled_secret_stores: Vec<SecretStore>,

    /// Secret store used when a request does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_default_secret_store: Option<SecretStore>,

    /// Hardware security module settings, required when `pkcs11` is an
    /// enabled secret store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkcs11: Option<Pkcs11Spec>,
}

/// Reduced Barbican spec embedded by the control plane aggregator.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarbicanSpecCore {
    /// Shared deployment settings.
    #[serde(flatten)]
    pub base: BarbicanSpecBase,

    /// Barbican API role.
    #[serde(default, rename = "barbicanAPI")]
    pub barbican_api: BarbicanApiTemplate,

    /// Timeout in seconds for API requests, also used for the route timeout.
    #[serde(default, rename = "apiTimeout")]
    pub api_timeout: i32,
}

/// Settings shared by [`BarbicanSpec`] and [`BarbicanSpecCore`].
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarbicanSpecBase {
    /// Keystone service user (default: barbican).
    #[serde(default = "default_service_user")]
    pub service_user: String,

    /// MariaDB instance name.
    #[serde(default)]
    pub database_instance: String,

    /// MariaDB account name (default: barbican).
    #[serde(default = "default_database_account")]
    pub database_account: String,

    /// RabbitMQ cluster used for notifications (default: rabbitmq).
    #[serde(default = "default_rabbitmq_cluster_name")]
    pub rabbit_mq_cluster_name: String,

    /// Secret holding service passwords.
    #[serde(default)]
    pub secret: String,

    /// Secret holding the simple crypto key encryption key.
    #[serde(default)]
    pub simple_crypto_backend_secret: String,

    /// Extra configuration merged into every service's config.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_service_config: String,

    /// Config files that replace the generated defaults, keyed by file name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub default_config_overwrite: BTreeMap<String, String>,

    /// Node selector applied to every role unless the role sets its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,
}

impl Default for BarbicanSpecBase {
    fn default() -> Self {
        Self {
            service_user: default_service_user(),
            database_instance: String::new(),
            database_account: default_database_account(),
            rabbit_mq_cluster_name: default_rabbitmq_cluster_name(),
            secret: String::new(),
            simple_crypto_backend_secret: String::new(),
            custom_service_config: String::new(),
            default_config_overwrite: BTreeMap::new(),
            node_selector: None,
        }
    }
}

fn default_service_user() -> String {
    "barbican".to_string()
}

fn default_database_account() -> String {
    "barbican".to_string()
}

fn default_rabbitmq_cluster_name() -> String {
    "rabbitmq".to_string()
}

fn default_replicas() -> Option<i32> {
    Some(1)
}

/// Barbican API role template.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarbicanApiTemplate {
    /// Container image. Empty means the operator default.
    #[serde(default)]
    pub container_image: String,

    /// Number of API pods (default: 1).
    #[serde(default = "default_replicas")]
    pub replicas: Option<i32>,

    /// Node selector for API pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    /// Extra configuration for the API service only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_service_config: String,

    /// Overrides for the generated Kubernetes services.
    #[serde(default, rename = "override")]
    pub override_: ApiOverrideSpec,
}

impl Default for BarbicanApiTemplate {
    fn default() -> Self {
        Self {
            container_image: String::new(),
            replicas: default_replicas(),
            node_selector: None,
            custom_service_config: String::new(),
            override_: ApiOverrideSpec::default(),
        }
    }
}

/// Barbican worker role template.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarbicanWorkerTemplate {
    /// Container image. Empty means the operator default.
    #[serde(default)]
    pub container_image: String,

    /// Number of worker pods (default: 1).
    #[serde(default = "default_replicas")]
    pub replicas: Option<i32>,

    /// Node selector for worker pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    /// Extra configuration for the worker only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_service_config: String,
}

impl Default for BarbicanWorkerTemplate {
    fn default() -> Self {
        Self {
            container_image: String::new(),
            replicas: default_replicas(),
            node_selector: None,
            custom_service_config: String::new(),
        }
    }
}

/// Barbican keystone listener role template.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarbicanKeystoneListenerTemplate {
    /// Container image. Empty means the operator default.
    #[serde(default)]
    pub container_image: String,

    /// Number of listener pods (default: 1).
    #[serde(default = "default_replicas")]
    pub replicas: Option<i32>,

    /// Node selector for listener pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    /// Extra configuration for the listener only.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub custom_service_config: String,
}

impl Default for BarbicanKeystoneListenerTemplate {
    fn default() -> Self {
        Self {
            container_image: String::new(),
            replicas: default_replicas(),
            node_selector: None,
            custom_service_config: String::new(),
        }
    }
}

/// Overrides applied to resources generated for the API role.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiOverrideSpec {
    /// Service overrides keyed by endpoint type (`internal`, `public`).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub service: BTreeMap<String, RoutedOverrideSpec>,
}

/// Override for one generated Service.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutedOverrideSpec {
    /// Labels and annotations merged into the Service metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<OverrideMetadata>,

    /// Service spec fields to override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<OverrideServiceSpec>,
}

/// Metadata merged into an overridden Service.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideMetadata {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// Service spec fields that may be overridden.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverrideServiceSpec {
    /// Service type (ClusterIP, LoadBalancer or NodePort).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

/// Backend storing secret material.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SecretStore {
    /// Software key encryption key held in a Kubernetes Secret.
    SimpleCrypto,
    /// Hardware security module reached through a PKCS#11 library.
    Pkcs11,
}

impl std::fmt::Display for SecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStore::SimpleCrypto => write!(f, "simple_crypto"),
            SecretStore::Pkcs11 => write!(f, "pkcs11"),
        }
    }
}

/// Hardware security module settings for the PKCS#11 secret store.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pkcs11Spec {
    /// Directory the HSM client data is mounted at.
    pub client_data_path: String,

    /// Secret holding the HSM login PIN.
    pub login_secret: String,

    /// Secret holding HSM client certificates and configuration.
    pub client_data_secret: String,
}

/// Status of a Barbican resource.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarbicanStatus {
    /// Summary phase reported by the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,

    /// Generation last processed by the controller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,

    /// Ready API pods.
    #[serde(default)]
    pub barbican_api_ready_count: i32,

    /// Ready worker pods.
    #[serde(default)]
    pub barbican_worker_ready_count: i32,

    /// Ready keystone listener pods.
    #[serde(default)]
    pub barbican_keystone_listener_ready_count: i32,
}
