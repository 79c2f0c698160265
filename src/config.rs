//! Process-wide Barbican spec defaults.
//!
//! The defaults bundle is read once at startup (flags or the
//! `RELATED_IMAGE_*` environment variables set by the operator bundle),
//! validated, then frozen behind an `Arc` and handed to the webhook handlers.

use clap::Args;
use thiserror::Error;
use tracing::info;

/// Fallback API image when `RELATED_IMAGE_BARBICAN_API_IMAGE_URL_DEFAULT` is unset
pub const BARBICAN_API_CONTAINER_IMAGE: &str =
    "quay.io/podified-antelope-centos9/openstack-barbican-api:current-podified";
/// Fallback worker image
pub const BARBICAN_WORKER_CONTAINER_IMAGE: &str =
    "quay.io/podified-antelope-centos9/openstack-barbican-worker:current-podified";
/// Fallback keystone listener image
pub const BARBICAN_KEYSTONE_LISTENER_CONTAINER_IMAGE: &str =
    "quay.io/podified-antelope-centos9/openstack-barbican-keystone-listener:current-podified";
/// Fallback API timeout in seconds
pub const BARBICAN_API_TIMEOUT: i32 = 90;

/// Errors in the defaults bundle
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A default container image is empty
    #[error("default container image for {0} must not be empty")]
    EmptyImage(&'static str),

    /// The default API timeout is zero or negative
    #[error("default API timeout must be positive (got {0})")]
    InvalidTimeout(i32),
}

/// Defaults applied to unset Barbican spec fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BarbicanDefaults {
    pub api_container_image_url: String,
    pub worker_container_image_url: String,
    pub keystone_listener_container_image_url: String,
    /// Seconds
    pub api_timeout: i32,
}

impl Default for BarbicanDefaults {
    fn default() -> Self {
        Self {
            api_container_image_url: BARBICAN_API_CONTAINER_IMAGE.to_string(),
            worker_container_image_url: BARBICAN_WORKER_CONTAINER_IMAGE.to_string(),
            keystone_listener_container_image_url: BARBICAN_KEYSTONE_LISTENER_CONTAINER_IMAGE
                .to_string(),
            api_timeout: BARBICAN_API_TIMEOUT,
        }
    }
}

impl BarbicanDefaults {
    /// Check the bundle before serving admission traffic.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_container_image_url.is_empty() {
            return Err(ConfigError::EmptyImage("barbican-api"));
        }
        if self.worker_container_image_url.is_empty() {
            return Err(ConfigError::EmptyImage("barbican-worker"));
        }
        if self.keystone_listener_container_image_url.is_empty() {
            return Err(ConfigError::EmptyImage("barbican-keystone-listener"));
        }
        if self.api_timeout <= 0 {
            return Err(ConfigError::InvalidTimeout(self.api_timeout));
        }
        Ok(())
    }
}

/// Command line and environment source for [`BarbicanDefaults`].
#[derive(Args, Clone, Debug)]
pub struct DefaultsArgs {
    /// Default Barbican API container image
    #[arg(
        long,
        env = "RELATED_IMAGE_BARBICAN_API_IMAGE_URL_DEFAULT",
        default_value = BARBICAN_API_CONTAINER_IMAGE
    )]
    pub api_image: String,

    /// Default Barbican worker container image
    #[arg(
        long,
        env = "RELATED_IMAGE_BARBICAN_WORKER_IMAGE_URL_DEFAULT",
        default_value = BARBICAN_WORKER_CONTAINER_IMAGE
    )]
    pub worker_image: String,

    /// Default Barbican keystone listener container image
    #[arg(
        long,
        env = "RELATED_IMAGE_BARBICAN_KEYSTONE_LISTENER_IMAGE_URL_DEFAULT",
        default_value = BARBICAN_KEYSTONE_LISTENER_CONTAINER_IMAGE
    )]
    pub keystone_listener_image: String,

    /// Default API timeout in seconds
    #[arg(long, env = "BARBICAN_API_TIMEOUT", default_value_t = BARBICAN_API_TIMEOUT)]
    pub api_timeout: i32,
}

impl DefaultsArgs {
    /// Build and validate the frozen defaults bundle.
    pub fn into_defaults(self) -> Result<BarbicanDefaults, ConfigError> {
        let defaults = BarbicanDefaults {
            api_container_image_url: self.api_image,
            worker_container_image_url: self.worker_image,
            keystone_listener_container_image_url: self.keystone_listener_image,
            api_timeout: self.api_timeout,
        };
        defaults.validate()?;
        info!(
            api_image = %defaults.api_container_image_url,
            worker_image = %defaults.worker_container_image_url,
            keystone_listener_image = %defaults.keystone_listener_container_image_url,
            api_timeout = defaults.api_timeout,
            "Barbican defaults initialized"
        );
        Ok(defaults)
    }
}
