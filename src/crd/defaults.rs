//! Defaulting for the Barbican spec hierarchy.
//!
//! Each tier fills only fields still at their zero value, then delegates to
//! the embedded [`BarbicanSpecBase`] last. Defaulting never overwrites a value
//! supplied by the caller and cannot fail.

use kube::ResourceExt;
use tracing::info;

use super::barbican::{Barbican, BarbicanSpec, BarbicanSpecBase, BarbicanSpecCore};
use crate::config::BarbicanDefaults;

fn fill_image(image: &mut String, default: &str) {
    if image.is_empty() {
        *image = default.to_string();
    }
}

impl Barbican {
    /// Apply defaults to the resource spec (mutating admission).
    pub fn apply_defaults(&mut self, defaults: &BarbicanDefaults) {
        info!(name = %self.name_any(), "default");
        self.spec.apply_defaults(defaults);
    }
}

impl BarbicanSpec {
    /// Fill unset role images, then the shared base.
    pub fn apply_defaults(&mut self, defaults: &BarbicanDefaults) {
        fill_image(
            &mut self.barbican_api.container_image,
            &defaults.api_container_image_url,
        );
        fill_image(
            &mut self.barbican_worker.container_image,
            &defaults.worker_container_image_url,
        );
        fill_image(
            &mut self.barbican_keystone_listener.container_image,
            &defaults.keystone_listener_container_image_url,
        );
        self.base.apply_defaults(defaults);
    }
}

impl BarbicanSpecCore {
    /// Fill the API timeout and API image, then the shared base.
    ///
    /// Used by the control plane aggregator, which embeds this variant.
    pub fn apply_defaults(&mut self, defaults: &BarbicanDefaults) {
        if self.api_timeout == 0 {
            self.api_timeout = defaults.api_timeout;
        }
        fill_image(
            &mut self.barbican_api.container_image,
            &defaults.api_container_image_url,
        );
        self.base.apply_defaults(defaults);
    }
}

impl BarbicanSpecBase {
    /// Shared defaults. Runs after the embedding tier has filled its own fields.
    pub fn apply_defaults(&mut self, _defaults: &BarbicanDefaults) {}
}
