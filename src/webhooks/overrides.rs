//! Service override validation.
//!
//! The rule engine treats override checking as a collaborator behind
//! [`OverrideValidator`]; [`RoutedOverrideValidator`] is the implementation the
//! webhook server uses.

use std::collections::BTreeMap;

use super::field::{FieldError, FieldErrorList, FieldPath};
use crate::crd::RoutedOverrideSpec;

/// Endpoint types a routed service override may be keyed by
pub const ENDPOINT_TYPES: &[&str] = &["internal", "public"];

/// Service types an override may request
pub const SERVICE_TYPES: &[&str] = &["ClusterIP", "LoadBalancer", "NodePort"];

/// Validates the service override map of a role.
pub trait OverrideValidator {
    /// Check `overrides` located at `path`, returning every problem found.
    fn validate_routed_overrides(
        &self,
        path: &FieldPath,
        overrides: &BTreeMap<String, RoutedOverrideSpec>,
    ) -> FieldErrorList;
}

/// Default override validator for routed (internal/public) services.
#[derive(Clone, Copy, Debug, Default)]
pub struct RoutedOverrideValidator;

impl OverrideValidator for RoutedOverrideValidator {
    fn validate_routed_overrides(
        &self,
        path: &FieldPath,
        overrides: &BTreeMap<String, RoutedOverrideSpec>,
    ) -> FieldErrorList {
        let mut errors = FieldErrorList::new();

        for (endpoint, spec) in overrides {
            let entry = path.key(endpoint);

            if !ENDPOINT_TYPES.contains(&endpoint.as_str()) {
                errors.push(FieldError::not_supported(&entry, endpoint, ENDPOINT_TYPES));
            }

            let service_type = spec.spec.as_ref().and_then(|s| s.type_.as_deref());
            if let Some(service_type) = service_type.filter(|t| !SERVICE_TYPES.contains(t)) {
                errors.push(FieldError::not_supported(
                    &entry.child("spec").child("type"),
                    service_type,
                    SERVICE_TYPES,
                ));
            }

            if let Some(metadata) = &spec.metadata {
                let metadata_path = entry.child("metadata");
                for key in metadata.labels.keys().filter(|k| k.is_empty()) {
                    errors.push(FieldError::invalid(
                        &metadata_path.child("labels"),
                        key,
                        "label key must not be empty",
                    ));
                }
                for key in metadata.annotations.keys().filter(|k| k.is_empty()) {
                    errors.push(FieldError::invalid(
                        &metadata_path.child("annotations"),
                        key,
                        "annotation key must not be empty",
                    ));
                }
            }
        }

        errors
    }
}
