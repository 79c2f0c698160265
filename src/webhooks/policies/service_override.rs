//! Service override policy.
//!
//! Enforced on CREATE and UPDATE for both spec variants:
//! - the API role's `override.service` map is handed to the override validator

use crate::crd::BarbicanApiTemplate;
use crate::webhooks::field::{FieldErrorList, FieldPath};
use crate::webhooks::overrides::OverrideValidator;

/// Validate the API role's service overrides at
/// `<base_path>.barbicanAPI.override.service`.
pub fn validate<V>(api: &BarbicanApiTemplate, base_path: &FieldPath, validator: &V) -> FieldErrorList
where
    V: OverrideValidator + ?Sized,
{
    let path = base_path
        .child("barbicanAPI")
        .child("override")
        .child("service");
    validator.validate_routed_overrides(&path, &api.override_.service)
}
