//! PKCS#11 consistency policy.
//!
//! Enforced on CREATE and UPDATE alike:
//! - `pkcs11` in `enabledSecretStores` requires the `pkcs11` block

use crate::crd::{BarbicanSpec, SecretStore};
use crate::webhooks::field::{FieldError, FieldErrorList, FieldPath};

/// Detail reported when the HSM block is missing
pub const PKCS11_REQUIRED_MESSAGE: &str =
    "PKCS11 specification is missing, PKCS11 is required when pkcs11 is an enabled SecretStore";

/// Append a required-field error at `<base_path>.PKCS11` when the PKCS#11
/// store is enabled without its configuration.
pub fn validate(spec: &BarbicanSpec, base_path: &FieldPath, errors: &mut FieldErrorList) {
    if spec.enabled_secret_stores.contains(&SecretStore::Pkcs11) && spec.pkcs11.is_none() {
        errors.push(FieldError::required(
            &base_path.child("PKCS11"),
            PKCS11_REQUIRED_MESSAGE,
        ));
    }
}
