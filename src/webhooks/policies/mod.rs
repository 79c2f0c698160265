//! Validation policies for Barbican admission webhooks.
//!
//! Rules run in a fixed order and every error is collected:
//! 1. Service override validity (`service_override`), both spec variants
//! 2. PKCS#11 consistency (`pkcs11`), full spec only
//!
//! CREATE and UPDATE currently share the same rules. UPDATE receives the
//! previous spec so rules that compare old and new can be added without
//! changing callers.

pub mod pkcs11;
pub mod service_override;

use kube::ResourceExt;
use kube::core::admission::Operation;
use tracing::{debug, info};

use crate::crd::{BARBICAN_GROUP, BARBICAN_KIND, Barbican, BarbicanSpec, BarbicanSpecCore};
use crate::error::{Error, Result};
use crate::webhooks::field::{FieldErrorList, FieldPath};
use crate::webhooks::overrides::OverrideValidator;

impl BarbicanSpec {
    /// Validate a spec being created, with field paths rooted at `base_path`.
    pub fn validate_create<V>(&self, base_path: &FieldPath, overrides: &V) -> FieldErrorList
    where
        V: OverrideValidator + ?Sized,
    {
        let mut errors = service_override::validate(&self.barbican_api, base_path, overrides);
        pkcs11::validate(self, base_path, &mut errors);
        errors
    }

    /// Validate a spec being updated from `_old`.
    pub fn validate_update<V>(
        &self,
        _old: &BarbicanSpec,
        base_path: &FieldPath,
        overrides: &V,
    ) -> FieldErrorList
    where
        V: OverrideValidator + ?Sized,
    {
        let mut errors = service_override::validate(&self.barbican_api, base_path, overrides);
        pkcs11::validate(self, base_path, &mut errors);
        errors
    }
}

impl BarbicanSpecCore {
    /// Validate a core spec being created. The core variant has no secret
    /// store settings, so only the override rule applies.
    pub fn validate_create<V>(&self, base_path: &FieldPath, overrides: &V) -> FieldErrorList
    where
        V: OverrideValidator + ?Sized,
    {
        service_override::validate(&self.barbican_api, base_path, overrides)
    }

    /// Validate a core spec being updated from `_old`.
    pub fn validate_update<V>(
        &self,
        _old: &BarbicanSpecCore,
        base_path: &FieldPath,
        overrides: &V,
    ) -> FieldErrorList
    where
        V: OverrideValidator + ?Sized,
    {
        service_override::validate(&self.barbican_api, base_path, overrides)
    }
}

impl Barbican {
    /// Validate a Barbican being created.
    pub fn validate_create<V>(&self, overrides: &V) -> Result<()>
    where
        V: OverrideValidator + ?Sized,
    {
        info!(name = %self.name_any(), "validate create");
        let errors = self.spec.validate_create(&FieldPath::new("spec"), overrides);
        self.invalid_if_any(errors)
    }

    /// Validate a Barbican being updated.
    ///
    /// `old` is the persisted object; its absence is a contract violation
    /// and is reported as [`Error::Internal`].
    pub fn validate_update<V>(&self, old: Option<&Barbican>, overrides: &V) -> Result<()>
    where
        V: OverrideValidator + ?Sized,
    {
        info!(name = %self.name_any(), "validate update");
        let old = old.ok_or_else(|| Error::Internal("unable to convert existing object".into()))?;
        let errors = self
            .spec
            .validate_update(&old.spec, &FieldPath::new("spec"), overrides);
        self.invalid_if_any(errors)
    }

    /// Deletion is always allowed.
    pub fn validate_delete(&self) -> Result<()> {
        info!(name = %self.name_any(), "validate delete");
        Ok(())
    }

    fn invalid_if_any(&self, errors: FieldErrorList) -> Result<()> {
        if errors.is_empty() {
            return Ok(());
        }
        Err(Error::Invalid {
            kind: BARBICAN_KIND.to_string(),
            group: BARBICAN_GROUP.to_string(),
            name: self.name_any(),
            errors,
        })
    }
}

/// Context for validation
pub struct ValidationContext<'a> {
    /// The resource being validated
    pub resource: &'a Barbican,
    /// The old resource (for UPDATE operations)
    pub old_resource: Option<&'a Barbican>,
    /// Admission operation
    pub operation: Operation,
    /// Whether this is a dry-run request
    pub dry_run: bool,
    /// The namespace of the resource
    pub namespace: Option<&'a str>,
}

impl<'a> ValidationContext<'a> {
    /// Check if this is an UPDATE operation
    pub fn is_update(&self) -> bool {
        self.operation == Operation::Update
    }
}

/// Run the validation entry point matching the admission operation
pub fn validate_all<V>(ctx: &ValidationContext<'_>, overrides: &V) -> Result<()>
where
    V: OverrideValidator + ?Sized,
{
    debug!(
        operation = ?ctx.operation,
        namespace = ctx.namespace.unwrap_or_default(),
        dry_run = ctx.dry_run,
        "validating admission request"
    );
    match ctx.operation {
        Operation::Create => ctx.resource.validate_create(overrides),
        Operation::Update => ctx.resource.validate_update(ctx.old_resource, overrides),
        Operation::Delete => ctx.resource.validate_delete(),
        Operation::Connect => Ok(()),
    }
}
