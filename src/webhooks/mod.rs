//! Admission webhooks for Barbican resources.
//!
//! Defaulting fills unset container images and timeouts from the process
//! defaults. Validation collects field errors from every policy:
//! - Service overrides: endpoint names, service types, metadata keys
//! - PKCS#11: enabling the store requires its configuration block
//!
//! Route timeout annotation reconciliation lives here too since it shares
//! the core spec with the webhooks.

pub mod annotations;
pub mod field;
pub mod overrides;
pub mod policies;
mod server;

pub use field::{ErrorType, FieldError, FieldErrorList, FieldPath};
pub use overrides::{OverrideValidator, RoutedOverrideValidator};
pub use policies::{ValidationContext, validate_all};
pub use server::{
    MUTATE_PATH, VALIDATE_PATH, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError,
    WebhookState, create_webhook_router, mutate_request, run_webhook_server, validate_request,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
