//! Admission webhook server.
//!
//! Provides HTTP endpoints for the Barbican admission webhooks:
//! - `/mutate-barbican-openstack-org-v1beta1-barbican` applies spec defaults
//!   and answers with a JSON patch
//! - `/validate-barbican-openstack-org-v1beta1-barbican` runs the validation
//!   policies
//!
//! To enable webhooks:
//! 1. Deploy cert-manager for TLS certificates
//! 2. Create the MutatingWebhookConfiguration and ValidatingWebhookConfiguration
//! 3. Mount the TLS certificate secret to the operator pod at /etc/webhook/certs/
//!
//! The webhook server starts automatically when certificates are present.

use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use kube::Resource;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::BarbicanDefaults;
use crate::crd::Barbican;
use crate::health::{HealthState, Metrics};
use crate::webhooks::overrides::{OverrideValidator, RoutedOverrideValidator};
use crate::webhooks::policies::{ValidationContext, validate_all};

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;

/// Path of the defaulting webhook
pub const MUTATE_PATH: &str = "/mutate-barbican-openstack-org-v1beta1-barbican";
/// Path of the validating webhook
pub const VALIDATE_PATH: &str = "/validate-barbican-openstack-org-v1beta1-barbican";

/// Shared state for webhook handlers
pub struct WebhookState {
    /// Frozen process-wide spec defaults
    pub defaults: Arc<BarbicanDefaults>,
    /// Service override validator
    pub overrides: RoutedOverrideValidator,
    /// Optional health state for admission metrics
    pub health_state: Option<Arc<HealthState>>,
}

impl WebhookState {
    pub fn new(defaults: Arc<BarbicanDefaults>, health_state: Option<Arc<HealthState>>) -> Self {
        Self {
            defaults,
            overrides: RoutedOverrideValidator,
            health_state,
        }
    }

    fn record(&self, webhook: &str, operation: &Operation, allowed: bool, started: Instant) {
        if let Some(state) = &self.health_state {
            state.metrics.record_admission(
                webhook,
                operation_name(operation),
                allowed,
                started.elapsed().as_secs_f64(),
            );
        }
    }
}

fn operation_name(operation: &Operation) -> &'static str {
    match operation {
        Operation::Create => "CREATE",
        Operation::Update => "UPDATE",
        Operation::Delete => "DELETE",
        Operation::Connect => "CONNECT",
    }
}

/// Create a denial response with reason embedded in message.
/// kube-rs deny() only sets status.message, so we format as "[reason] message"
fn deny_with_reason<K: Resource>(
    request: &AdmissionRequest<K>,
    message: &str,
    reason: &str,
) -> AdmissionResponse {
    let full_message = format!("[{}] {}", reason, message);
    AdmissionResponse::from(request).deny(full_message)
}

/// Default a Barbican admission request.
///
/// The patch is computed from the object exactly as submitted to its
/// defaulted form, so it applies to the document the API server holds.
/// Returns a plain allow when nothing changed.
pub fn mutate_request(
    request: &AdmissionRequest<DynamicObject>,
    defaults: &BarbicanDefaults,
) -> AdmissionResponse {
    let uid = &request.uid;

    if request.operation == Operation::Delete {
        debug!(uid = %uid, "Mutation skipped (DELETE)");
        return AdmissionResponse::from(request);
    }

    let Some(object) = &request.object else {
        error!(uid = %uid, "Missing object in request");
        return deny_with_reason(request, "Missing object in request", "InvalidRequest");
    };

    let patch = match default_patch(object, defaults) {
        Ok(patch) => patch,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to default object");
            return deny_with_reason(request, &e.to_string(), e.reason());
        }
    };

    if patch.0.is_empty() {
        debug!(uid = %uid, "No defaults to apply");
        return AdmissionResponse::from(request);
    }

    info!(uid = %uid, patch_ops = patch.0.len(), "Applying defaults");
    match AdmissionResponse::from(request).with_patch(patch) {
        Ok(response) => response,
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to serialize patch");
            deny_with_reason(request, &format!("patch serialization error: {e}"), "InternalError")
        }
    }
}

/// Diff the submitted object against its defaulted form.
fn default_patch(
    object: &DynamicObject,
    defaults: &BarbicanDefaults,
) -> crate::error::Result<json_patch::Patch> {
    let submitted: Value = serde_json::to_value(object)?;
    let mut resource: Barbican = serde_json::from_value(submitted.clone())?;
    resource.apply_defaults(defaults);
    let defaulted = serde_json::to_value(&resource)?;
    Ok(json_patch::diff(&submitted, &defaulted))
}

/// Validate a Barbican admission request.
///
/// Rejected fields are counted in `metrics` when given.
pub fn validate_request<V>(
    request: &AdmissionRequest<Barbican>,
    overrides: &V,
    metrics: Option<&Metrics>,
) -> AdmissionResponse
where
    V: OverrideValidator + ?Sized,
{
    let uid = &request.uid;

    let resource = match (&request.object, &request.operation) {
        (Some(obj), _) => obj,
        (None, Operation::Delete) => {
            info!(uid = %uid, "Admission request allowed (DELETE)");
            return AdmissionResponse::from(request);
        }
        (None, _) => {
            error!(uid = %uid, "Missing object in request");
            return deny_with_reason(request, "Missing object in request", "InvalidRequest");
        }
    };

    let ctx = ValidationContext {
        resource,
        old_resource: request.old_object.as_ref(),
        operation: request.operation.clone(),
        dry_run: request.dry_run,
        namespace: request.namespace.as_deref(),
    };

    match validate_all(&ctx, overrides) {
        Ok(()) => {
            info!(uid = %uid, "Admission request allowed");
            AdmissionResponse::from(request)
        }
        Err(e) if e.is_internal() => {
            error!(uid = %uid, error = %e, "Admission request failed");
            deny_with_reason(request, &e.to_string(), e.reason())
        }
        Err(e) => {
            if let Some(metrics) = metrics {
                for field_error in e.field_errors() {
                    metrics.record_validation_error(
                        field_error.rule_path(),
                        field_error.error_type.reason(),
                    );
                }
            }
            warn!(
                uid = %uid,
                errors = e.field_errors().len(),
                message = %e,
                "Admission request denied"
            );
            deny_with_reason(request, &e.to_string(), e.reason())
        }
    }
}

fn extract_request<K: Resource>(
    review: AdmissionReview<K>,
) -> Result<AdmissionRequest<K>, (StatusCode, Json<AdmissionReview<DynamicObject>>)> {
    review.try_into().map_err(|e: kube::core::admission::ConvertAdmissionReviewError| {
        error!(error = %e, "Failed to extract admission request");
        (
            StatusCode::BAD_REQUEST,
            Json(AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e)).into_review()),
        )
    })
}

/// Defaulting webhook handler
async fn mutate_barbican(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request = match extract_request(review) {
        Ok(req) => req,
        Err(rejection) => return rejection,
    };

    debug!(
        uid = %request.uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = ?request.name,
        "Processing mutation request"
    );

    let response = mutate_request(&request, &state.defaults);
    state.record("mutate", &request.operation, response.allowed, started);
    (StatusCode::OK, Json(response.into_review()))
}

/// Validating webhook handler
async fn validate_barbican(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<Barbican>>,
) -> impl IntoResponse {
    let started = Instant::now();
    let request = match extract_request(review) {
        Ok(req) => req,
        Err(rejection) => return rejection,
    };

    debug!(
        uid = %request.uid,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = ?request.name,
        "Processing admission request"
    );

    let metrics = state.health_state.as_ref().map(|h| &h.metrics);
    let response = validate_request(&request, &state.overrides, metrics);
    state.record("validate", &request.operation, response.allowed, started);
    (StatusCode::OK, Json(response.into_review()))
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(MUTATE_PATH, post(mutate_barbican))
        .route(VALIDATE_PATH, post(validate_barbican))
        .with_state(state)
}

/// Errors that can occur when running the webhook server
#[derive(Debug)]
pub enum WebhookError {
    /// TLS configuration error
    TlsConfig(String),
    /// Server error
    Server(String),
}

impl std::fmt::Display for WebhookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookError::TlsConfig(msg) => write!(f, "TLS configuration error: {}", msg),
            WebhookError::Server(msg) => write!(f, "Webhook server error: {}", msg),
        }
    }
}

impl std::error::Error for WebhookError {}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0:`port` and serves the mutating and validating endpoints.
///
/// # Arguments
/// * `state` - Shared webhook state (defaults, validators, metrics)
/// * `port` - Listen port
/// * `cert_path` - Path to TLS certificate file (PEM format)
/// * `key_path` - Path to TLS private key file (PEM format)
pub async fn run_webhook_server(
    state: Arc<WebhookState>,
    port: u16,
    cert_path: &str,
    key_path: &str,
) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let app = create_webhook_router(state);

    let config = RustlsConfig::from_pem_file(PathBuf::from(cert_path), PathBuf::from(key_path))
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
