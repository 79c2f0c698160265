//! Health server for Kubernetes probes and Prometheus metrics.
//!
//! Provides:
//! - `/healthz` - Liveness probe (always returns 200 if server is running)
//! - `/readyz` - Readiness probe (returns 200 when ready to serve traffic)
//! - `/metrics` - Prometheus metrics endpoint

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabel, EncodeLabelSet, LabelSetEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use tokio::sync::RwLock;
use tracing::info;

/// Labels for admission request metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct AdmissionLabels {
    pub webhook: String,
    pub operation: String,
    pub allowed: bool,
}

impl EncodeLabelSet for AdmissionLabels {
    fn encode(&self, mut encoder: LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("webhook", self.webhook.as_str()).encode(encoder.encode_label())?;
        ("operation", self.operation.as_str()).encode(encoder.encode_label())?;
        let allowed = if self.allowed { "true" } else { "false" };
        ("allowed", allowed).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Labels for per-webhook metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct WebhookLabels {
    pub webhook: String,
}

impl EncodeLabelSet for WebhookLabels {
    fn encode(&self, mut encoder: LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("webhook", self.webhook.as_str()).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Labels for rejected fields, keyed by rule path rather than full path
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct FieldLabels {
    pub field: String,
    pub reason: String,
}

impl EncodeLabelSet for FieldLabels {
    fn encode(&self, mut encoder: LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("field", self.field.as_str()).encode(encoder.encode_label())?;
        ("reason", self.reason.as_str()).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Shared metrics for the admission server
pub struct Metrics {
    /// Admission requests by webhook, operation and outcome
    pub admission_requests_total: Family<AdmissionLabels, Counter>,
    /// Admission handling duration histogram
    pub admission_duration_seconds: Family<WebhookLabels, Histogram>,
    /// Field errors reported by validation
    pub validation_errors_total: Family<FieldLabels, Counter>,
    /// Prometheus registry
    registry: Registry,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance with registered metrics
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let admission_requests_total = Family::<AdmissionLabels, Counter>::default();
        registry.register(
            "barbican_admission_requests",
            "Total number of admission requests",
            admission_requests_total.clone(),
        );

        let admission_duration_seconds =
            Family::<WebhookLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.0001, 2.0, 15))
            });
        registry.register(
            "barbican_admission_duration_seconds",
            "Duration of admission request handling in seconds",
            admission_duration_seconds.clone(),
        );

        let validation_errors_total = Family::<FieldLabels, Counter>::default();
        registry.register(
            "barbican_validation_errors",
            "Total number of field errors reported by validation",
            validation_errors_total.clone(),
        );

        Self {
            admission_requests_total,
            admission_duration_seconds,
            validation_errors_total,
            registry,
        }
    }

    /// Record a handled admission request
    pub fn record_admission(
        &self,
        webhook: &str,
        operation: &str,
        allowed: bool,
        duration_secs: f64,
    ) {
        let labels = AdmissionLabels {
            webhook: webhook.to_string(),
            operation: operation.to_string(),
            allowed,
        };
        self.admission_requests_total.get_or_create(&labels).inc();
        self.admission_duration_seconds
            .get_or_create(&WebhookLabels {
                webhook: webhook.to_string(),
            })
            .observe(duration_secs);
    }

    /// Record a field rejected by validation.
    ///
    /// `field` must not carry map keys from the request.
    pub fn record_validation_error(&self, field: &str, reason: &str) {
        let labels = FieldLabels {
            field: field.to_string(),
            reason: reason.to_string(),
        };
        self.validation_errors_total.get_or_create(&labels).inc();
    }

    /// Encode metrics to Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        if encode(&mut buffer, &self.registry).is_err() {
            tracing::error!("Failed to encode metrics");
            return "# Error encoding metrics".to_string();
        }
        buffer
    }
}

/// Shared state for the health server
pub struct HealthState {
    /// Whether the operator is ready to admit requests
    ready: RwLock<bool>,
    /// Metrics registry
    pub metrics: Metrics,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create a new health state (starts as not ready)
    pub fn new() -> Self {
        Self {
            ready: RwLock::new(false),
            metrics: Metrics::new(),
        }
    }

    /// Mark the operator as ready or not ready
    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    /// Check if the operator is ready
    pub async fn is_ready(&self) -> bool {
        *self.ready.read().await
    }
}

/// Liveness probe handler
///
/// Returns 200 OK if the process is alive.
/// This is a simple check - if we can respond, we're alive.
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe handler
///
/// Returns 200 OK if the operator is ready to serve.
/// Returns 503 Service Unavailable if not ready.
async fn readyz(State(state): State<Arc<HealthState>>) -> Response {
    if state.is_ready().await {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
    }
}

/// Metrics handler
async fn metrics_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let body = state.metrics.encode();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// Create the health server router
pub fn create_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Default health server port
pub const HEALTH_PORT: u16 = 8080;

/// Run the health server
///
/// Binds to 0.0.0.0:`port` and serves health/metrics endpoints.
pub async fn run_health_server(state: Arc<HealthState>, port: u16) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Starting health server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
