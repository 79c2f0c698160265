//! barbican-operator library crate
//!
//! This module exports the Barbican CRD types, process defaults, the
//! admission webhooks and the health server.

pub mod config;
pub mod crd;
pub mod error;
pub mod health;
pub mod webhooks;

pub use config::{BarbicanDefaults, DefaultsArgs};
pub use error::{Error, Result};
pub use health::{HEALTH_PORT, HealthState, run_health_server};
pub use webhooks::{
    MUTATE_PATH, VALIDATE_PATH, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError,
    WebhookState, run_webhook_server,
};
