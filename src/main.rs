//! barbican-operator - admission webhooks for Barbican custom resources.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Freezes the spec defaults from flags and environment
//! - Starts the health server, and the webhook server when certificates exist

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use kube::CustomResourceExt;
use tokio::signal;
use tracing::{error, info};

use barbican_operator::crd::Barbican;
use barbican_operator::{
    DefaultsArgs, HEALTH_PORT, HealthState, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT,
    WebhookState, run_health_server, run_webhook_server,
};

/// Grace period for in-flight admission requests during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[derive(Parser, Debug)]
#[command(name = "barbican-operator", version, about)]
struct Cli {
    /// Print the Barbican CRD as YAML and exit
    #[arg(long)]
    crd: bool,

    #[command(flatten)]
    defaults: DefaultsArgs,

    /// Webhook server port
    #[arg(long, env = "WEBHOOK_PORT", default_value_t = WEBHOOK_PORT)]
    webhook_port: u16,

    /// Health and metrics server port
    #[arg(long, env = "HEALTH_PORT", default_value_t = HEALTH_PORT)]
    health_port: u16,

    /// Webhook TLS certificate (PEM)
    #[arg(long, env = "WEBHOOK_CERT_PATH", default_value = WEBHOOK_CERT_PATH)]
    cert_path: String,

    /// Webhook TLS private key (PEM)
    #[arg(long, env = "WEBHOOK_KEY_PATH", default_value = WEBHOOK_KEY_PATH)]
    key_path: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.crd {
        print!("{}", serde_yaml::to_string(&Barbican::crd())?);
        return Ok(());
    }

    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("barbican_operator=info".parse()?),
        )
        .json()
        .init();

    info!("Starting barbican-operator");

    let defaults = Arc::new(cli.defaults.into_defaults()?);

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    let health_handle = {
        let health_state = health_state.clone();
        let port = cli.health_port;
        tokio::spawn(async move {
            if let Err(e) = run_health_server(health_state, port).await {
                error!("Health server error: {}", e);
            }
        })
    };

    let webhook_handle =
        if Path::new(&cli.cert_path).exists() && Path::new(&cli.key_path).exists() {
            info!("TLS certificates found, starting webhook server");
            let state = Arc::new(WebhookState::new(defaults, Some(health_state.clone())));
            let (port, cert_path, key_path) = (cli.webhook_port, cli.cert_path, cli.key_path);
            Some(tokio::spawn(async move {
                if let Err(e) = run_webhook_server(state, port, &cert_path, &key_path).await {
                    error!("Webhook server error: {}", e);
                }
            }))
        } else {
            info!("Webhook certificates not found, webhook server disabled");
            None
        };

    health_state.set_ready(webhook_handle.is_some()).await;

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = health_handle => {
            if let Err(e) = result {
                error!("Health server task panicked: {}", e);
            }
        }
        result = async {
            match webhook_handle {
                Some(handle) => handle.await,
                None => std::future::pending().await,
            }
        } => {
            if let Err(e) = result {
                error!("Webhook server task panicked: {}", e);
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready to stop receiving new requests
            health_state.set_ready(false).await;
            info!("Marked operator as not ready");

            info!(
                "Waiting {}s for in-flight admission requests to complete...",
                SHUTDOWN_GRACE_PERIOD_SECS
            );
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("Operator stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the operator cannot shut down
/// gracefully without them. Using expect() here is intentional.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
