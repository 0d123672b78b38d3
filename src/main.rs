//! pod-placement-webhook - gates new pods until their image architectures are known.
//!
//! This is the main entry point that:
//! - Initializes structured logging
//! - Parses configuration from flags and environment
//! - Starts the health server and the TLS admission webhook server

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{error, info};

use pod_placement_webhook::health::{HealthState, run_health_server};
use pod_placement_webhook::{
    Config, GateConfig, SchedulingGateWebhook, WebhookState, run_webhook_server,
};

/// Grace period for in-flight admission calls to complete during shutdown
const SHUTDOWN_GRACE_PERIOD_SECS: u64 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pod_placement_webhook=info".parse()?)
                .add_directive("kube=info".parse()?),
        )
        .json()
        .init();

    let config = Config::parse();
    info!(
        operator_namespace = %config.operator_namespace,
        webhook_port = config.webhook_port,
        health_port = config.health_port,
        "Starting pod-placement-webhook"
    );

    // Create shared health state
    let health_state = Arc::new(HealthState::new());

    // Build the webhook before any request can reach it
    let gate = GateConfig::default();
    info!(gate = %gate.gate_name(), "Scheduling gate configured");
    let webhook_state = Arc::new(WebhookState::new(
        SchedulingGateWebhook::new(gate, config.operator_namespace.clone()),
        Some(health_state.clone()),
    ));

    // Start health server immediately so liveness works while TLS loads
    let health_handle = {
        let health_state = health_state.clone();
        let port = config.health_port;
        tokio::spawn(async move { run_health_server(health_state, port).await })
    };

    let webhook_handle = {
        let config = config.clone();
        tokio::spawn(async move {
            run_webhook_server(
                webhook_state,
                &config.cert_path,
                &config.key_path,
                config.webhook_port,
            )
            .await
        })
    };

    // Wait for any task to complete (or fail), or shutdown signal
    tokio::select! {
        result = webhook_handle => {
            match result {
                Ok(Ok(())) => {
                    error!("Webhook server exited unexpectedly");
                    return Err("webhook server exited unexpectedly".into());
                }
                Ok(Err(e)) => {
                    error!("Webhook server error: {}", e);
                    return Err(e.into());
                }
                Err(e) => {
                    error!("Webhook server task panicked: {}", e);
                    return Err(e.into());
                }
            }
        }
        result = health_handle => {
            match result {
                Ok(Ok(())) => {
                    error!("Health server exited unexpectedly");
                    return Err("health server exited unexpectedly".into());
                }
                Ok(Err(e)) => {
                    error!("Health server error: {}", e);
                    return Err(e.into());
                }
                Err(e) => {
                    error!("Health server task panicked: {}", e);
                    return Err(e.into());
                }
            }
        }
        // Handle graceful shutdown on SIGTERM or SIGINT
        _ = shutdown_signal() => {
            info!("Received shutdown signal, initiating graceful shutdown...");

            // Mark as not ready so the endpoint is removed from the Service
            health_state.set_ready(false).await;
            info!("Marked webhook as not ready");

            info!(
                "Waiting {}s for in-flight admission calls to complete...",
                SHUTDOWN_GRACE_PERIOD_SECS
            );
            tokio::time::sleep(Duration::from_secs(SHUTDOWN_GRACE_PERIOD_SECS)).await;

            info!("Grace period complete, shutting down");
        }
    }

    info!("Webhook stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
///
/// Note: Signal handler setup failures are fatal - the process cannot shut down
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
