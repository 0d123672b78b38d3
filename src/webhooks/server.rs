//! Admission webhook server.
//!
//! Serves the pod scheduling-gate mutation endpoint over TLS. The API server
//! is expected to reach it through a MutatingWebhookConfiguration with:
//!
//! - path `/add-pod-scheduling-gate`, resources `pods`, verbs `create`
//! - `sideEffects: None`, `failurePolicy: Ignore`
//! - `admissionReviewVersions: ["v1"]`
//!
//! The TLS certificate and key are usually mounted from a cert-manager secret.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::health::HealthState;
use crate::webhooks::scheduling_gate::SchedulingGateWebhook;

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;
/// Path the MutatingWebhookConfiguration points at
pub const SCHEDULING_GATE_PATH: &str = "/add-pod-scheduling-gate";

/// Shared state for webhook handlers
pub struct WebhookState {
    pub webhook: SchedulingGateWebhook,
    /// Optional health state for metrics and readiness
    pub health_state: Option<Arc<HealthState>>,
}

impl WebhookState {
    pub fn new(webhook: SchedulingGateWebhook, health_state: Option<Arc<HealthState>>) -> Self {
        Self {
            webhook,
            health_state,
        }
    }

    fn record(&self, outcome: &str, started: Instant) {
        if let Some(health) = &self.health_state {
            health
                .metrics
                .record_admission(outcome, started.elapsed().as_secs_f64());
        }
    }
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(SCHEDULING_GATE_PATH, post(add_pod_scheduling_gate))
        .with_state(state)
}

/// Split a review body into its request envelope and the raw pod object.
///
/// The object (and old object) are taken out before the envelope is typed, so
/// only envelope problems fail here. Problems inside the pod are left to the
/// decoder.
fn split_review(
    body: &[u8],
) -> Result<(AdmissionRequest<DynamicObject>, Option<Value>), String> {
    let mut review: Value =
        serde_json::from_slice(body).map_err(|e| format!("body is not JSON: {}", e))?;

    let object = match review.get_mut("request").and_then(Value::as_object_mut) {
        Some(request) => {
            request.remove("oldObject");
            request.remove("object")
        }
        None => None,
    };

    let review: AdmissionReview<DynamicObject> =
        serde_json::from_value(review).map_err(|e| e.to_string())?;
    let request: AdmissionRequest<DynamicObject> =
        review.try_into().map_err(|e| format!("{}", e))?;
    Ok((request, object))
}

/// Pod scheduling-gate mutation handler
pub async fn add_pod_scheduling_gate(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> (StatusCode, Json<AdmissionReview<DynamicObject>>) {
    let started = Instant::now();

    let (request, object) = match split_review(&body) {
        Ok(parts) => parts,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            state.record("invalid", started);
            return (
                StatusCode::BAD_REQUEST,
                Json(
                    AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e))
                        .into_review(),
                ),
            );
        }
    };

    let admission = state.webhook.admit_object(&request, object);
    state.record(admission.outcome, started);

    (StatusCode::OK, Json(admission.response.into_review()))
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// Certificate or key file not present
    #[error("TLS file not found: {}", .0.display())]
    MissingCertificate(PathBuf),

    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Mark `health` ready once the server behind `handle` is listening.
///
/// Readiness is left untouched if the server fails to bind.
async fn mark_ready_when_listening(handle: Handle, health: Arc<HealthState>) {
    match handle.listening().await {
        Some(addr) => {
            info!(%addr, "Webhook server bound, marking ready");
            health.set_ready(true).await;
        }
        None => warn!("Webhook server failed to bind, staying not ready"),
    }
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0:`port` and serves the scheduling-gate endpoint. The
/// health state is marked ready once the listener is bound.
///
/// # Arguments
/// * `state` - Shared webhook state
/// * `cert_path` - Path to TLS certificate file (PEM format)
/// * `key_path` - Path to TLS private key file (PEM format)
/// * `port` - Listen port
pub async fn run_webhook_server(
    state: Arc<WebhookState>,
    cert_path: &Path,
    key_path: &Path,
    port: u16,
) -> Result<(), WebhookError> {
    for path in [cert_path, key_path] {
        if !path.exists() {
            return Err(WebhookError::MissingCertificate(path.to_path_buf()));
        }
    }

    let config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let handle = Handle::new();
    if let Some(health) = state.health_state.clone() {
        tokio::spawn(mark_ready_when_listening(handle.clone(), health));
    }
    let app = create_webhook_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, path = SCHEDULING_GATE_PATH, "Starting webhook server with TLS");

    axum_server::bind_rustls(addr, config)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
