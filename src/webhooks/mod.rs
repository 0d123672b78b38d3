//! Webhook module for mutating admission requests.
//!
//! Holds the pod scheduling-gate webhook and the TLS server hosting it.

pub mod error;
pub mod scheduling_gate;
mod server;

pub use error::{Error, Result};
pub use scheduling_gate::{GateConfig, SchedulingGateWebhook};
pub use server::{
    SCHEDULING_GATE_PATH, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError,
    WebhookState, add_pod_scheduling_gate, create_webhook_router, run_webhook_server,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
