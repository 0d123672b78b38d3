//! pod-placement-webhook library crate
//!
//! Mutating admission webhook that holds new pods behind the
//! `multiarch.openshift.io/scheduling-gate` scheduling gate until their
//! images' architectures have been resolved.

pub mod config;
pub mod health;
pub mod image;
pub mod webhooks;

pub use config::Config;
pub use health::HealthState;
pub use webhooks::{
    GateConfig, SchedulingGateWebhook, WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT,
    WebhookError, WebhookState, run_webhook_server,
};
