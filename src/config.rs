//! Process configuration.
//!
//! Every value can come from a flag or an environment variable; the
//! Deployment normally sets `POD_NAMESPACE` through the downward API.

use std::path::PathBuf;

use clap::Parser;

use crate::health::HEALTH_PORT;
use crate::webhooks::{WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT};

/// Namespace the operator is installed into when nothing else is configured
pub const DEFAULT_OPERATOR_NAMESPACE: &str = "openshift-multiarch-operator";

/// Pod placement scheduling-gate admission webhook
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "pod-placement-webhook", version, about, long_about = None)]
pub struct Config {
    /// Namespace the operator runs in; its pods are never gated
    #[arg(long, env = "POD_NAMESPACE", default_value = DEFAULT_OPERATOR_NAMESPACE)]
    pub operator_namespace: String,

    /// TLS certificate served by the webhook (PEM)
    #[arg(long, env = "WEBHOOK_CERT_PATH", default_value = WEBHOOK_CERT_PATH)]
    pub cert_path: PathBuf,

    /// TLS private key served by the webhook (PEM)
    #[arg(long, env = "WEBHOOK_KEY_PATH", default_value = WEBHOOK_KEY_PATH)]
    pub key_path: PathBuf,

    /// Webhook HTTPS port
    #[arg(long, env = "WEBHOOK_PORT", default_value_t = WEBHOOK_PORT)]
    pub webhook_port: u16,

    /// Health and metrics HTTP port
    #[arg(long, env = "HEALTH_PORT", default_value_t = HEALTH_PORT)]
    pub health_port: u16,
}
