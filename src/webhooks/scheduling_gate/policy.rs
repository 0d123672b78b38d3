//! Namespace exemption policy.
//!
//! Infrastructure and control-plane pods must never wait on architecture
//! resolution: gating them can deadlock cluster bootstrap.

/// Namespace prefixes owned by the platform
pub const EXEMPT_NAMESPACE_PREFIXES: &[&str] = &["openshift-", "hypershift-", "kube-"];

/// Decides which namespaces are exempt from gating
#[derive(Clone, Debug)]
pub struct NamespaceExemptionPolicy {
    operator_namespace: String,
    prefixes: &'static [&'static str],
}

impl NamespaceExemptionPolicy {
    /// Create a policy exempting the operator's own namespace plus the platform prefixes
    pub fn new(operator_namespace: impl Into<String>) -> Self {
        Self {
            operator_namespace: operator_namespace.into(),
            prefixes: EXEMPT_NAMESPACE_PREFIXES,
        }
    }

    /// Check whether pods in `namespace` skip gating
    pub fn is_exempt(&self, namespace: &str) -> bool {
        namespace == self.operator_namespace
            || self
                .prefixes
                .iter()
                .any(|prefix| namespace.starts_with(prefix))
    }
}
