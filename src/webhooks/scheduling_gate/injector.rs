//! Idempotent scheduling-gate injection.

use k8s_openapi::api::core::v1::{Affinity, Pod};

use super::contract::{
    GateConfig, NODE_AFFINITY_LABEL, NODE_AFFINITY_LABEL_VALUE_UNSET, SCHEDULING_GATE_LABEL,
    SCHEDULING_GATE_LABEL_VALUE_GATED,
};
use super::policy::NamespaceExemptionPolicy;
use super::state::has_scheduling_gate;

/// Outcome of running the injector on a pod
#[derive(Clone, Debug, PartialEq)]
pub enum Injection {
    /// Namespace is exempt, pod untouched
    Exempt(Pod),
    /// Gate already present, pod untouched (labels are not repaired)
    AlreadyGated(Pod),
    /// Gate, labels and affinity applied
    Gated(Pod),
}

impl Injection {
    /// Whether the pod differs from the decoded input
    pub fn is_mutated(&self) -> bool {
        matches!(self, Injection::Gated(_))
    }

    pub fn pod(&self) -> &Pod {
        match self {
            Injection::Exempt(pod) | Injection::AlreadyGated(pod) | Injection::Gated(pod) => pod,
        }
    }

    pub fn into_pod(self) -> Pod {
        match self {
            Injection::Exempt(pod) | Injection::AlreadyGated(pod) | Injection::Gated(pod) => pod,
        }
    }

    /// Short outcome name used in logs and metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            Injection::Exempt(_) => "exempt",
            Injection::AlreadyGated(_) => "already_gated",
            Injection::Gated(_) => "gated",
        }
    }
}

/// Adds the scheduling gate and bookkeeping labels to non-exempt pods
#[derive(Clone, Debug)]
pub struct GateInjector {
    gate: GateConfig,
    policy: NamespaceExemptionPolicy,
}

impl GateInjector {
    pub fn new(gate: GateConfig, policy: NamespaceExemptionPolicy) -> Self {
        Self { gate, policy }
    }

    pub fn gate(&self) -> &GateConfig {
        &self.gate
    }

    /// Run the injection for a pod living in `namespace`.
    ///
    /// A pod that already carries the gate is returned as-is, even when its
    /// bookkeeping labels are missing or stale.
    pub fn inject(&self, namespace: &str, mut pod: Pod) -> Injection {
        if self.policy.is_exempt(namespace) {
            return Injection::Exempt(pod);
        }

        if has_scheduling_gate(&pod, self.gate.gate_name()) {
            return Injection::AlreadyGated(pod);
        }

        let spec = pod.spec.get_or_insert_with(Default::default);
        spec.scheduling_gates
            .get_or_insert_with(Vec::new)
            .push(self.gate.scheduling_gate());

        // Scheduler mishandles gated pods whose affinity is nil (kubernetes/kubernetes#118052)
        if spec.affinity.is_none() {
            spec.affinity = Some(Affinity::default());
        }

        let labels = pod.metadata.labels.get_or_insert_with(Default::default);
        labels.insert(
            SCHEDULING_GATE_LABEL.to_string(),
            SCHEDULING_GATE_LABEL_VALUE_GATED.to_string(),
        );
        labels.insert(
            NODE_AFFINITY_LABEL.to_string(),
            NODE_AFFINITY_LABEL_VALUE_UNSET.to_string(),
        );

        Injection::Gated(pod)
    }
}
