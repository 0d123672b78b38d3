//! Protocol states of a pod in the deferred-scheduling flow.
//!
//! Only `Created -> Gated` happens at admission; `Gated -> Resolved` belongs
//! to the resolution controller.

use std::fmt;

use k8s_openapi::api::core::v1::Pod;

use super::contract::{NODE_AFFINITY_LABEL, NODE_AFFINITY_LABEL_VALUE_SET};

/// Placement state observed on a pod
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementState {
    /// No gate, affinity not resolved
    Created,
    /// Gate present, waiting for architecture resolution
    Gated,
    /// Gate removed and node affinity set
    Resolved,
}

impl PlacementState {
    /// Classify a pod by its gates and bookkeeping labels
    pub fn observe(pod: &Pod, gate_name: &str) -> Self {
        if has_scheduling_gate(pod, gate_name) {
            return PlacementState::Gated;
        }
        let affinity_set = pod
            .metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(NODE_AFFINITY_LABEL))
            .is_some_and(|value| value == NODE_AFFINITY_LABEL_VALUE_SET);
        if affinity_set {
            PlacementState::Resolved
        } else {
            PlacementState::Created
        }
    }
}

impl fmt::Display for PlacementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementState::Created => write!(f, "Created"),
            PlacementState::Gated => write!(f, "Gated"),
            PlacementState::Resolved => write!(f, "Resolved"),
        }
    }
}

/// Check whether the pod already carries the named gate (exact match, any position)
pub fn has_scheduling_gate(pod: &Pod, gate_name: &str) -> bool {
    pod.spec
        .as_ref()
        .and_then(|spec| spec.scheduling_gates.as_ref())
        .is_some_and(|gates| gates.iter().any(|gate| gate.name == gate_name))
}
