//! Gate and bookkeeping-label contract shared with the resolution controller.
//!
//! The resolution controller finds gated pods by these exact keys and values,
//! so changing any of them is a breaking change for the whole protocol.

use k8s_openapi::api::core::v1::PodSchedulingGate;

/// Name of the scheduling gate held on pods awaiting architecture resolution
pub const SCHEDULING_GATE_NAME: &str = "multiarch.openshift.io/scheduling-gate";

/// Label recording that the gate was added by this webhook
pub const SCHEDULING_GATE_LABEL: &str = "multiarch.openshift.io/scheduling-gate";
/// Value written on admission
pub const SCHEDULING_GATE_LABEL_VALUE_GATED: &str = "gated";
/// Value written by the resolution controller once the gate is gone
pub const SCHEDULING_GATE_LABEL_VALUE_REMOVED: &str = "removed";

/// Label recording the node-affinity resolution state
pub const NODE_AFFINITY_LABEL: &str = "multiarch.openshift.io/node-affinity";
/// Value written on admission
pub const NODE_AFFINITY_LABEL_VALUE_UNSET: &str = "unset";
/// Value written by the resolution controller after computing affinity
pub const NODE_AFFINITY_LABEL_VALUE_SET: &str = "set";

/// Immutable gate configuration, built once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateConfig {
    gate_name: String,
}

impl GateConfig {
    pub fn new(gate_name: impl Into<String>) -> Self {
        Self {
            gate_name: gate_name.into(),
        }
    }

    pub fn gate_name(&self) -> &str {
        &self.gate_name
    }

    /// The gate entry appended to a pod's `spec.schedulingGates`
    pub fn scheduling_gate(&self) -> PodSchedulingGate {
        PodSchedulingGate {
            name: self.gate_name.clone(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self::new(SCHEDULING_GATE_NAME)
    }
}
