//! Scheduling-gate mutating webhook for pods.
//!
//! On pod creation, attaches the `multiarch.openshift.io/scheduling-gate`
//! scheduling gate and the bookkeeping labels the resolution controller
//! watches for. Pods in exempt namespaces and pods that already carry the
//! gate are admitted without a patch.

pub mod contract;
pub mod decoder;
pub mod injector;
pub mod patch;
pub mod policy;
pub mod state;

pub use contract::GateConfig;
pub use decoder::{DecodedPod, RequestDecoder};
pub use injector::{GateInjector, Injection};
pub use patch::ResponsePatchBuilder;
pub use policy::NamespaceExemptionPolicy;
pub use state::PlacementState;

use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse};
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Admission response plus the outcome name recorded in metrics
#[derive(Debug)]
pub struct Admission {
    pub response: AdmissionResponse,
    pub outcome: &'static str,
}

/// Stateless webhook: everything is built up front and only read afterwards
#[derive(Clone, Debug)]
pub struct SchedulingGateWebhook {
    decoder: RequestDecoder,
    injector: GateInjector,
    patcher: ResponsePatchBuilder,
}

impl SchedulingGateWebhook {
    /// Build the webhook for an operator running in `operator_namespace`
    pub fn new(gate: GateConfig, operator_namespace: impl Into<String>) -> Self {
        Self {
            decoder: RequestDecoder::new(),
            injector: GateInjector::new(gate, NamespaceExemptionPolicy::new(operator_namespace)),
            patcher: ResponsePatchBuilder::new(),
        }
    }

    pub fn injector(&self) -> &GateInjector {
        &self.injector
    }

    /// Decide the admission response for a pod creation request
    pub fn admit(&self, request: &AdmissionRequest<DynamicObject>) -> Admission {
        self.admit_decoded(request, self.decoder.decode(request))
    }

    /// Like [`admit`](Self::admit), for a request whose pod object was kept as
    /// raw JSON
    pub fn admit_object(
        &self,
        request: &AdmissionRequest<DynamicObject>,
        object: Option<Value>,
    ) -> Admission {
        self.admit_decoded(request, self.decoder.decode_object(request, object))
    }

    fn admit_decoded(
        &self,
        request: &AdmissionRequest<DynamicObject>,
        decoded: crate::webhooks::Result<DecodedPod>,
    ) -> Admission {
        let uid = &request.uid;
        debug!(
            uid = %uid,
            operation = ?request.operation,
            namespace = ?request.namespace,
            name = ?request.name,
            "Processing pod admission request"
        );

        let DecodedPod {
            raw,
            pod,
            namespace,
        } = match decoded {
            Ok(decoded) => decoded,
            Err(e) => {
                warn!(uid = %uid, error = %e, "Failed to decode pod");
                return Admission {
                    response: self.patcher.errored(request, &e),
                    outcome: e.outcome(),
                };
            }
        };

        let observed = PlacementState::observe(&pod, self.injector.gate().gate_name());
        let injection = self.injector.inject(&namespace, pod);
        let outcome = injection.outcome();

        if !injection.is_mutated() {
            info!(
                uid = %uid,
                namespace = %namespace,
                state = %observed,
                outcome,
                "Pod admitted unchanged"
            );
            return Admission {
                response: self.patcher.unchanged(request),
                outcome,
            };
        }

        match self.patcher.try_build(request, &raw, injection.pod()) {
            Ok(response) => {
                info!(
                    uid = %uid,
                    namespace = %namespace,
                    gate = %self.injector.gate().gate_name(),
                    "Pod gated pending architecture resolution"
                );
                Admission { response, outcome }
            }
            Err(e) => {
                error!(uid = %uid, namespace = %namespace, error = %e, "Failed to build pod patch");
                Admission {
                    response: self.patcher.errored(request, &e),
                    outcome: e.outcome(),
                }
            }
        }
    }
}
