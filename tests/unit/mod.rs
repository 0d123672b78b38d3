// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic,
    clippy::string_slice
)]

//! Unit tests for pod-placement-webhook.
//!
//! These tests run without a Kubernetes cluster and drive the admission
//! decision through the public API, from AdmissionReview JSON to patch.

#[path = "../common/mod.rs"]
mod common;

mod scenario_tests {
    use crate::common::fixtures::{PodBuilder, apply_patch, pod_request};
    use k8s_openapi::api::core::v1::{
        Affinity, NodeAffinity, NodeSelector, NodeSelectorRequirement, NodeSelectorTerm,
    };
    use pod_placement_webhook::webhooks::scheduling_gate::contract::{
        NODE_AFFINITY_LABEL, SCHEDULING_GATE_LABEL, SCHEDULING_GATE_NAME,
    };
    use pod_placement_webhook::{GateConfig, SchedulingGateWebhook};
    use serde_json::json;

    fn webhook() -> SchedulingGateWebhook {
        SchedulingGateWebhook::new(GateConfig::default(), "openshift-multiarch-operator")
    }

    /// Scenario A: pod in `default` with no gates gets gated
    #[test]
    fn test_default_namespace_pod_is_gated() {
        let original = PodBuilder::new("web").namespace("default").build_raw();
        let admission = webhook().admit(&pod_request(original.clone()));

        assert!(admission.response.allowed);
        assert_eq!(admission.outcome, "gated");

        let patched = apply_patch(&original, admission.response.patch.as_ref().unwrap());
        assert_eq!(
            patched["spec"]["schedulingGates"],
            json!([{"name": SCHEDULING_GATE_NAME}])
        );
        assert_eq!(
            patched["metadata"]["labels"],
            json!({
                SCHEDULING_GATE_LABEL: "gated",
                NODE_AFFINITY_LABEL: "unset",
            })
        );
        assert_eq!(patched["spec"]["affinity"], json!({}));
    }

    /// Scenario B: infrastructure namespace is left alone
    #[test]
    fn test_openshift_namespace_is_exempt() {
        let original = PodBuilder::new("mcd")
            .namespace("openshift-machine-config-operator")
            .build_raw();
        let admission = webhook().admit(&pod_request(original));

        assert!(admission.response.allowed);
        assert_eq!(admission.outcome, "exempt");
        assert!(admission.response.patch.is_none());
    }

    /// Scenario C: an already-gated pod missing its labels is not repaired
    #[test]
    fn test_already_gated_pod_is_not_relabelled() {
        let original = PodBuilder::new("web")
            .namespace("default")
            .gate(SCHEDULING_GATE_NAME)
            .build_raw();
        let admission = webhook().admit(&pod_request(original));

        assert!(admission.response.allowed);
        assert_eq!(admission.outcome, "already_gated");
        assert!(admission.response.patch.is_none());
    }

    /// Scenario D: malformed object is rejected with 400 and no patch
    #[test]
    fn test_malformed_object_is_bad_request() {
        let mut original = PodBuilder::new("web").namespace("default").build_raw();
        original["spec"]["schedulingGates"] = json!({"name": SCHEDULING_GATE_NAME});
        let admission = webhook().admit(&pod_request(original));

        assert!(!admission.response.allowed);
        assert_eq!(admission.outcome, "decode_error");
        assert_eq!(admission.response.result.code, 400);
        assert!(admission.response.patch.is_none());
    }

    #[test]
    fn test_operator_namespace_is_exempt() {
        let webhook = SchedulingGateWebhook::new(GateConfig::default(), "multiarch-tuning");
        let original = PodBuilder::new("controller")
            .namespace("multiarch-tuning")
            .build_raw();
        let admission = webhook.admit(&pod_request(original));
        assert_eq!(admission.outcome, "exempt");
    }

    #[test]
    fn test_foreign_gates_and_labels_survive() {
        let original = PodBuilder::new("web")
            .namespace("team-a")
            .gate("example.com/quota")
            .label("app", "web")
            .build_raw();
        let admission = webhook().admit(&pod_request(original.clone()));

        let patched = apply_patch(&original, admission.response.patch.as_ref().unwrap());
        assert_eq!(
            patched["spec"]["schedulingGates"],
            json!([{"name": "example.com/quota"}, {"name": SCHEDULING_GATE_NAME}])
        );
        assert_eq!(patched["metadata"]["labels"]["app"], "web");
        assert_eq!(patched["metadata"]["labels"][SCHEDULING_GATE_LABEL], "gated");
        // containers are untouched by the patch
        assert_eq!(patched["spec"]["containers"], original["spec"]["containers"]);
    }

    #[test]
    fn test_existing_affinity_kept_through_patch() {
        let affinity = Affinity {
            node_affinity: Some(NodeAffinity {
                required_during_scheduling_ignored_during_execution: Some(NodeSelector {
                    node_selector_terms: vec![NodeSelectorTerm {
                        match_expressions: Some(vec![NodeSelectorRequirement {
                            key: "kubernetes.io/arch".to_string(),
                            operator: "In".to_string(),
                            values: Some(vec!["arm64".to_string()]),
                        }]),
                        ..Default::default()
                    }],
                }),
                ..Default::default()
            }),
            ..Default::default()
        };
        let original = PodBuilder::new("web")
            .namespace("default")
            .affinity(affinity)
            .build_raw();
        let admission = webhook().admit(&pod_request(original.clone()));

        let patched = apply_patch(&original, admission.response.patch.as_ref().unwrap());
        assert_eq!(patched["spec"]["affinity"], original["spec"]["affinity"]);
    }

    #[test]
    fn test_namespace_taken_from_request_when_object_has_none() {
        let original = PodBuilder::new("web").build_raw();
        let mut request = pod_request(original);
        request.namespace = Some("kube-public".to_string());

        let admission = webhook().admit(&request);
        assert_eq!(admission.outcome, "exempt");
    }

    #[test]
    fn test_second_admission_of_patched_pod_is_noop() {
        let original = PodBuilder::new("web").namespace("default").build_raw();
        let first = webhook().admit(&pod_request(original.clone()));
        let patched = apply_patch(&original, first.response.patch.as_ref().unwrap());

        let second = webhook().admit(&pod_request(patched));
        assert_eq!(second.outcome, "already_gated");
        assert!(second.response.patch.is_none());
    }

    #[test]
    fn test_response_echoes_request_uid() {
        let original = PodBuilder::new("web").namespace("default").build_raw();
        let request = pod_request(original);
        let admission = webhook().admit(&request);
        assert_eq!(admission.response.uid, request.uid);
    }
}

mod placement_state_tests {
    use crate::common::fixtures::PodBuilder;
    use pod_placement_webhook::webhooks::scheduling_gate::PlacementState;
    use pod_placement_webhook::webhooks::scheduling_gate::contract::{
        NODE_AFFINITY_LABEL, NODE_AFFINITY_LABEL_VALUE_SET, SCHEDULING_GATE_LABEL,
        SCHEDULING_GATE_LABEL_VALUE_REMOVED, SCHEDULING_GATE_NAME,
    };
    use pod_placement_webhook::{GateConfig, SchedulingGateWebhook};

    #[test]
    fn test_created_to_gated_transition() {
        let webhook =
            SchedulingGateWebhook::new(GateConfig::default(), "openshift-multiarch-operator");
        let pod = PodBuilder::new("web").namespace("default").build();
        assert_eq!(
            PlacementState::observe(&pod, SCHEDULING_GATE_NAME),
            PlacementState::Created
        );

        let gated = webhook.injector().inject("default", pod).into_pod();
        assert_eq!(
            PlacementState::observe(&gated, SCHEDULING_GATE_NAME),
            PlacementState::Gated
        );
    }

    #[test]
    fn test_resolved_pod_as_left_by_controller() {
        let pod = PodBuilder::new("web")
            .namespace("default")
            .label(SCHEDULING_GATE_LABEL, SCHEDULING_GATE_LABEL_VALUE_REMOVED)
            .label(NODE_AFFINITY_LABEL, NODE_AFFINITY_LABEL_VALUE_SET)
            .build();
        assert_eq!(
            PlacementState::observe(&pod, SCHEDULING_GATE_NAME),
            PlacementState::Resolved
        );
    }
}

mod error_tests {
    use pod_placement_webhook::webhooks::Error;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(Error::MissingObject.status_code().as_u16(), 400);
        assert_eq!(Error::Patch("x".to_string()).status_code().as_u16(), 500);
    }
}
