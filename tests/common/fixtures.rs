//! Test fixtures and builder patterns for pods and admission reviews.

#![allow(dead_code)]

use k8s_openapi::api::core::v1::{Affinity, Container, Pod, PodSchedulingGate, PodSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionReview};
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Builder for creating Pod test fixtures.
///
/// # Example
/// ```
/// let pod = PodBuilder::new("web")
///     .namespace("default")
///     .gate("example.com/other")
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct PodBuilder {
    name: String,
    namespace: Option<String>,
    gates: Option<Vec<String>>,
    labels: BTreeMap<String, String>,
    affinity: Option<Affinity>,
}

impl PodBuilder {
    /// Create a new builder with the given pod name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            gates: None,
            labels: BTreeMap::new(),
            affinity: None,
        }
    }

    /// Set the namespace for the pod.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Append a scheduling gate.
    pub fn gate(mut self, name: impl Into<String>) -> Self {
        self.gates.get_or_insert_with(Vec::new).push(name.into());
        self
    }

    /// Add a label to the pod.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Set the pod affinity.
    pub fn affinity(mut self, affinity: Affinity) -> Self {
        self.affinity = Some(affinity);
        self
    }

    /// Build the Pod.
    pub fn build(self) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: self.namespace,
                labels: if self.labels.is_empty() {
                    None
                } else {
                    Some(self.labels)
                },
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: self.name,
                    image: Some("quay.io/example/app:latest".to_string()),
                    ..Default::default()
                }],
                scheduling_gates: self.gates.map(|gates| {
                    gates
                        .into_iter()
                        .map(|name| PodSchedulingGate { name })
                        .collect()
                }),
                affinity: self.affinity,
                ..Default::default()
            }),
            status: None,
        }
    }

    /// Build the Pod as a raw JSON object.
    pub fn build_raw(self) -> Value {
        serde_json::to_value(self.build()).unwrap_or_default()
    }
}

impl Default for PodBuilder {
    fn default() -> Self {
        Self::new("test-pod")
    }
}

/// Wrap a raw pod object into a CREATE AdmissionReview.
pub fn pod_review(object: Value) -> AdmissionReview<DynamicObject> {
    let namespace = object
        .pointer("/metadata/namespace")
        .cloned()
        .unwrap_or(Value::Null);
    let name = object
        .pointer("/metadata/name")
        .cloned()
        .unwrap_or_else(|| json!(""));
    serde_json::from_value(json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": "e911857d-c318-11e8-bbad-025000000001",
            "kind": {"group": "", "version": "v1", "kind": "Pod"},
            "resource": {"group": "", "version": "v1", "resource": "pods"},
            "requestKind": {"group": "", "version": "v1", "kind": "Pod"},
            "requestResource": {"group": "", "version": "v1", "resource": "pods"},
            "name": name,
            "namespace": namespace,
            "operation": "CREATE",
            "userInfo": {"username": "system:serviceaccount:default:deployer"},
            "object": object,
            "dryRun": false,
        },
    }))
    .unwrap_or_else(|e| panic!("fixture review must deserialize: {e}"))
}

/// Wrap a raw pod object into a CREATE AdmissionRequest.
pub fn pod_request(object: Value) -> AdmissionRequest<DynamicObject> {
    pod_review(object)
        .try_into()
        .unwrap_or_else(|e| panic!("fixture review must carry a request: {e}"))
}

/// Apply a JSON patch (as carried in an admission response) to `original`.
pub fn apply_patch(original: &Value, patch: &[u8]) -> Value {
    let patch: json_patch::Patch =
        serde_json::from_slice(patch).unwrap_or_else(|e| panic!("patch must parse: {e}"));
    let mut doc = original.clone();
    json_patch::patch(&mut doc, &patch.0).unwrap_or_else(|e| panic!("patch must apply: {e}"));
    doc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let pod = PodBuilder::new("test").build();
        assert_eq!(pod.metadata.name, Some("test".to_string()));
        assert!(pod.spec.unwrap().scheduling_gates.is_none());
    }

    #[test]
    fn test_builder_with_options() {
        let pod = PodBuilder::new("test")
            .namespace("my-ns")
            .gate("a/b")
            .label("app", "test")
            .build();

        assert_eq!(pod.metadata.namespace, Some("my-ns".to_string()));
        assert_eq!(pod.spec.unwrap().scheduling_gates.unwrap().len(), 1);
        assert!(pod.metadata.labels.is_some());
    }
}
