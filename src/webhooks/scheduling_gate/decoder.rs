//! Decoding of admission requests into typed pods.

use k8s_openapi::api::core::v1::Pod;
use kube::core::admission::AdmissionRequest;
use kube::core::{DynamicObject, GroupVersionKind};
use serde_json::Value;

use crate::webhooks::error::{Error, Result};

/// A decoded pod together with the raw object it came from
#[derive(Clone, Debug)]
pub struct DecodedPod {
    /// Object the patch is computed against.
    ///
    /// When decoded from the request body this is the object exactly as
    /// received. When decoded from an already-typed `DynamicObject` it is that
    /// object re-serialized, so metadata fields `ObjectMeta` does not model
    /// (unknown keys, `creationTimestamp: null`) are missing, and applying the
    /// patch to the wire object reproduces the mutated pod only up to those
    /// fields.
    pub raw: Value,
    /// Typed view of `raw`
    pub pod: Pod,
    /// Namespace from the object, falling back to the request namespace
    pub namespace: String,
}

/// Decodes admission request objects as core/v1 Pods.
///
/// Built once at webhook construction and shared read-only across requests.
#[derive(Clone, Debug)]
pub struct RequestDecoder {
    expected: GroupVersionKind,
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self {
            expected: GroupVersionKind::gvk(
                <Pod as k8s_openapi::Resource>::GROUP,
                <Pod as k8s_openapi::Resource>::VERSION,
                <Pod as k8s_openapi::Resource>::KIND,
            ),
        }
    }

    /// Decode the request's typed object. Does not touch the request.
    pub fn decode(&self, request: &AdmissionRequest<DynamicObject>) -> Result<DecodedPod> {
        let object = request
            .object
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(Error::Decode)?;
        self.decode_object(request, object)
    }

    /// Decode a raw pod object taken from the request body.
    ///
    /// `object` is passed separately from `request` so that a malformed pod
    /// (including malformed metadata) is reported as a decode error instead of
    /// failing the whole review.
    pub fn decode_object(
        &self,
        request: &AdmissionRequest<DynamicObject>,
        object: Option<Value>,
    ) -> Result<DecodedPod> {
        if request.kind != self.expected {
            return Err(Error::UnexpectedKind(format!(
                "{}/{}, Kind={}",
                request.kind.group, request.kind.version, request.kind.kind
            )));
        }

        let raw = object
            .filter(|object| !object.is_null())
            .ok_or(Error::MissingObject)?;
        let pod: Pod = serde_json::from_value(raw.clone()).map_err(Error::Decode)?;

        let namespace = pod
            .metadata
            .namespace
            .clone()
            .filter(|ns| !ns.is_empty())
            .or_else(|| request.namespace.clone())
            .unwrap_or_default();

        Ok(DecodedPod {
            raw,
            pod,
            namespace,
        })
    }
}
