//! Construction of JSON Patch admission responses.

use k8s_openapi::api::core::v1::Pod;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse};
use serde_json::Value;

use crate::webhooks::error::{Error, Result};

/// Builds admission responses that patch the original object into the mutated pod
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponsePatchBuilder;

impl ResponsePatchBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Compute the RFC 6902 patch turning `original` into `mutated`
    pub fn diff(&self, original: &Value, mutated: &Pod) -> Result<json_patch::Patch> {
        let mutated = serde_json::to_value(mutated).map_err(Error::Encode)?;
        Ok(json_patch::diff(original, &mutated))
    }

    /// Allowed response carrying the patch from `original` to `mutated`.
    ///
    /// Encoding failures are handed back so the caller can log and answer with
    /// [`errored`](Self::errored).
    pub fn try_build(
        &self,
        request: &AdmissionRequest<DynamicObject>,
        original: &Value,
        mutated: &Pod,
    ) -> Result<AdmissionResponse> {
        let patch = self.diff(original, mutated)?;
        AdmissionResponse::from(request)
            .with_patch(patch)
            .map_err(|e| Error::Patch(e.to_string()))
    }

    /// Allowed response without a patch
    pub fn unchanged(&self, request: &AdmissionRequest<DynamicObject>) -> AdmissionResponse {
        AdmissionResponse::from(request)
    }

    /// Rejected response carrying the error's HTTP-equivalent code and message
    pub fn errored(
        &self,
        request: &AdmissionRequest<DynamicObject>,
        err: &Error,
    ) -> AdmissionResponse {
        let mut response = AdmissionResponse::from(request).deny(err.to_string());
        response.result.code = err.status_code().as_u16();
        response.result.reason = err.reason().to_string();
        response
    }
}
