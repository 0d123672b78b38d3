//! Image architecture inspection.
//!
//! The resolution controller asks an [`ArchitectureInspector`] which CPU
//! architectures an image supports before it computes node affinity and
//! removes the scheduling gate. Registry access lives outside this crate;
//! [`FakeRegistryInspector`] serves a fixed image map for tests.

mod fake;

pub use fake::{
    ARCHITECTURE_AMD64, ARCHITECTURE_ARM64, ARCHITECTURE_PPC64LE, ARCHITECTURE_S390X,
    FakeRegistryInspector, MULTI_ARCH_IMAGE, MULTI_ARCH_IMAGE_2, SINGLE_ARCH_AMD64_IMAGE,
    SINGLE_ARCH_ARM64_IMAGE, mock_images_architecture_map,
};

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

/// Errors returned while resolving an image's architectures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectError {
    /// The image reference could not be resolved
    #[error("image not found: {0}")]
    ImageNotFound(String),

    /// Registry rejected the pull secrets
    #[error("unauthorized to inspect image {0}")]
    Unauthorized(String),

    /// Registry unreachable
    #[error("registry error: {0}")]
    Registry(String),
}

/// Resolves the set of architectures an image can run on
#[async_trait]
pub trait ArchitectureInspector: Send + Sync {
    /// Architectures supported by `image_reference`, using `pull_secrets`
    /// (dockerconfigjson blobs) for registry authentication.
    async fn get_compatible_architectures_set(
        &self,
        image_reference: &str,
        pull_secrets: &[Vec<u8>],
    ) -> Result<BTreeSet<String>, InspectError>;
}
