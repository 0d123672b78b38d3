use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use super::{ArchitectureInspector, InspectError};

pub const ARCHITECTURE_AMD64: &str = "amd64";
pub const ARCHITECTURE_ARM64: &str = "arm64";
pub const ARCHITECTURE_PPC64LE: &str = "ppc64le";
pub const ARCHITECTURE_S390X: &str = "s390x";

pub const SINGLE_ARCH_AMD64_IMAGE: &str = "my-registry.io/library/single-arch-amd64-image:latest";
pub const SINGLE_ARCH_ARM64_IMAGE: &str = "my-registry.io/library/single-arch-arm64-image:latest";
pub const MULTI_ARCH_IMAGE: &str = "my-registry.io/library/multi-arch-image:latest";
pub const MULTI_ARCH_IMAGE_2: &str = "my-registry.io/library/multi-arch-image2:latest";

/// Image reference to supported architectures for the fake registry.
///
/// Built fresh on each call so callers can't mutate shared state.
pub fn mock_images_architecture_map() -> HashMap<&'static str, BTreeSet<String>> {
    fn set(archs: &[&str]) -> BTreeSet<String> {
        archs.iter().map(|a| a.to_string()).collect()
    }

    HashMap::from([
        (SINGLE_ARCH_AMD64_IMAGE, set(&[ARCHITECTURE_AMD64])),
        (SINGLE_ARCH_ARM64_IMAGE, set(&[ARCHITECTURE_ARM64])),
        (MULTI_ARCH_IMAGE, set(&[ARCHITECTURE_AMD64, ARCHITECTURE_ARM64])),
        (
            MULTI_ARCH_IMAGE_2,
            set(&[
                ARCHITECTURE_AMD64,
                ARCHITECTURE_ARM64,
                ARCHITECTURE_PPC64LE,
                ARCHITECTURE_S390X,
            ]),
        ),
    ])
}

/// In-memory inspector backed by [`mock_images_architecture_map`].
///
/// References are transport-prefixed (`//registry/repo:tag`), as the
/// resolution controller passes them.
#[derive(Clone, Copy, Debug, Default)]
pub struct FakeRegistryInspector;

impl FakeRegistryInspector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArchitectureInspector for FakeRegistryInspector {
    async fn get_compatible_architectures_set(
        &self,
        image_reference: &str,
        _pull_secrets: &[Vec<u8>],
    ) -> Result<BTreeSet<String>, InspectError> {
        let reference = image_reference
            .strip_prefix("//")
            .unwrap_or(image_reference);
        mock_images_architecture_map()
            .remove(reference)
            .ok_or_else(|| InspectError::ImageNotFound(reference.to_string()))
    }
}
