//! Classification of the free-text variant inputs into feature flags.
//!
//! All substring tests live here. The compiler only matches on the enums
//! below; `opencl-docker features` prints the result.

use opencl_docker_core::{HostArch, VariantInputs};
use serde::Serialize;

/// Accelerator vendor detected from the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accelerator {
    Nvidia,
    Amd,
    Qualcomm,
}

impl Accelerator {
    /// Detection order; also the order driver blocks are emitted in.
    pub const ALL: [Accelerator; 3] = [Self::Nvidia, Self::Amd, Self::Qualcomm];

    fn markers(self) -> &'static [&'static str] {
        match self {
            Self::Nvidia => &["nvidia", "cuda"],
            Self::Amd => &["rocm"],
            Self::Qualcomm => &["qualcomm", "adreno", "qcom"],
        }
    }
}

/// Which OpenCL package group the dependency install uses.
/// Exactly one applies to every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IcdVendor {
    Qualcomm,
    Amd,
    /// Generic ICD loader; NVIDIA ships its ICD through the container runtime.
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OsRelease {
    /// Ubuntu 22.04
    Jammy,
    /// Ubuntu 24.04
    Noble,
    Other,
}

/// CPU architecture of the target image: from its name when it says,
/// otherwise the host's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageArch {
    X86_64,
    Aarch64,
}

/// Optional package groups enabled by the release tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagFeature {
    Experimental,
    Ci,
    Debug,
}

impl TagFeature {
    pub const ALL: [TagFeature; 3] = [Self::Experimental, Self::Ci, Self::Debug];

    fn marker(self) -> &'static str {
        match self {
            Self::Experimental => "experimental",
            Self::Ci => "ci",
            Self::Debug => "debug",
        }
    }
}

/// Everything the compiler needs to know about one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Features {
    pub base_image: String,
    pub toolchain_version: String,
    pub host: HostArch,
    pub accelerators: Vec<Accelerator>,
    pub icd_vendor: IcdVendor,
    pub release: OsRelease,
    pub image_arch: ImageArch,
    pub tag_features: Vec<TagFeature>,
}

impl Features {
    /// Derives the feature flags from the raw inputs.
    ///
    /// Markers are matched as case-insensitive substrings of the image and
    /// the tag, so extending a tag never loses a group it already enabled.
    /// An image name without an architecture marker takes the host's.
    pub fn classify(inputs: &VariantInputs, host: HostArch) -> Self {
        let image = inputs.base_image().to_ascii_lowercase();

        let accelerators: Vec<Accelerator> = Accelerator::ALL
            .into_iter()
            .filter(|acc| acc.markers().iter().any(|m| image.contains(m)))
            .collect();

        let release = if image.contains("22.04") || image.contains("jammy") {
            OsRelease::Jammy
        } else if image.contains("24.04") || image.contains("noble") {
            OsRelease::Noble
        } else {
            OsRelease::Other
        };

        let image_arch = if image.contains("arm64") || image.contains("aarch64") {
            ImageArch::Aarch64
        } else if image.contains("amd64") || image.contains("x86_64") {
            ImageArch::X86_64
        } else {
            match host {
                HostArch::Aarch64 => ImageArch::Aarch64,
                HostArch::X86_64 | HostArch::Other(_) => ImageArch::X86_64,
            }
        };

        let tag = inputs.tag().to_ascii_lowercase();
        let tag_features = TagFeature::ALL
            .into_iter()
            .filter(|feature| tag.contains(feature.marker()))
            .collect();

        let features = Self {
            base_image: inputs.base_image().to_owned(),
            toolchain_version: inputs.toolchain_version().to_owned(),
            host,
            icd_vendor: icd_vendor(&accelerators),
            accelerators,
            release,
            image_arch,
            tag_features,
        };

        if features.accelerators.len() > 1 {
            tracing::warn!(
                image = %features.base_image,
                accelerators = ?features.accelerators,
                "base image matches several accelerator vendors; emitting every driver block"
            );
        }
        features
    }

    pub fn has(&self, accelerator: Accelerator) -> bool {
        self.accelerators.contains(&accelerator)
    }

    pub fn has_tag(&self, feature: TagFeature) -> bool {
        self.tag_features.contains(&feature)
    }
}

fn icd_vendor(accelerators: &[Accelerator]) -> IcdVendor {
    if accelerators.contains(&Accelerator::Qualcomm) {
        IcdVendor::Qualcomm
    } else if accelerators.contains(&Accelerator::Amd) {
        IcdVendor::Amd
    } else {
        IcdVendor::Default
    }
}
