//! Validated inputs for a single Dockerfile generation run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// PoCL release checked out when the caller does not pin one.
pub const DEFAULT_TOOLCHAIN_VERSION: &str = "v7.0";

/// The three free-text parameters that select a Dockerfile variant.
///
/// Values are kept verbatim. The only rejected input is an empty or
/// whitespace-only base image, since it cannot produce a `FROM` header.
///
/// # Examples
///
/// ```
/// use opencl_docker_core::VariantInputs;
///
/// let inputs = VariantInputs::new("ubuntu:24.04", "cpu", "v7.1").unwrap();
/// assert_eq!(inputs.base_image(), "ubuntu:24.04");
/// assert!(VariantInputs::new("  ", "cpu", "v7.1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInputs {
    base_image: String,
    tag: String,
    toolchain_version: String,
}

impl VariantInputs {
    pub fn new(
        base_image: impl Into<String>,
        tag: impl Into<String>,
        toolchain_version: impl Into<String>,
    ) -> crate::Result<Self> {
        let base_image = base_image.into();
        if base_image.trim().is_empty() {
            return Err(crate::Error::EmptyBaseImage);
        }
        Ok(Self {
            base_image,
            tag: tag.into(),
            toolchain_version: toolchain_version.into(),
        })
    }

    pub fn base_image(&self) -> &str {
        &self.base_image
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn toolchain_version(&self) -> &str {
        &self.toolchain_version
    }
}

/// CPU architecture of the machine running the generator.
///
/// The Intel oneAPI runtime install depends on it, and it stands in for the
/// image architecture when the image name carries no arch marker. It is
/// captured once at the boundary so that compilation itself stays a pure
/// function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HostArch {
    X86_64,
    Aarch64,
    Other(String),
}

impl HostArch {
    /// Architecture this binary was compiled for.
    pub fn current() -> Self {
        Self::parse(std::env::consts::ARCH)
    }

    /// Normalizes common spellings (`amd64`, `arm64`) onto the canonical names.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Self::X86_64,
            "aarch64" | "arm64" => Self::Aarch64,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for HostArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for HostArch {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<HostArch> for String {
    fn from(arch: HostArch) -> Self {
        arch.as_str().to_owned()
    }
}
