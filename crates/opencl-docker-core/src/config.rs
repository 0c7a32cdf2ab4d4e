use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::HostArch;

/// File name looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "opencl-docker.toml";

/// opencl-docker.toml configuration
///
/// Package lists, repository commands, and version pins are opaque data to
/// the compiler. Every section is optional and falls back to the defaults
/// below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub packages: PackageConfig,
    #[serde(default)]
    pub repositories: RepositoryConfig,
    #[serde(default)]
    pub sources: SourceConfig,
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub image: ImageConfig,
    /// Variants generated by `opencl-docker matrix`
    #[serde(default)]
    pub variants: Vec<VariantEntry>,
}

/// apt package groups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageConfig {
    /// Installed on every variant
    #[serde(default = "default_base_packages")]
    pub base: Vec<String>,
    /// Generic ICD loader, used when no dedicated vendor group applies
    #[serde(default = "default_icd_packages")]
    pub icd: Vec<String>,
    #[serde(default = "default_amd_packages")]
    pub amd: Vec<String>,
    #[serde(default = "default_qualcomm_packages")]
    pub qualcomm: Vec<String>,
    /// Ubuntu 22.04 additions
    #[serde(default = "default_jammy_packages")]
    pub jammy: Vec<String>,
    /// Ubuntu 24.04 additions
    #[serde(default = "default_noble_packages")]
    pub noble: Vec<String>,
    /// Tag `experimental`
    #[serde(default = "default_experimental_packages")]
    pub experimental: Vec<String>,
    /// Tag `ci`
    #[serde(default = "default_ci_packages")]
    pub ci: Vec<String>,
    /// Tag `debug`
    #[serde(default = "default_debug_packages")]
    pub debug: Vec<String>,
}

/// Shell commands registering extra apt repositories, per OS release.
/// They run before the dependency install.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_jammy_repository")]
    pub jammy: Option<String>,
    #[serde(default)]
    pub noble: Option<String>,
}

/// Git sources and version pins for the source builds.
/// The PoCL pin is not here: it is the toolchain version of each variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_pocl_repo")]
    pub pocl_repo: String,
    #[serde(default = "default_intercept_layer_repo")]
    pub intercept_layer_repo: String,
    #[serde(default = "default_intercept_layer_version")]
    pub intercept_layer_version: String,
    #[serde(default = "default_clblast_repo")]
    pub clblast_repo: String,
    #[serde(default = "default_clblast_version")]
    pub clblast_version: String,
}

/// Unprivileged account the container runs as
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_home")]
    pub home: String,
    /// Supplementary groups granted on AMD (ROCm) images
    #[serde(default = "default_amd_groups")]
    pub amd_groups: Vec<String>,
    /// Supplementary groups granted on Qualcomm (Adreno) images
    #[serde(default = "default_qualcomm_groups")]
    pub qualcomm_groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Final CMD of every generated Dockerfile
    #[serde(default = "default_command")]
    pub default_command: String,
    /// Overrides the detected host architecture (e.g. when generating
    /// x86_64 Dockerfiles on an arm64 workstation)
    #[serde(default)]
    pub host_arch: Option<HostArch>,
}

/// One `[[variants]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantEntry {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default = "default_toolchain")]
    pub toolchain: String,
    /// Output path relative to the matrix output directory.
    /// Defaults to `<name>/Dockerfile`.
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl VariantEntry {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.name).join("Dockerfile"))
    }
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            base: default_base_packages(),
            icd: default_icd_packages(),
            amd: default_amd_packages(),
            qualcomm: default_qualcomm_packages(),
            jammy: default_jammy_packages(),
            noble: default_noble_packages(),
            experimental: default_experimental_packages(),
            ci: default_ci_packages(),
            debug: default_debug_packages(),
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            jammy: default_jammy_repository(),
            noble: None,
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            pocl_repo: default_pocl_repo(),
            intercept_layer_repo: default_intercept_layer_repo(),
            intercept_layer_version: default_intercept_layer_version(),
            clblast_repo: default_clblast_repo(),
            clblast_version: default_clblast_version(),
        }
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            user: default_user(),
            home: default_home(),
            amd_groups: default_amd_groups(),
            qualcomm_groups: default_qualcomm_groups(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            default_command: default_command(),
            host_arch: None,
        }
    }
}

impl GeneratorConfig {
    /// Load from the given path, or return defaults if the file does not exist.
    pub fn load(path: &Path) -> crate::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| crate::Error::ConfigLoad {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| crate::Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            variants = config.variants.len(),
            "loaded config"
        );
        Ok(config)
    }

    /// Load `opencl-docker.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> crate::Result<Self> {
        Self::load(&dir.join(CONFIG_FILE_NAME))
    }

    fn validate(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for variant in &self.variants {
            if variant.image.trim().is_empty() {
                return Err(crate::Error::VariantWithoutImage {
                    name: variant.name.clone(),
                });
            }
            if !seen.insert(variant.name.as_str()) {
                return Err(crate::Error::DuplicateVariant {
                    name: variant.name.clone(),
                });
            }
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

fn default_base_packages() -> Vec<String> {
    strings(&[
        "build-essential",
        "git",
        "llvm",
        "libclang-cpp-dev",
        "llvm-dev",
        "clang",
        "libclang-dev",
        "cmake",
        "pkg-config",
        "make",
        "ninja-build",
        "libhwloc-dev",
        "clinfo",
        "dialog",
        "apt-utils",
        "libxml2-dev",
        "vim",
        "gdb",
        "valgrind",
    ])
}

fn default_icd_packages() -> Vec<String> {
    strings(&[
        "opencl-headers",
        "ocl-icd-libopencl1",
        "ocl-icd-dev",
        "ocl-icd-opencl-dev",
    ])
}

fn default_amd_packages() -> Vec<String> {
    strings(&["opencl-headers", "ocl-icd-opencl-dev", "rocm-opencl-runtime"])
}

fn default_qualcomm_packages() -> Vec<String> {
    strings(&["qcom-adreno-cl-dev"])
}

fn default_jammy_packages() -> Vec<String> {
    strings(&["llvm-18-dev", "clang-18", "libclang-18-dev", "libclang-cpp18-dev"])
}

fn default_noble_packages() -> Vec<String> {
    strings(&["libpolly-18-dev"])
}

fn default_experimental_packages() -> Vec<String> {
    strings(&["spirv-tools", "spirv-headers"])
}

fn default_ci_packages() -> Vec<String> {
    strings(&["ccache"])
}

fn default_debug_packages() -> Vec<String> {
    strings(&["strace", "ltrace"])
}

fn default_jammy_repository() -> Option<String> {
    Some(
        "apt-get update && apt-get install -y wget gnupg && \\\n    \
         wget -qO- https://apt.llvm.org/llvm-snapshot.gpg.key | gpg --dearmor -o /usr/share/keyrings/llvm-archive-keyring.gpg && \\\n    \
         echo \"deb [signed-by=/usr/share/keyrings/llvm-archive-keyring.gpg] http://apt.llvm.org/jammy/ llvm-toolchain-jammy-18 main\" > /etc/apt/sources.list.d/llvm.list && \\\n    \
         rm -rf /var/lib/apt/lists/*"
            .to_owned(),
    )
}

fn default_pocl_repo() -> String {
    "https://github.com/pocl/pocl.git".to_owned()
}

fn default_intercept_layer_repo() -> String {
    "https://github.com/intel/opencl-intercept-layer.git".to_owned()
}

fn default_intercept_layer_version() -> String {
    "v3.0.5".to_owned()
}

fn default_clblast_repo() -> String {
    "https://github.com/CNugteren/CLBlast.git".to_owned()
}

fn default_clblast_version() -> String {
    "1.6.3".to_owned()
}

fn default_user() -> String {
    "ubuntu".to_owned()
}

fn default_home() -> String {
    "/home/ubuntu".to_owned()
}

fn default_amd_groups() -> Vec<String> {
    strings(&["video", "render"])
}

fn default_qualcomm_groups() -> Vec<String> {
    strings(&["video"])
}

fn default_command() -> String {
    "/bin/bash".to_owned()
}

fn default_toolchain() -> String {
    crate::DEFAULT_TOOLCHAIN_VERSION.to_owned()
}
