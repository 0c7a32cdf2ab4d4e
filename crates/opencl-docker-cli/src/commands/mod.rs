mod features;
mod generate;
mod matrix;

use std::path::{Path, PathBuf};

use opencl_docker_core::{CONFIG_FILE_NAME, GeneratorConfig, HostArch, VariantInputs};

pub use features::features;
pub use generate::generate;
pub use matrix::matrix;

/// Variant parameters as given on the command line.
pub struct VariantRequest<'a> {
    pub image: &'a str,
    pub tag: &'a str,
    pub toolchain: &'a str,
    pub host_arch: Option<&'a str>,
}

impl VariantRequest<'_> {
    pub(crate) fn inputs(&self) -> anyhow::Result<VariantInputs> {
        Ok(VariantInputs::new(self.image, self.tag, self.toolchain)?)
    }
}

/// Loads the config given with `--config`, or `./opencl-docker.toml` if present.
/// An explicit path must exist.
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<(GeneratorConfig, PathBuf)> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("config file not found: {}", path.display());
            }
            path.to_path_buf()
        }
        None => PathBuf::from(CONFIG_FILE_NAME),
    };
    tracing::debug!(path = %path.display(), "resolved config path");
    let config = GeneratorConfig::load(&path)?;
    Ok((config, path))
}

/// `--host-arch` wins over `[image].host_arch`, which wins over this machine.
pub(crate) fn resolve_host(flag: Option<&str>, config: &GeneratorConfig) -> HostArch {
    flag.map(HostArch::parse)
        .or_else(|| config.image.host_arch.clone())
        .unwrap_or_else(HostArch::current)
}
