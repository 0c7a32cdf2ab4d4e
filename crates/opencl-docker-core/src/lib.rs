//! Core types and configuration for opencl-docker.
//!
//! This crate defines the `opencl-docker.toml` schema ([`GeneratorConfig`]),
//! the validated generator inputs ([`VariantInputs`], [`HostArch`]), and the
//! shared error type.

pub mod config;
pub mod error;
pub mod variant;

pub use config::{
    AccountConfig, CONFIG_FILE_NAME, GeneratorConfig, ImageConfig, PackageConfig,
    RepositoryConfig, SourceConfig, VariantEntry,
};
pub use error::{Error, Result};
pub use variant::{DEFAULT_TOOLCHAIN_VERSION, HostArch, VariantInputs};
