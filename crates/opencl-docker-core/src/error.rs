use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config from {path}")]
    ConfigLoad {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("duplicate variant name {name:?} in [[variants]] — names must be unique")]
    DuplicateVariant { name: String },

    #[error("variant {name:?} has an empty image")]
    VariantWithoutImage { name: String },

    // ── Generator inputs ──
    #[error("base image must not be empty")]
    EmptyBaseImage,
}
