use std::path::PathBuf;

use opencl_docker_core::{CONFIG_FILE_NAME, GeneratorConfig, HostArch};
use tempfile::TempDir;

#[test]
fn load_returns_defaults_when_no_config_file() {
    let tmp = TempDir::new().unwrap();
    let config = GeneratorConfig::load_from_dir(tmp.path()).unwrap();

    assert!(config.packages.base.contains(&"build-essential".to_owned()));
    assert_eq!(
        config.packages.icd,
        vec![
            "opencl-headers",
            "ocl-icd-libopencl1",
            "ocl-icd-dev",
            "ocl-icd-opencl-dev"
        ]
    );
    assert_eq!(config.packages.qualcomm, vec!["qcom-adreno-cl-dev"]);
    assert!(config.repositories.jammy.is_some());
    assert!(config.repositories.noble.is_none());
    assert_eq!(config.sources.intercept_layer_version, "v3.0.5");
    assert_eq!(config.account.user, "ubuntu");
    assert_eq!(config.account.home, "/home/ubuntu");
    assert_eq!(config.account.amd_groups, vec!["video", "render"]);
    assert_eq!(config.image.default_command, "/bin/bash");
    assert!(config.image.host_arch.is_none());
    assert!(config.variants.is_empty());
}

#[test]
fn load_parses_full_config() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[packages]
base = ["git", "cmake"]
icd = ["ocl-icd-opencl-dev"]
experimental = []

[repositories]
jammy = "echo jammy"
noble = "echo noble"

[sources]
intercept_layer_version = "v3.0.6"
clblast_version = "1.6.2"

[account]
user = "dev"
home = "/home/dev"
amd_groups = ["render"]

[image]
default_command = "clinfo"
host_arch = "arm64"

[[variants]]
name = "cpu"
image = "ubuntu:24.04"
tag = "cpu"
toolchain = "v7.1"

[[variants]]
name = "cuda"
image = "nvidia/cuda:12.4.1-devel-ubuntu22.04"
output = "cuda.Dockerfile"
"#;
    std::fs::write(tmp.path().join(CONFIG_FILE_NAME), toml).unwrap();

    let config = GeneratorConfig::load_from_dir(tmp.path()).unwrap();

    assert_eq!(config.packages.base, vec!["git", "cmake"]);
    assert_eq!(config.packages.icd, vec!["ocl-icd-opencl-dev"]);
    assert!(config.packages.experimental.is_empty());
    assert_eq!(config.repositories.jammy.as_deref(), Some("echo jammy"));
    assert_eq!(config.repositories.noble.as_deref(), Some("echo noble"));
    assert_eq!(config.sources.intercept_layer_version, "v3.0.6");
    assert_eq!(config.sources.clblast_version, "1.6.2");
    assert_eq!(config.account.user, "dev");
    assert_eq!(config.account.amd_groups, vec!["render"]);
    assert_eq!(config.image.default_command, "clinfo");
    assert_eq!(config.image.host_arch, Some(HostArch::Aarch64));

    assert_eq!(config.variants.len(), 2);
    assert_eq!(config.variants[0].toolchain, "v7.1");
    assert_eq!(
        config.variants[0].output_path(),
        PathBuf::from("cpu/Dockerfile")
    );
    assert_eq!(config.variants[1].tag, "");
    assert_eq!(config.variants[1].toolchain, "v7.0");
    assert_eq!(
        config.variants[1].output_path(),
        PathBuf::from("cuda.Dockerfile")
    );
}

#[test]
fn load_partial_config_fills_defaults() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[account]
user = "runner"
"#;
    std::fs::write(tmp.path().join(CONFIG_FILE_NAME), toml).unwrap();

    let config = GeneratorConfig::load_from_dir(tmp.path()).unwrap();

    assert_eq!(config.account.user, "runner");
    // Defaults preserved
    assert_eq!(config.account.home, "/home/ubuntu");
    assert_eq!(config.account.qualcomm_groups, vec!["video"]);
    assert_eq!(config.sources.clblast_version, "1.6.3");
    assert!(config.packages.base.contains(&"clinfo".to_owned()));
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "not valid {{{{ toml").unwrap();

    let result = GeneratorConfig::load_from_dir(tmp.path());
    assert!(result.is_err());

    let err = result.unwrap_err().to_string();
    assert!(err.contains("parse"));
}

#[test]
fn load_empty_config_returns_defaults() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "").unwrap();

    let config = GeneratorConfig::load_from_dir(tmp.path()).unwrap();
    assert_eq!(config.image.default_command, "/bin/bash");
}

#[test]
fn load_explicit_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("custom.toml");
    std::fs::write(&path, "[image]\ndefault_command = \"clinfo\"\n").unwrap();

    let config = GeneratorConfig::load(&path).unwrap();
    assert_eq!(config.image.default_command, "clinfo");
}

// ── Variant validation ──

#[test]
fn load_rejects_duplicate_variant_names() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[[variants]]
name = "cpu"
image = "ubuntu:24.04"

[[variants]]
name = "cpu"
image = "ubuntu:22.04"
"#;
    std::fs::write(tmp.path().join(CONFIG_FILE_NAME), toml).unwrap();

    let err = GeneratorConfig::load_from_dir(tmp.path())
        .unwrap_err()
        .to_string();
    assert!(err.contains("duplicate variant name"));
    assert!(err.contains("cpu"));
}

#[test]
fn load_rejects_variant_with_blank_image() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[[variants]]
name = "broken"
image = "  "
"#;
    std::fs::write(tmp.path().join(CONFIG_FILE_NAME), toml).unwrap();

    let err = GeneratorConfig::load_from_dir(tmp.path())
        .unwrap_err()
        .to_string();
    assert!(err.contains("broken"));
}

#[test]
fn load_rejects_variant_without_image_field() {
    let tmp = TempDir::new().unwrap();
    let toml = r#"
[[variants]]
name = "no-image"
"#;
    std::fs::write(tmp.path().join(CONFIG_FILE_NAME), toml).unwrap();

    assert!(GeneratorConfig::load_from_dir(tmp.path()).is_err());
}

#[test]
fn host_arch_is_normalized_when_loaded() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join(CONFIG_FILE_NAME),
        "[image]\nhost_arch = \"AMD64\"\n",
    )
    .unwrap();
    let config = GeneratorConfig::load_from_dir(tmp.path()).unwrap();
    assert_eq!(config.image.host_arch, Some(HostArch::X86_64));

    std::fs::write(
        tmp.path().join(CONFIG_FILE_NAME),
        "[image]\nhost_arch = \"riscv64\"\n",
    )
    .unwrap();
    let config = GeneratorConfig::load_from_dir(tmp.path()).unwrap();
    assert_eq!(
        config.image.host_arch,
        Some(HostArch::Other("riscv64".to_owned()))
    );
}
