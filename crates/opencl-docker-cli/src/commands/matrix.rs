use std::path::Path;

use opencl_docker_build::VariantCompiler;
use opencl_docker_build::output::write_dockerfile;
use opencl_docker_core::VariantInputs;

/// Generates every `[[variants]]` entry into `out_dir`.
pub fn matrix(
    out_dir: &Path,
    host_arch: Option<&str>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let (config, path) = super::load_config(config_path)?;
    if config.variants.is_empty() {
        anyhow::bail!(
            "no [[variants]] defined in {} — add at least one variant to generate",
            path.display()
        );
    }

    let host = super::resolve_host(host_arch, &config);
    let compiler = VariantCompiler::new(&config);

    println!(
        "Generating {} Dockerfiles (host {host})...",
        config.variants.len()
    );
    for variant in &config.variants {
        let inputs = VariantInputs::new(&variant.image, &variant.tag, &variant.toolchain)?;
        let target = out_dir.join(variant.output_path());
        write_dockerfile(&target, &compiler.render(&inputs, host.clone()))?;
        println!("  {} -> {}", variant.name, target.display());
    }
    Ok(())
}
