use std::io::Write;
use std::path::Path;

use opencl_docker_build::VariantCompiler;
use opencl_docker_build::output::write_dockerfile;

use super::VariantRequest;

pub fn generate(
    request: &VariantRequest<'_>,
    output: Option<&Path>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let (config, _) = super::load_config(config_path)?;
    let inputs = request.inputs()?;
    let host = super::resolve_host(request.host_arch, &config);

    let dockerfile = VariantCompiler::new(&config).render(&inputs, host);

    match output {
        Some(path) => {
            write_dockerfile(path, &dockerfile)?;
            println!("Wrote Dockerfile for {} to {}", request.image, path.display());
        }
        None => std::io::stdout().lock().write_all(dockerfile.as_bytes())?,
    }
    Ok(())
}
