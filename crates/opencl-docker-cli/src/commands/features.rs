use std::path::Path;

use opencl_docker_build::Features;

use super::VariantRequest;

/// Prints the classification of an image/tag pair as JSON.
pub fn features(request: &VariantRequest<'_>, config_path: Option<&Path>) -> anyhow::Result<()> {
    let (config, _) = super::load_config(config_path)?;
    let inputs = request.inputs()?;
    let host = super::resolve_host(request.host_arch, &config);

    let features = Features::classify(&inputs, host);
    println!("{}", serde_json::to_string_pretty(&features)?);
    Ok(())
}
