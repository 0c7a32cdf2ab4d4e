mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use opencl_docker_core::DEFAULT_TOOLCHAIN_VERSION;

#[derive(Parser)]
#[command(
    name = "opencl-docker",
    about = "Generate OpenCL development Dockerfiles for many base images"
)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./opencl-docker.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a single Dockerfile
    Generate {
        #[command(flatten)]
        variant: VariantArgs,
        /// Output file (prints to stdout when omitted)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Generate every [[variants]] entry of the config file
    Matrix {
        /// Directory the variant output paths are relative to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        /// Architecture of the build host (defaults to this machine)
        #[arg(long)]
        host_arch: Option<String>,
    },
    /// Show how an image and tag are classified
    Features {
        #[command(flatten)]
        variant: VariantArgs,
    },
}

#[derive(Args)]
struct VariantArgs {
    /// Base image for the resulting Dockerfile
    #[arg(long, short = 'i')]
    image: String,
    /// Release tag; enables tag-gated package groups (experimental, ci, debug)
    #[arg(long, short = 't', default_value = "")]
    tag: String,
    /// PoCL version to check out
    #[arg(long, short = 'v', default_value = DEFAULT_TOOLCHAIN_VERSION)]
    toolchain: String,
    /// Architecture of the build host (defaults to this machine)
    #[arg(long)]
    host_arch: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Generate { variant, output } => commands::generate(
            &commands::VariantRequest {
                image: &variant.image,
                tag: &variant.tag,
                toolchain: &variant.toolchain,
                host_arch: variant.host_arch.as_deref(),
            },
            output.as_deref(),
            config,
        )?,
        Commands::Matrix { out_dir, host_arch } => {
            commands::matrix(&out_dir, host_arch.as_deref(), config)?
        }
        Commands::Features { variant } => commands::features(
            &commands::VariantRequest {
                image: &variant.image,
                tag: &variant.tag,
                toolchain: &variant.toolchain,
                host_arch: variant.host_arch.as_deref(),
            },
            config,
        )?,
    }

    Ok(())
}
