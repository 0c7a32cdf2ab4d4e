//! Dockerfile generation for OpenCL development images.
//!
//! # Pipeline
//!
//! ```text
//! opencl-docker generate -i <image> -t <tag> -v <toolchain>
//!   1. Inputs     ── VariantInputs::new()       (rejects an empty image)
//!   2. Classify   ── Features::classify()       (all substring tests)
//!   3. Compile    ── VariantCompiler::compile() (fixed step order)
//!   4. Render     ── InstructionDocument::render()
//!   5. Write      ── output::write_dockerfile() or stdout
//! ```
//!
//! # Step order
//!
//! 1. Intel oneAPI runtime (x86_64 hosts only)
//! 2. Package upgrade
//! 3. Release repository, then one dependency install
//! 4. PoCL and OpenCL intercept layer source builds
//! 5. Accelerator driver environment
//! 6. CLBlast source build
//! 7. Unprivileged account, with a scoped `root` switch for group membership
//! 8. `CMD`

pub mod compiler;
pub mod document;
pub mod features;
pub mod output;

pub use compiler::VariantCompiler;
pub use document::{Instruction, InstructionDocument, UserScope};
pub use features::{Accelerator, Features, IcdVendor, ImageArch, OsRelease, TagFeature};
