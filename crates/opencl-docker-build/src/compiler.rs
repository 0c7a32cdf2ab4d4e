use opencl_docker_core::{GeneratorConfig, HostArch, VariantInputs};

use crate::document::{InstructionDocument, ROOT_USER};
use crate::features::{Accelerator, Features, IcdVendor, ImageArch, OsRelease, TagFeature};

/// Shell suffix that keeps apt layers small.
const APT_CLEANUP: &str = "apt-get clean && rm -rf /var/lib/apt/lists/*";

static NO_PACKAGES: Vec<String> = Vec::new();

/// Joins shell fragments into one command continued over several lines.
fn chain(parts: &[&str]) -> String {
    parts.join(" && \\\n    ")
}

/// Turns classified [`Features`] into an OpenCL development Dockerfile.
///
/// The steps always run in the same order; each one decides from the
/// features whether it appends anything.
pub struct VariantCompiler<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> VariantCompiler<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    /// Classifies the inputs, compiles them, and renders the Dockerfile.
    pub fn render(&self, inputs: &VariantInputs, host: HostArch) -> String {
        let features = Features::classify(inputs, host);
        self.compile(&features).render()
    }

    pub fn compile(&self, features: &Features) -> InstructionDocument {
        tracing::info!(
            image = %features.base_image,
            toolchain = %features.toolchain_version,
            host = %features.host,
            "compiling variant"
        );

        let mut doc = InstructionDocument::new(&features.base_image);

        // Host-gated, so it has to come first.
        self.install_intel_opencl(&mut doc, features);
        self.update_packages(&mut doc);
        self.install_dependencies(&mut doc, features);
        self.install_pocl(&mut doc, features);
        self.install_opencl_intercept_layer(&mut doc);
        self.configure_drivers(&mut doc, features);
        self.install_clblast(&mut doc);
        self.configure_user(&mut doc, features);
        doc.cmd(&self.config.image.default_command);

        tracing::debug!(instructions = doc.instructions().len(), "variant compiled");
        doc
    }

    fn install_intel_opencl(&self, doc: &mut InstructionDocument, features: &Features) {
        // The Intel runtime has no aarch64 build.
        if features.host != HostArch::X86_64 {
            tracing::debug!(host = %features.host, "skipping Intel oneAPI runtime");
            return;
        }
        doc.run(chain(&[
            "apt-get update && apt-get -y install wget gnupg2",
            "wget -O- https://apt.repos.intel.com/intel-gpg-keys/GPG-PUB-KEY-INTEL-SW-PRODUCTS.PUB \
             | gpg --dearmor | tee /usr/share/keyrings/oneapi-archive-keyring.gpg",
            "echo \"deb [signed-by=/usr/share/keyrings/oneapi-archive-keyring.gpg] \
             https://apt.repos.intel.com/oneapi all main\" | tee /etc/apt/sources.list.d/oneAPI.list",
            "apt-get update && apt-get install -y intel-oneapi-runtime-libs",
            APT_CLEANUP,
        ]));
    }

    fn update_packages(&self, doc: &mut InstructionDocument) {
        doc.run(chain(&["apt-get update && apt-get upgrade -y", APT_CLEANUP]));
    }

    fn install_dependencies(&self, doc: &mut InstructionDocument, features: &Features) {
        let packages = &self.config.packages;
        let repositories = &self.config.repositories;

        let (release_packages, repository) = match features.release {
            OsRelease::Jammy => (&packages.jammy, repositories.jammy.as_deref()),
            OsRelease::Noble => (&packages.noble, repositories.noble.as_deref()),
            OsRelease::Other => (&NO_PACKAGES, None),
        };

        // The repository has to be registered before the install can see it.
        if let Some(command) = repository {
            tracing::debug!(release = ?features.release, "registering release repository");
            doc.run(command);
        }

        let vendor_packages = match features.icd_vendor {
            IcdVendor::Qualcomm => &packages.qualcomm,
            IcdVendor::Amd => &packages.amd,
            IcdVendor::Default => &packages.icd,
        };
        tracing::debug!(vendor = ?features.icd_vendor, "selected OpenCL package group");

        let mut dependencies: Vec<&str> = Vec::new();
        let groups = [&packages.base, vendor_packages, release_packages]
            .into_iter()
            .chain(features.tag_features.iter().map(|feature| match feature {
                TagFeature::Experimental => &packages.experimental,
                TagFeature::Ci => &packages.ci,
                TagFeature::Debug => &packages.debug,
            }));
        for package in groups.flatten() {
            if !dependencies.contains(&package.as_str()) {
                dependencies.push(package);
            }
        }

        let install = format!(
            "apt-get update && apt-get install -y {}",
            dependencies.join(" ")
        );
        doc.run(chain(&[install.as_str(), APT_CLEANUP]));
    }

    fn install_pocl(&self, doc: &mut InstructionDocument, features: &Features) {
        // Adreno images ship their own OpenCL driver.
        if features.has(Accelerator::Qualcomm) {
            tracing::debug!("skipping PoCL build for Qualcomm image");
            return;
        }

        let mut switches = vec![
            "-DCMAKE_BUILD_TYPE=Release",
            "-DENABLE_VALGRIND=ON",
            "-DCMAKE_INSTALL_PREFIX=/",
        ];
        switches.push(match features.image_arch {
            ImageArch::Aarch64 => "-DLLC_HOST_CPU=generic",
            ImageArch::X86_64 => "-DKERNELLIB_HOST_CPU_VARIANTS=distro",
        });
        if features.has(Accelerator::Nvidia) {
            switches.push("-DENABLE_CUDA=ON");
        }
        tracing::debug!(version = %features.toolchain_version, ?switches, "building PoCL");

        doc.run(format!("git clone {} /pocl", self.config.sources.pocl_repo));
        doc.workdir("/pocl");
        doc.run(format!(
            "git checkout {} && mkdir build",
            features.toolchain_version
        ));
        doc.workdir("/pocl/build");
        let configure = format!("cmake {} ..", switches.join(" "));
        doc.run(chain(&[
            configure.as_str(),
            "make -j",
            "make install",
            "rm -rf /pocl",
        ]));
    }

    fn install_opencl_intercept_layer(&self, doc: &mut InstructionDocument) {
        let sources = &self.config.sources;
        doc.run(format!(
            "git clone {} /opencl-intercept-layer",
            sources.intercept_layer_repo
        ));
        doc.workdir("/opencl-intercept-layer");
        doc.run(format!(
            "git checkout {} && mkdir build",
            sources.intercept_layer_version
        ));
        doc.workdir("/opencl-intercept-layer/build");
        doc.run(chain(&[
            "cmake -DCMAKE_BUILD_TYPE=Release -DCMAKE_INSTALL_PREFIX=/ocl-intercept ..",
            "make -j",
            "make install",
            "rm -rf /opencl-intercept-layer",
            "ln -s /ocl-intercept/bin/cliloader /bin/cliloader",
        ]));
    }

    fn configure_drivers(&self, doc: &mut InstructionDocument, features: &Features) {
        for accelerator in &features.accelerators {
            tracing::debug!(?accelerator, "configuring driver environment");
            match accelerator {
                Accelerator::Nvidia => {
                    doc.run(chain(&[
                        "mkdir -p /etc/OpenCL/vendors",
                        "echo \"libnvidia-opencl.so.1\" > /etc/OpenCL/vendors/nvidia.icd",
                    ]));
                    doc.env([
                        ("NVIDIA_VISIBLE_DEVICES", "all"),
                        ("NVIDIA_DRIVER_CAPABILITIES", "compute,utility"),
                    ]);
                }
                Accelerator::Amd => {
                    doc.env([
                        ("ROCM_PATH", "/opt/rocm"),
                        ("PATH", "/opt/rocm/bin:${PATH}"),
                    ]);
                }
                Accelerator::Qualcomm => {
                    doc.run(chain(&[
                        "mkdir -p /etc/OpenCL/vendors",
                        "echo \"libOpenCL_adreno.so\" > /etc/OpenCL/vendors/adreno.icd",
                    ]));
                }
            }
        }
    }

    fn install_clblast(&self, doc: &mut InstructionDocument) {
        let sources = &self.config.sources;
        doc.run(format!("git clone {} /clblast", sources.clblast_repo));
        doc.workdir("/clblast");
        doc.run(format!(
            "git checkout {} && mkdir build",
            sources.clblast_version
        ));
        doc.workdir("/clblast/build");
        doc.run(chain(&[
            "cmake -DCMAKE_BUILD_TYPE=Release -DCMAKE_INSTALL_PREFIX=/usr/local -DTUNERS=OFF ..",
            "make -j",
            "make install",
            "ldconfig",
            "rm -rf /clblast",
        ]));
    }

    fn configure_user(&self, doc: &mut InstructionDocument, features: &Features) {
        let account = &self.config.account;
        let user = account.user.as_str();
        let home = account.home.as_str();

        // Ubuntu 22.04 images do not ship the `ubuntu` account.
        doc.run(format!(
            "id -u {user} >/dev/null 2>&1 || \
             useradd --create-home --home-dir {home} --shell /bin/bash {user}"
        ));
        doc.env([("HOME", home)]);
        doc.run("mkdir -p ${HOME}");
        doc.copy(
            "/etc/skel/",
            format!("{}/", home.trim_end_matches('/')),
            Some(features.base_image.as_str()),
        );
        doc.run(format!("chown -R {user}:{user} ${{HOME}}"));
        doc.user(user);
        doc.run("echo 'export PATH=/ocl-intercept/bin:${PATH}' >> ${HOME}/.bashrc");
        doc.workdir("${HOME}");

        let groups = self.supplementary_groups(features);
        if !groups.is_empty() {
            tracing::debug!(?groups, "granting supplementary groups");
            let mut root = doc.escalate(ROOT_USER);
            root.run(format!("usermod -aG {} {user}", groups.join(",")));
        }
    }

    fn supplementary_groups(&self, features: &Features) -> Vec<&str> {
        let account = &self.config.account;
        let mut groups: Vec<&str> = Vec::new();
        for accelerator in &features.accelerators {
            let wanted = match accelerator {
                Accelerator::Amd => account.amd_groups.as_slice(),
                Accelerator::Qualcomm => account.qualcomm_groups.as_slice(),
                Accelerator::Nvidia => &[],
            };
            for group in wanted {
                if !groups.contains(&group.as_str()) {
                    groups.push(group);
                }
            }
        }
        groups
    }
}
