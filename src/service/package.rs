//! Batch packaging and deployment of selected services

use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::ToolsConfig;
use crate::deploy::Deployer;
use crate::packager::{Launcher, Packaged, Packager};
use crate::registry::{ServiceRegistry, ServiceSpec};

/// Where packaged executables end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Written beside their sources; nothing is deployed
    Source,
    /// Written by the packager straight into the target directory
    Target,
    /// Written beside their sources, then deployed with backup and chmod
    Deploy,
}

/// Configuration for a packaging run
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source_root: PathBuf,
    pub target_dir: PathBuf,
    pub pkg_target: String,
    pub services: Vec<String>,
    pub mode: OutputMode,
    pub tools: ToolsConfig,
    pub launcher: Launcher,
}

/// Outcome for one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageResult {
    pub service_name: String,
    pub output_path: Option<PathBuf>,
    pub size_bytes: Option<u64>,
}

impl PackageResult {
    pub fn succeeded(service_name: &str, output_path: PathBuf, size_bytes: u64) -> Self {
        Self {
            service_name: service_name.to_string(),
            output_path: Some(output_path),
            size_bytes: Some(size_bytes),
        }
    }

    pub fn failed(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
            output_path: None,
            size_bytes: None,
        }
    }

    pub fn success(&self) -> bool {
        self.output_path.is_some()
    }
}

/// Results of a run, in processing order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub results: Vec<PackageResult>,
    /// Requested names that are not in the registry
    pub skipped: Vec<String>,
}

impl RunSummary {
    pub fn succeeded(&self) -> impl Iterator<Item = &PackageResult> {
        self.results.iter().filter(|r| r.success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &PackageResult> {
        self.results.iter().filter(|r| !r.success())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }

    /// 1 if any service failed, 0 otherwise, including when nothing ran
    pub fn exit_code(&self) -> i32 {
        if self.has_failures() {
            1
        } else {
            0
        }
    }
}

/// Service for running the package-and-deploy sequence
pub struct PackageService;

impl PackageService {
    /// Process every selected service in order.
    ///
    /// A failing service is recorded and the run moves on to the next one.
    pub fn run(config: &RunConfig, registry: &ServiceRegistry) -> RunSummary {
        let selection = registry.select(config.services.as_slice());
        for name in &selection.unknown {
            warn!("Unknown service: {}, skipping", name);
        }

        let packager = Packager::new(&config.source_root, &config.pkg_target)
            .with_tools(config.tools.clone())
            .with_launcher(config.launcher);
        let deployer = Deployer::new(&config.target_dir);

        let mut summary = RunSummary {
            results: Vec::with_capacity(selection.services.len()),
            skipped: selection.unknown,
        };

        for spec in selection.services {
            let result = match Self::process(config, &packager, &deployer, spec) {
                Ok(packaged) => {
                    PackageResult::succeeded(&spec.name, packaged.path, packaged.size_bytes)
                }
                Err(e) => {
                    error!("{} failed: {:#}", spec.name, e);
                    PackageResult::failed(&spec.name)
                }
            };
            summary.results.push(result);
        }

        summary
    }

    fn process(
        config: &RunConfig,
        packager: &Packager,
        deployer: &Deployer,
        spec: &ServiceSpec,
    ) -> anyhow::Result<Packaged> {
        match config.mode {
            OutputMode::Source => Ok(packager.package(spec, None)?),
            OutputMode::Target => Ok(packager.package(spec, Some(&config.target_dir))?),
            OutputMode::Deploy => {
                let packaged = packager.package(spec, None)?;
                let deployment = deployer.deploy(spec, &packaged.path)?;
                if let Some(backup) = &deployment.backup {
                    info!("Previous {} kept at {}", spec.name, backup.display());
                }
                Ok(Packaged {
                    path: deployment.destination,
                    size_bytes: packaged.size_bytes,
                })
            }
        }
    }
}
