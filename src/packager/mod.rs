//! Packaging services into standalone executables
//!
//! The packager checks a service's sources, installs its dependencies if
//! needed, runs the external packaging tool and verifies that the executable
//! was actually written.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ToolsConfig;
use crate::registry::ServiceSpec;

pub mod installer;
pub mod launcher;

pub use installer::{DependencyInstaller, InstallOutcome};
pub use launcher::{Launcher, ToolError};


const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("service directory does not exist: {}", .0.display())]
    MissingSourceDir(PathBuf),

    #[error("manifest not found: {}", .0.display())]
    MissingManifest(PathBuf),

    #[error("output directory does not exist: {}", .0.display())]
    MissingDestination(PathBuf),

    #[error("dependency installation failed for {service}")]
    Install {
        service: String,
        #[source]
        source: ToolError,
    },

    #[error("packaging failed for {service}")]
    Tool {
        service: String,
        #[source]
        source: ToolError,
    },

    #[error("packaged file was not produced: {}", .0.display())]
    OutputMissing(PathBuf),

    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A packaged executable on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packaged {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl Packaged {
    pub fn size_mb(&self) -> f64 {
        size_mb(self.size_bytes)
    }
}

pub fn size_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

pub struct Packager {
    source_root: PathBuf,
    pkg_target: String,
    tools: ToolsConfig,
    launcher: Launcher,
}

impl Packager {
    pub fn new(source_root: impl AsRef<Path>, pkg_target: &str) -> Self {
        Self {
            source_root: source_root.as_ref().to_path_buf(),
            pkg_target: pkg_target.to_string(),
            tools: ToolsConfig::default(),
            launcher: Launcher::for_host(),
        }
    }

    pub fn with_tools(mut self, tools: ToolsConfig) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_launcher(mut self, launcher: Launcher) -> Self {
        self.launcher = launcher;
        self
    }

    pub fn service_dir(&self, spec: &ServiceSpec) -> PathBuf {
        self.source_root.join(&spec.source_dir)
    }

    /// Where the executable for `spec` is written: beside its sources, or
    /// under `<destination>/<target_subdir>` when a destination is given.
    ///
    /// The destination subdirectory must already exist.
    pub fn output_path(
        &self,
        spec: &ServiceSpec,
        destination: Option<&Path>,
    ) -> Result<PathBuf, PackageError> {
        let dir = match destination {
            Some(destination) => {
                let subdir = destination.join(&spec.target_subdir);
                if !subdir.is_dir() {
                    return Err(PackageError::MissingDestination(subdir));
                }
                subdir
            }
            None => self.service_dir(spec),
        };

        // The packager runs inside the service directory
        let path = dir.join(&spec.output);
        std::path::absolute(&path).map_err(|source| PackageError::Io { path, source })
    }

    pub fn package(
        &self,
        spec: &ServiceSpec,
        destination: Option<&Path>,
    ) -> Result<Packaged, PackageError> {
        info!("Packaging {} - {}", spec.name, spec.description);

        let service_dir = self.service_dir(spec);
        if !service_dir.is_dir() {
            return Err(PackageError::MissingSourceDir(service_dir));
        }
        let manifest = service_dir.join(&self.tools.manifest);
        if !manifest.exists() {
            return Err(PackageError::MissingManifest(manifest));
        }

        DependencyInstaller::new(&self.tools, self.launcher)
            .ensure(&service_dir)
            .map_err(|source| PackageError::Install {
                service: spec.name.clone(),
                source,
            })?;

        let output = self.output_path(spec, destination)?;
        info!("Output path: {}", output.display());

        let tool_error = |source: ToolError| PackageError::Tool {
            service: spec.name.clone(),
            source,
        };
        let mut cmd = self.launcher.packager_command(&self.tools).map_err(tool_error)?;
        cmd.arg(".")
            .arg("-t")
            .arg(&self.pkg_target)
            .args(&spec.pkg_args)
            .arg("-o")
            .arg(&output)
            .current_dir(&service_dir);
        debug!("Running command: {:?}", cmd);

        launcher::run(&mut cmd).map_err(tool_error)?;

        // A zero exit status does not guarantee the file was written
        if !output.is_file() {
            return Err(PackageError::OutputMissing(output));
        }

        let size_bytes = std::fs::metadata(&output)
            .map_err(|source| PackageError::Io {
                path: output.clone(),
                source,
            })?
            .len();

        let packaged = Packaged {
            path: output,
            size_bytes,
        };
        info!(
            "{} packaged: {} ({:.2} MB)",
            spec.name,
            packaged.path.display(),
            packaged.size_mb()
        );
        Ok(packaged)
    }
}
