//! Per-service dependency installation

use std::path::Path;
use tracing::{info, warn};

use super::launcher::{self, Launcher, ToolError};
use crate::config::ToolsConfig;

/// What [`DependencyInstaller::ensure`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// No manifest, nothing to install
    NoManifest,
    /// Dependency directory already present; it is not refreshed
    AlreadyInstalled,
    /// The installer ran and succeeded
    Installed,
}

pub struct DependencyInstaller<'a> {
    tools: &'a ToolsConfig,
    launcher: Launcher,
}

impl<'a> DependencyInstaller<'a> {
    pub fn new(tools: &'a ToolsConfig, launcher: Launcher) -> Self {
        Self { tools, launcher }
    }

    pub fn ensure(&self, service_dir: &Path) -> Result<InstallOutcome, ToolError> {
        if !service_dir.join(&self.tools.manifest).exists() {
            warn!(
                "No {} in {}, nothing to install",
                self.tools.manifest,
                service_dir.display()
            );
            return Ok(InstallOutcome::NoManifest);
        }

        if service_dir.join(&self.tools.dependency_dir).exists() {
            info!(
                "Dependencies already present in {}, skipping install",
                service_dir.display()
            );
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        info!("Installing dependencies in {}", service_dir.display());
        let mut cmd = self.launcher.command(&self.tools.installer)?;
        cmd.args(&self.tools.install_args).current_dir(service_dir);
        launcher::run(&mut cmd)?;

        Ok(InstallOutcome::Installed)
    }
}
