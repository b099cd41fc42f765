//! Packaging tool availability check

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::ToolsConfig;
use crate::packager::launcher::{self, Launcher};

/// Make sure the packaging tool is installed, installing it globally with
/// the dependency installer when it is missing from PATH
pub fn ensure_packager(tools: &ToolsConfig, launcher: Launcher) -> Result<()> {
    info!("Checking whether {} is installed...", tools.packager);

    if let Some(path) = launcher.locate_packager(tools) {
        info!("{} found at {}", tools.packager, path.display());
        return Ok(());
    }

    warn!("{} is not installed, installing it now", tools.packager);
    let manual = format!("{} {}", tools.installer, tools.global_install_args.join(" "));

    let mut cmd = launcher
        .command(&tools.installer)
        .with_context(|| format!("Failed to install {}", tools.packager))?;
    cmd.args(&tools.global_install_args);
    launcher::run(&mut cmd).with_context(|| {
        format!(
            "Failed to install {}; install it manually with `{}`",
            tools.packager, manual
        )
    })?;

    info!("{} installed", tools.packager);
    Ok(())
}
