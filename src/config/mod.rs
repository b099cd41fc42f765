use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{self, tools};
use crate::registry::{ServiceRegistry, ServiceSpec};


#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default deployment root
    pub target_dir: Option<PathBuf>,

    /// Default packaging target (`auto` selects the host target)
    pub pkg_target: Option<String>,

    /// Services processed when `--services` is not given
    pub default_services: Option<Vec<String>>,

    /// External tool configuration
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Replaces the built-in service table when non-empty
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Packaging command line
    pub packager: String,

    /// Packaging shim looked up on PATH on Windows
    pub packager_windows_shim: String,

    /// Wrapper command line used on Windows when the shim is not on PATH
    pub packager_fallback: String,

    /// Dependency installer command line
    pub installer: String,

    /// Installer arguments for a per-service install
    pub install_args: Vec<String>,

    /// Installer arguments that install the packaging tool globally
    pub global_install_args: Vec<String>,

    /// Manifest file that marks a service as installable
    pub manifest: String,

    /// Directory whose presence means dependencies are installed
    pub dependency_dir: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            packager: tools::PACKAGER.to_string(),
            packager_windows_shim: tools::PACKAGER_WINDOWS_SHIM.to_string(),
            packager_fallback: format!("npx {}", tools::PACKAGER),
            installer: tools::INSTALLER.to_string(),
            install_args: vec!["ci".to_string()],
            global_install_args: vec![
                "install".to_string(),
                "-g".to_string(),
                tools::PACKAGER.to_string(),
            ],
            manifest: tools::MANIFEST.to_string(),
            dependency_dir: tools::DEPENDENCY_DIR.to_string(),
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist. Otherwise `srvpack.toml` in the source
    /// root is used, then `<config dir>/srvpack/config.toml`, then defaults.
    pub fn load(explicit: Option<&Path>, source_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let project_config = source_root.join(constants::CONFIG_FILE_NAME);
        if project_config.exists() {
            return Self::from_file(&project_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join("srvpack").join("config.toml");
            if config_path.exists() {
                return Self::from_file(&config_path);
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Registry described by this configuration
    pub fn registry(&self) -> Result<ServiceRegistry> {
        if self.services.is_empty() {
            return Ok(ServiceRegistry::builtin());
        }
        ServiceRegistry::new(self.services.clone()).context("Invalid [[services]] table")
    }

    pub fn target_dir(&self) -> PathBuf {
        self.target_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::deploy::DEFAULT_TARGET_DIR))
    }

    pub fn pkg_target(&self) -> String {
        self.pkg_target
            .clone()
            .unwrap_or_else(|| constants::target::DEFAULT.to_string())
    }

    pub fn default_services(&self) -> Vec<String> {
        self.default_services
            .clone()
            .unwrap_or_else(ServiceRegistry::builtin_defaults)
    }
}
