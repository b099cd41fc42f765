//! Service registry
//!
//! The set of services `srvpack` knows how to package. A registry is built
//! once at startup, either from the built-in table or from the `[[services]]`
//! entries of the configuration file, and is never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;


/// Selector that expands to every registered service
pub const ALL_SERVICES: &str = "all";

/// One independently packageable service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    /// Short name used on the command line
    pub name: String,

    /// Source directory, relative to the source root
    #[serde(rename = "dir")]
    pub source_dir: PathBuf,

    /// File name of the packaged executable
    pub output: String,

    /// Deployment subdirectory, relative to the target directory
    pub target_subdir: PathBuf,

    /// Extra arguments passed to the packager
    #[serde(default)]
    pub pkg_args: Vec<String>,

    #[serde(default)]
    pub description: String,
}

impl ServiceSpec {
    pub fn new(
        name: &str,
        source_dir: &str,
        output: &str,
        target_subdir: &str,
        pkg_args: &[&str],
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            source_dir: PathBuf::from(source_dir),
            output: output.to_string(),
            target_subdir: PathBuf::from(target_subdir),
            pkg_args: pkg_args.iter().map(|a| a.to_string()).collect(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate service name in registry: {0}")]
    DuplicateName(String),

    #[error("service name must not be empty")]
    EmptyName,

    #[error("service name `{0}` is reserved")]
    ReservedName(String),
}

/// Outcome of matching requested names against the registry
#[derive(Debug, Default)]
pub struct Selection<'a> {
    /// Known services, in request order, without duplicates
    pub services: Vec<&'a ServiceSpec>,

    /// Requested names that are not registered
    pub unknown: Vec<String>,
}

/// Immutable table of known services
#[derive(Debug, Clone)]
pub struct ServiceRegistry {
    services: Vec<ServiceSpec>,
}

impl ServiceRegistry {
    /// Build a registry, rejecting empty, reserved or duplicate names
    pub fn new(services: Vec<ServiceSpec>) -> Result<Self, RegistryError> {
        let mut seen = HashSet::new();
        for spec in &services {
            if spec.name.is_empty() {
                return Err(RegistryError::EmptyName);
            }
            if spec.name == ALL_SERVICES {
                return Err(RegistryError::ReservedName(spec.name.clone()));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(RegistryError::DuplicateName(spec.name.clone()));
            }
        }
        Ok(Self { services })
    }

    /// The services shipped with the document server
    pub fn builtin() -> Self {
        Self {
            services: vec![
                ServiceSpec::new(
                    "docservice",
                    "DocService",
                    "docservice",
                    "DocService",
                    &["--options", "max_old_space_size=4096"],
                    "Document service (collaborative editing core)",
                ),
                ServiceSpec::new(
                    "converter",
                    "FileConverter",
                    "converter",
                    "FileConverter",
                    &[],
                    "Conversion service (document format conversion)",
                ),
                ServiceSpec::new(
                    "metrics",
                    "Metrics",
                    "metrics",
                    "Metrics",
                    &[],
                    "Metrics service",
                ),
                ServiceSpec::new(
                    "adminpanel",
                    "AdminPanel/server",
                    "adminpanel",
                    "AdminPanel/server",
                    &[],
                    "Admin panel service",
                ),
            ],
        }
    }

    /// Names selected when `--services` is not given
    pub fn builtin_defaults() -> Vec<String> {
        ["docservice", "converter", "metrics"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ServiceSpec> {
        self.services.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceSpec> {
        self.services.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Resolve requested names. `all` anywhere in the request selects every
    /// registered service in registry order.
    pub fn select<S: AsRef<str>>(&self, requested: &[S]) -> Selection<'_> {
        if requested.iter().any(|r| r.as_ref() == ALL_SERVICES) {
            return Selection {
                services: self.services.iter().collect(),
                unknown: Vec::new(),
            };
        }

        let mut selection = Selection::default();
        for name in requested {
            let name = name.as_ref();
            match self.get(name) {
                Some(spec) => {
                    if !selection.services.iter().any(|s| s.name == spec.name) {
                        selection.services.push(spec);
                    }
                }
                None => selection.unknown.push(name.to_string()),
            }
        }
        selection
    }
}
