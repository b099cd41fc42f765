//! Deploying packaged executables into a server layout
//!
//! An existing executable at the destination is copied aside to
//! `<name>.backup.<YYYYmmdd_HHMMSS>` before being overwritten. Backups are
//! never pruned. Timestamps have one-second resolution, so two deployments
//! of the same service within one second share a backup name and the second
//! backup replaces the first.

use chrono::{DateTime, Local};
use filetime::FileTime;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::constants::deploy::{BACKUP_INFIX, BACKUP_TIMESTAMP_FORMAT};
use crate::registry::ServiceSpec;

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("target directory does not exist: {}", .0.display())]
    MissingTargetDir(PathBuf),

    #[error("packaged file does not exist: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("packaged file is already at its destination: {}", .0.display())]
    SameFile(PathBuf),

    #[error("failed to back up {}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to copy {} to {}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to set permissions on {}", path.display())]
    Permissions {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a successful deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deployment {
    pub destination: PathBuf,
    pub backup: Option<PathBuf>,
}

/// Backup file name for `destination` at time `now`
pub fn backup_path(destination: &Path, now: &DateTime<Local>) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(BACKUP_INFIX);
    name.push(now.format(BACKUP_TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

/// Copy `destination` aside if it exists
pub fn create_backup(
    destination: &Path,
    now: &DateTime<Local>,
) -> Result<Option<PathBuf>, DeployError> {
    if !destination.exists() {
        return Ok(None);
    }

    let backup = backup_path(destination, now);
    info!(
        "Backing up existing file to {}",
        backup.file_name().unwrap_or_default().to_string_lossy()
    );
    copy_preserving_times(destination, &backup).map_err(|source| DeployError::Backup {
        path: destination.to_path_buf(),
        source,
    })?;
    Ok(Some(backup))
}

/// Copy a file including its permission bits and access/modification times
pub fn copy_preserving_times(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    let metadata = fs::metadata(from)?;
    filetime::set_file_times(
        to,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
}

/// Make `path` executable by everyone and writable by its owner
pub fn make_executable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        permissions.set_mode(crate::constants::deploy::EXECUTABLE_MODE);
    }

    #[cfg(not(unix))]
    {
        // Only the read-only flag exists here
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
    }

    fs::set_permissions(path, permissions)
}

/// Copies packaged executables into `<target_dir>/<target_subdir>/<output>`
pub struct Deployer {
    target_dir: PathBuf,
}

impl Deployer {
    pub fn new(target_dir: impl AsRef<Path>) -> Self {
        Self {
            target_dir: target_dir.as_ref().to_path_buf(),
        }
    }

    pub fn destination(&self, spec: &ServiceSpec) -> PathBuf {
        self.target_dir.join(&spec.target_subdir).join(&spec.output)
    }

    pub fn deploy(&self, spec: &ServiceSpec, artifact: &Path) -> Result<Deployment, DeployError> {
        self.deploy_at(spec, artifact, &Local::now())
    }

    /// Deploy using `now` for the backup timestamp
    pub fn deploy_at(
        &self,
        spec: &ServiceSpec,
        artifact: &Path,
        now: &DateTime<Local>,
    ) -> Result<Deployment, DeployError> {
        info!("Deploying {}...", spec.name);

        let subdir = self.target_dir.join(&spec.target_subdir);
        if !subdir.is_dir() {
            return Err(DeployError::MissingTargetDir(subdir));
        }
        if !artifact.is_file() {
            return Err(DeployError::MissingArtifact(artifact.to_path_buf()));
        }

        let destination = self.destination(spec);
        if is_same_file(artifact, &destination) {
            return Err(DeployError::SameFile(destination));
        }

        let backup = create_backup(&destination, now)?;

        info!("Copying new file to {}", destination.display());
        copy_preserving_times(artifact, &destination).map_err(|source| DeployError::Copy {
            from: artifact.to_path_buf(),
            to: destination.clone(),
            source,
        })?;

        make_executable(&destination).map_err(|source| DeployError::Permissions {
            path: destination.clone(),
            source,
        })?;

        info!("{} deployed", spec.name);
        Ok(Deployment {
            destination,
            backup,
        })
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
