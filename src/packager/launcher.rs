//! Locating and running external tools
//!
//! Unix hosts run configured tools as-is. Windows hosts resolve each program
//! through `PATH` first, because npm installs `.cmd` shims that are not found
//! by a bare program name, and fall back to a wrapper such as `npx pkg` when
//! the packaging shim is missing.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Output};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ToolsConfig;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool command is empty")]
    EmptyCommand,

    #[error("invalid tool command `{command}`")]
    InvalidCommand {
        command: String,
        #[source]
        source: shell_words::ParseError,
    },

    #[error("failed to start `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// How external tools are located and invoked on this host.
///
/// Chosen once at startup with [`Launcher::for_host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launcher {
    /// Run the configured program name directly
    Direct,
    /// Resolve programs through `PATH`, with a wrapper fallback for the packager
    Located,
}

impl Launcher {
    pub fn for_host() -> Self {
        if cfg!(windows) {
            Launcher::Located
        } else {
            Launcher::Direct
        }
    }

    /// Build a command from a command line such as `npm` or `npx pkg`
    pub fn command(&self, command_line: &str) -> Result<Command, ToolError> {
        let words = split(command_line)?;
        let (program, args) = words.split_first().ok_or(ToolError::EmptyCommand)?;

        let mut cmd = match self {
            Launcher::Direct => Command::new(program),
            Launcher::Located => {
                Command::new(which::which(program).unwrap_or_else(|_| PathBuf::from(program)))
            }
        };
        cmd.args(args);
        Ok(cmd)
    }

    /// Build the packaging command, without target or output arguments
    pub fn packager_command(&self, tools: &ToolsConfig) -> Result<Command, ToolError> {
        match self {
            Launcher::Direct => self.command(&tools.packager),
            Launcher::Located => match which::which(&tools.packager_windows_shim) {
                Ok(shim) => {
                    debug!("Using packaging shim {}", shim.display());
                    Ok(Command::new(shim))
                }
                Err(_) if !tools.packager_fallback.trim().is_empty() => {
                    debug!(
                        "{} not found on PATH, falling back to `{}`",
                        tools.packager_windows_shim, tools.packager_fallback
                    );
                    self.command(&tools.packager_fallback)
                }
                Err(_) => self.command(&tools.packager),
            },
        }
    }

    /// Location of the packaging tool on PATH, if it is installed
    pub fn locate_packager(&self, tools: &ToolsConfig) -> Option<PathBuf> {
        let program = match self {
            Launcher::Direct => split(&tools.packager).ok()?.into_iter().next()?,
            Launcher::Located => tools.packager_windows_shim.clone(),
        };
        which::which(program).ok()
    }
}

fn split(command_line: &str) -> Result<Vec<String>, ToolError> {
    shell_words::split(command_line).map_err(|source| ToolError::InvalidCommand {
        command: command_line.to_string(),
        source,
    })
}

/// Render a command the way a user would type it
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command to completion with captured output.
///
/// A non-zero exit is an error carrying the captured stderr. There is no
/// timeout; a hung tool blocks the caller.
pub fn run(cmd: &mut Command) -> Result<Output, ToolError> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    info!("Running: {}", describe(cmd));

    let output = cmd.output().map_err(|source| ToolError::Spawn {
        program: program.clone(),
        source,
    })?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        // stderr is carried in the error and logged by the caller
        debug!("`{}` exited with {}", program, output.status);
        if !stdout.trim().is_empty() {
            debug!("stdout:\n{}", stdout);
        }
        return Err(ToolError::Failed {
            program,
            status: output.status,
            stderr: stderr.trim().to_string(),
        });
    }

    debug!("stdout:\n{}", String::from_utf8_lossy(&output.stdout));
    Ok(output)
}
