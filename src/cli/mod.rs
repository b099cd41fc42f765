use clap::{CommandFactory, FromArgMatches, Parser};
use std::path::PathBuf;

use crate::constants::target;
use crate::platform::host_target;
use crate::service::OutputMode;

const EXAMPLES: &str = "\
Examples:
  # Package the default services straight into a server layout
  srvpack --target-dir /path/to/server

  # Package only DocService
  srvpack --target-dir /path/to/server --services docservice

  # Package beside the sources without deploying
  srvpack --output-to-source

  # Package DocService and the converter, then deploy with backups
  srvpack --target-dir /path/to/server --services docservice converter --deploy";

#[derive(Parser, Debug)]
#[command(name = "srvpack")]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
pub struct Cli {
    /// Deployment root directory [default: server-build]
    #[arg(long, env = "SRVPACK_TARGET_DIR", value_name = "PATH")]
    pub target_dir: Option<PathBuf>,

    /// Packaging target, or `auto` for the host target
    #[arg(long, value_name = "ID")]
    pub pkg_target: Option<String>,

    /// Services to package, or `all` [default: docservice converter metrics]
    /// Can be given as separate values or as a comma-separated list
    #[arg(long, num_args = 1.., value_delimiter = ',', value_name = "NAME")]
    pub services: Option<Vec<String>>,

    /// Write executables beside their sources instead of the target directory
    #[arg(long)]
    pub output_to_source: bool,

    /// Package beside the sources, then copy into the target directory,
    /// backing up any executable already there
    #[arg(long, conflicts_with = "output_to_source")]
    pub deploy: bool,

    /// Skip checking that the packaging tool is installed
    #[arg(long)]
    pub skip_pkg_check: bool,

    /// Directory containing the service sources
    #[arg(long, env = "SRVPACK_SOURCE_DIR", default_value = ".", value_name = "PATH")]
    pub source_dir: PathBuf,

    /// Configuration file
    #[arg(long, env = "SRVPACK_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// List registered services and exit
    #[arg(long)]
    pub list: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse process arguments, showing the detected host target in the
    /// `--pkg-target` help
    pub fn parse_args() -> Self {
        let help = format!(
            "Packaging target, or `auto` for this host ({}) [default: {}]",
            host_target(),
            target::DEFAULT
        );
        let matches = Cli::command()
            .mut_arg("pkg_target", |arg| arg.help(help))
            .get_matches();
        Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    pub fn output_mode(&self) -> OutputMode {
        if self.output_to_source {
            OutputMode::Source
        } else if self.deploy {
            OutputMode::Deploy
        } else {
            OutputMode::Target
        }
    }
}
