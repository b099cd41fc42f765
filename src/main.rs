use anyhow::{Context, Result};
use srvpack::{
    cli::Cli,
    config::Config,
    packager::Launcher,
    platform::{self, TargetOs},
    service::{
        ensure_packager,
        report::{self, Banner, Markers},
        OutputMode, PackageService, RunConfig,
    },
};
use std::io::IsTerminal;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Initialize logging to stderr
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    // Tools run synchronously; keep the runtime free to notice Ctrl-C
    let code = tokio::select! {
        joined = tokio::task::spawn_blocking(move || run(cli)) => match joined {
            Ok(Ok(code)) => code,
            Ok(Err(e)) => {
                error!("Unexpected error: {:?}", e);
                1
            }
            Err(e) => {
                error!("Unexpected error: {}", e);
                1
            }
        },
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n\nOperation cancelled");
            1
        }
    };

    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let source_root =
        std::path::absolute(&cli.source_dir).context("Failed to resolve source directory")?;
    let config = Config::load(cli.config.as_deref(), &source_root)?;
    let registry = config.registry()?;

    if cli.list {
        print!("{}", report::render_registry(&registry));
        return Ok(0);
    }

    let mode = cli.output_mode();
    let target_dir = cli.target_dir.clone().unwrap_or_else(|| config.target_dir());
    let requested_target = cli.pkg_target.clone().unwrap_or_else(|| config.pkg_target());
    let pkg_target = platform::resolve_target(&requested_target);
    let services = cli
        .services
        .clone()
        .unwrap_or_else(|| config.default_services());

    println!();
    print!(
        "{}",
        report::render_banner(&Banner {
            source_root: &source_root,
            output_dir: (mode != OutputMode::Source).then_some(target_dir.as_path()),
            pkg_target: &pkg_target,
            host_target: platform::host_target(),
            services: &services,
        })
    );

    let host_os = TargetOs::from_host(std::env::consts::OS);
    if let Some(warning) = platform::cross_packaging_warning(host_os, &pkg_target) {
        warn!("{}", warning);
    }
    println!();

    let launcher = Launcher::for_host();
    if !cli.skip_pkg_check {
        if let Err(e) = ensure_packager(&config.tools, launcher) {
            error!("{:#}", e);
            return Ok(1);
        }
    }

    let run_config = RunConfig {
        source_root,
        target_dir,
        pkg_target,
        services,
        mode,
        tools: config.tools.clone(),
        launcher,
    };
    let summary = PackageService::run(&run_config, &registry);

    println!();
    print!("{}", report::render_summary(&summary, Markers::detect()));

    if mode != OutputMode::Source {
        let steps = report::render_next_steps(&summary, &registry, &run_config.target_dir);
        if !steps.is_empty() {
            println!();
            print!("{}", steps);
        }
    }

    Ok(summary.exit_code())
}
