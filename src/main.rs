use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{info, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use rust_snapshot::cli::{Args, Commands};
use rust_snapshot::collectors::collector::{self, RunOptions};
use rust_snapshot::collectors::discovery::Producers;
use rust_snapshot::config::{load_or_default, SnapshotConfig};
use rust_snapshot::privileges;
use rust_snapshot::security::redactor::Redactor;

fn main() -> Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    initialize_logging(args.verbose)?;

    // Handle subcommands
    if let Some(cmd) = &args.command {
        return handle_subcommand(cmd);
    }

    info!("Starting snapshot collection");

    let config = load_or_default(args.config.as_deref())?;
    config.validate();

    privileges::check_privileges();

    let options = build_run_options(&args)?;
    let producers = build_producers(&args);

    let report = collector::run(&config, &producers, &options)?;

    if !report.skipped.is_empty() {
        warn!("{} item(s) were skipped, see above", report.skipped.len());
    }
    println!("Output saved in {}", report.archive_path.display());
    println!("All done!");
    Ok(())
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}

/// Handle subcommands
fn handle_subcommand(cmd: &Commands) -> Result<()> {
    match cmd {
        Commands::InitConfig { path } => {
            info!("Creating default configuration file at {}", path.display());
            SnapshotConfig::create_default_config_file(path)?;
            info!("Configuration created successfully");
            Ok(())
        }
    }
}

fn build_run_options(args: &Args) -> Result<RunOptions> {
    let hostname = if args.no_hostname {
        None
    } else {
        let hostname = hostname::get()
            .map_err(|e| anyhow!("Failed to get hostname: {}", e))?
            .to_string_lossy()
            .into_owned();
        Some(hostname)
    };

    Ok(RunOptions {
        output_dir: args.output.clone(),
        hostname,
        timeout: Duration::from_secs(args.timeout),
        jobs: args.jobs(),
        redactor: Redactor::new(args.danger),
    })
}

fn build_producers(args: &Args) -> Producers {
    let host = Producers::host(Duration::from_secs(args.timeout), args.docker_root.clone());

    Producers {
        units: host.units.filter(|_| !args.no_journals),
        containers: host.containers.filter(|_| !args.no_containers),
        pods: host.pods.filter(|_| !args.no_pods),
    }
}
