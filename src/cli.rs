use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::DEFAULT_COMMAND_TIMEOUT_SECS;

/// Command-line arguments for the snapshot tool.
///
/// One invocation produces exactly one archive. The static file and command
/// lists come from the configuration file; services, containers and pods are
/// discovered at run time unless disabled here.
#[derive(Parser, Debug)]
#[clap(name = "rust-snapshot", about = "Host diagnostic snapshot collector", version)]
pub struct Args {
    /// Path to configuration YAML file (default: built-in file and command lists)
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Directory to write the archive to
    #[clap(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Include container environment values and container/pod logs
    #[clap(long)]
    pub danger: bool,

    /// Deadline for each external command, in seconds
    #[clap(long, default_value_t = DEFAULT_COMMAND_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Maximum number of items collected concurrently (default: number of CPUs)
    #[clap(short, long)]
    pub jobs: Option<usize>,

    /// Leave the host name out of the archive name
    #[clap(long)]
    pub no_hostname: bool,

    /// Skip service journal collection
    #[clap(long)]
    pub no_journals: bool,

    /// Skip container metadata collection
    #[clap(long)]
    pub no_containers: bool,

    /// Skip pod metadata collection
    #[clap(long)]
    pub no_pods: bool,

    /// Docker container state directory
    #[clap(long)]
    pub docker_root: Option<PathBuf>,

    /// Verbose logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Subcommands
    #[clap(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default configuration to a file
    InitConfig {
        /// Path to save the configuration file
        #[clap(default_value = "snapshot_config.yaml")]
        path: PathBuf,
    },
}

impl Args {
    /// Effective concurrency, never zero.
    pub fn jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let args = Args::parse_from(&["rust-snapshot"]);

        assert!(args.config.is_none());
        assert_eq!(args.output, PathBuf::from("."));
        assert!(!args.danger);
        assert_eq!(args.timeout, DEFAULT_COMMAND_TIMEOUT_SECS);
        assert!(args.jobs.is_none());
        assert!(args.jobs() >= 1);
        assert!(!args.no_hostname);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_all_flags() {
        let args = Args::parse_from(&[
            "rust-snapshot",
            "--config", "/etc/snapshot.yaml",
            "--output", "/var/tmp",
            "--danger",
            "--timeout", "5",
            "--jobs", "0",
            "--no-hostname",
            "--no-journals",
            "--no-containers",
            "--no-pods",
            "--docker-root", "/srv/docker/containers",
            "--verbose",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("/etc/snapshot.yaml")));
        assert_eq!(args.output, PathBuf::from("/var/tmp"));
        assert!(args.danger);
        assert_eq!(args.timeout, 5);
        assert_eq!(args.jobs(), 1);
        assert!(args.no_hostname);
        assert!(args.no_journals);
        assert!(args.no_containers);
        assert!(args.no_pods);
        assert_eq!(args.docker_root, Some(PathBuf::from("/srv/docker/containers")));
        assert!(args.verbose);
    }

    #[test]
    fn test_init_config_subcommand() {
        let args = Args::parse_from(&["rust-snapshot", "init-config", "custom-config.yaml"]);

        match args.command {
            Some(Commands::InitConfig { path }) => {
                assert_eq!(path, PathBuf::from("custom-config.yaml"));
            }
            _ => panic!("Expected InitConfig command"),
        }
    }

    #[test]
    fn test_init_config_default_path() {
        let args = Args::parse_from(&["rust-snapshot", "init-config"]);

        match args.command {
            Some(Commands::InitConfig { path }) => {
                assert_eq!(path, PathBuf::from("snapshot_config.yaml"));
            }
            _ => panic!("Expected InitConfig command"),
        }
    }

    #[test]
    fn test_invalid_timeout_rejected() {
        assert!(Args::try_parse_from(&["rust-snapshot", "--timeout", "soon"]).is_err());
    }
}
