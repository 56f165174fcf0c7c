//! Global constants for the snapshot collector.
//!
//! This module centralizes hardcoded values: archive namespaces, timeouts,
//! redaction markers and the default external-command invocations.

use std::time::Duration;

// Timeout constants
/// Default deadline for a single external command (seconds)
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

/// Deadline for querying the pod runtime
pub const POD_RUNTIME_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait for a killed child to be reaped
pub const KILL_REAP_GRACE: Duration = Duration::from_secs(2);

/// How many days of service logs to collect
pub const JOURNAL_DAYS: u32 = 7;

// Archive namespaces
/// Namespace for command output
pub const COMMANDS_DIR: &str = "/commands/";

/// Namespace for service log excerpts
pub const LOGS_DIR: &str = "/logs/";

/// Namespace for container metadata and container logs
pub const CONTAINERS_DIR: &str = "/containers/";

/// Namespace for pod metadata and pod logs
pub const PODS_DIR: &str = "/pods/";

/// Name of the collection summary written at the end of every archive
pub const SUMMARY_NAME: &str = "summary.json";

// Archive entry defaults
/// Mode for entries without a backing file
pub const DEFAULT_ENTRY_MODE: u32 = 0o644;

/// Mode for symlink entries
pub const SYMLINK_MODE: u32 = 0o777;

/// Prefix of the archive file name and its top-level directory
pub const ARCHIVE_PREFIX: &str = "snapshot";

/// Archive file extension
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

// Discovery sources
/// Directory holding one subdirectory per docker container
pub const DOCKER_CONTAINERS_DIR: &str = "/var/lib/docker/containers";

/// Per-container config document name
pub const DOCKER_CONFIG_FILE: &str = "config.v2.json";

/// Pattern for unit fragment paths whose journals get collected
pub const SERVICE_FRAGMENT_PATTERN: &str = r"/usr/lib(32|64)?/systemd/system/.*\.service";

/// Pod state that qualifies a pod for log collection in danger mode
pub const POD_STATE_RUNNING: &str = "running";

// Redaction
/// Replaces the value of every masked environment variable
pub const REDACTION_MARKER: &str = "<REDACTED>";

/// Content emitted for container configs that cannot be parsed
pub const UNRECOGNIZED_FORMAT: &str = "unrecognized container config format";

/// Content emitted when the Env list of a container config is malformed
pub const UNPARSABLE_ENV: &str = "could not parse container Env";
