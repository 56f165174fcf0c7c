//! Error taxonomy for snapshot collection.
//!
//! Every variant except [`CollectError::Archive`] is scoped to a single
//! collectible or discovery producer: the orchestrator logs it, records it and
//! moves on. An `Archive` error means the output sink is broken and the run
//! cannot produce a usable archive.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while materializing collectibles or writing the archive.
#[derive(Debug, Error)]
pub enum CollectError {
    /// The executable could not be resolved on the search path.
    #[error("could not find {program:?} in PATH")]
    NotFound { program: String },

    /// A command with no arguments at all.
    #[error("cannot run empty command")]
    EmptyCommand,

    /// The command did not finish before its deadline and was killed.
    #[error("timed out after {duration:?} running command: {command:?}")]
    Timeout { command: String, duration: Duration },

    /// The command could not be started, exited non-zero, or its output
    /// could not be read.
    #[error("command {command:?} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    /// A source file could not be opened.
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A source file was opened but could not be read to the end.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A structured document did not have the expected shape.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A discovery producer could not be queried.
    #[error("{producer} unavailable: {reason}")]
    ProducerUnavailable { producer: &'static str, reason: String },

    /// The entry or link name cannot be stored in a tar archive.
    #[error("invalid archive name {0:?}: must be non-empty and free of `..` components")]
    InvalidName(String),

    /// Writing to the output archive failed.
    #[error("archive write failed: {0}")]
    Archive(#[source] io::Error),
}

impl CollectError {
    /// Whether this error should abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CollectError::Archive(_))
    }

    /// Whether the underlying cause looks like a missing permission.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            CollectError::Open { source, .. } | CollectError::Read { source, .. } => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            CollectError::ProducerUnavailable { reason, .. }
            | CollectError::CommandFailed { reason, .. } => {
                reason.contains("Permission denied") || reason.contains("permission denied")
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CollectError::NotFound { program: "nonexistent".to_string() };
        assert_eq!(err.to_string(), r#"could not find "nonexistent" in PATH"#);

        let err = CollectError::EmptyCommand;
        assert_eq!(err.to_string(), "cannot run empty command");

        let err = CollectError::Timeout {
            command: "sleep 10".to_string(),
            duration: Duration::from_secs(1),
        };
        assert!(err.to_string().contains("timed out after 1s"));
    }

    #[test]
    fn test_only_archive_errors_are_fatal() {
        assert!(CollectError::Archive(io::Error::new(io::ErrorKind::Other, "disk full")).is_fatal());
        assert!(!CollectError::EmptyCommand.is_fatal());
        assert!(!CollectError::InvalidName("/commands/ls_/..".to_string()).is_fatal());
        assert!(!CollectError::ProducerUnavailable {
            producer: "docker",
            reason: "no such directory".to_string(),
        }
        .is_fatal());
    }

    #[test]
    fn test_permission_detection() {
        let err = CollectError::Open {
            path: PathBuf::from("/etc/shadow"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(err.is_permission_denied());

        let err = CollectError::Open {
            path: PathBuf::from("/missing"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!err.is_permission_denied());

        let err = CollectError::ProducerUnavailable {
            producer: "docker",
            reason: "Permission denied (os error 13)".to_string(),
        };
        assert!(err.is_permission_denied());
    }
}
