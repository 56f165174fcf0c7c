//! Bounded-time execution of external commands.
//!
//! [`run`] spawns exactly one child process per call and races its completion
//! against a deadline. Whatever the outcome, the child is reaped before the
//! function returns.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use log::{debug, warn};
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::constants::KILL_REAP_GRACE;
use crate::error::CollectError;

/// Run `argv` with `timeout`, returning everything it wrote to stdout.
///
/// Standard error is discarded. A command that exits non-zero is a failure
/// even if it produced output.
///
/// # Errors
///
/// * [`CollectError::EmptyCommand`] if `argv` is empty
/// * [`CollectError::NotFound`] if `argv[0]` is not an executable on `PATH`
/// * [`CollectError::Timeout`] if the deadline expired (the process is killed)
/// * [`CollectError::CommandFailed`] for spawn errors and non-zero exits
pub async fn run(argv: &[String], timeout: Duration) -> Result<Vec<u8>, CollectError> {
    let (program, args) = argv.split_first().ok_or(CollectError::EmptyCommand)?;
    let executable = lookup_executable(program).ok_or_else(|| CollectError::NotFound {
        program: program.clone(),
    })?;
    let command_line = argv.join(" ");

    debug!("Running command: {:?}", command_line);

    let mut child = Command::new(&executable)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| CollectError::CommandFailed {
            command: command_line.clone(),
            reason: e.to_string(),
        })?;

    let mut stdout = child.stdout.take().ok_or_else(|| CollectError::CommandFailed {
        command: command_line.clone(),
        reason: "stdout was not captured".to_string(),
    })?;

    let completion = async {
        let mut output = Vec::new();
        let (read, status) = tokio::join!(stdout.read_to_end(&mut output), child.wait());
        read.and(status).map(|status| (status, output))
    };

    let finished = tokio::select! {
        result = completion => Some(result),
        _ = tokio::time::sleep(timeout) => None,
    };

    match finished {
        Some(Ok((status, output))) if status.success() => Ok(output),
        Some(Ok((status, _))) => Err(CollectError::CommandFailed {
            command: command_line,
            reason: status.to_string(),
        }),
        Some(Err(e)) => Err(CollectError::CommandFailed {
            command: command_line,
            reason: e.to_string(),
        }),
        None => {
            if let Err(e) = child.start_kill() {
                warn!("Error killing command {:?}: {}", command_line, e);
            }
            match tokio::time::timeout(KILL_REAP_GRACE, child.wait()).await {
                Ok(Ok(status)) => debug!("Killed {:?} ({})", command_line, status),
                Ok(Err(e)) => warn!("Error reaping command {:?}: {}", command_line, e),
                Err(_) => warn!("Command {:?} did not exit after kill", command_line),
            }
            Err(CollectError::Timeout {
                command: command_line,
                duration: timeout,
            })
        }
    }
}

/// Resolve `program` the way a shell would: paths containing a separator are
/// taken as-is, bare names are searched for on `PATH`.
pub fn lookup_executable(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    if program.contains('/') {
        let path = Path::new(program);
        return is_executable(path).then(|| path.to_path_buf());
    }

    let search_path = env::var_os("PATH")?;
    env::split_paths(&search_path)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_echo_output_is_captured() {
        let output = run(&argv(&["echo", "hello"]), Duration::from_secs(5)).await.unwrap();
        assert_eq!(output, b"hello\n");
    }

    #[tokio::test]
    async fn test_stderr_is_discarded() {
        let output = run(
            &argv(&["sh", "-c", "echo out; echo err 1>&2"]),
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(output, b"out\n");
    }

    #[tokio::test]
    async fn test_empty_command() {
        let result = run(&[], Duration::from_secs(1)).await;
        assert!(matches!(result, Err(CollectError::EmptyCommand)));
    }

    #[tokio::test]
    async fn test_nonexistent_command() {
        let result = run(&argv(&["nonexistent_command_12345"]), Duration::from_secs(1)).await;
        match result {
            Err(CollectError::NotFound { program }) => assert_eq!(program, "nonexistent_command_12345"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let result = run(&argv(&["sh", "-c", "echo partial; exit 3"]), Duration::from_secs(5)).await;
        assert!(matches!(result, Err(CollectError::CommandFailed { .. })));
    }

    #[tokio::test]
    async fn test_timeout_kills_command() {
        let start = Instant::now();
        let result = run(&argv(&["sleep", "30"]), Duration::from_millis(200)).await;

        assert!(matches!(result, Err(CollectError::Timeout { .. })));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_lookup_executable() {
        assert!(lookup_executable("sh").is_some());
        assert!(lookup_executable("nonexistent_command_12345").is_none());
        assert!(lookup_executable("").is_none());
        assert_eq!(lookup_executable("/bin/sh"), Some(PathBuf::from("/bin/sh")));
        assert!(lookup_executable("/nonexistent/bin/sh").is_none());
    }
}
