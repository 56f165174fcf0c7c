//! Integration tests for bounded command execution.

use std::time::{Duration, Instant};

use rust_snapshot::error::CollectError;
use rust_snapshot::runner;

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_large_output_is_drained() {
    let output = runner::run(
        &argv(&["sh", "-c", "head -c 1048576 /dev/zero"]),
        Duration::from_secs(10),
    )
    .await
    .unwrap();
    assert_eq!(output.len(), 1024 * 1024);
}

#[tokio::test]
async fn test_absolute_path_command() {
    let output = runner::run(&argv(&["/bin/sh", "-c", "echo direct"]), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(output, b"direct\n");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_timed_out_process_is_gone() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let pidfile = temp_dir.path().join("pid");
    let script = format!("echo $$ > {}; exec sleep 30", pidfile.display());

    let start = Instant::now();
    let result = runner::run(&argv(&["sh", "-c", &script]), Duration::from_millis(500)).await;
    assert!(matches!(result, Err(CollectError::Timeout { .. })));
    assert!(start.elapsed() < Duration::from_secs(10));

    let pid = std::fs::read_to_string(&pidfile).unwrap();
    let proc_path = format!("/proc/{}", pid.trim());
    assert!(
        !std::path::Path::new(&proc_path).exists(),
        "process {} is still around after timeout",
        pid.trim()
    );
}

#[tokio::test]
async fn test_many_commands_in_parallel() {
    let runs = (0..16).map(|i| {
        let args = argv(&["echo", &i.to_string()]);
        async move { runner::run(&args, Duration::from_secs(10)).await }
    });

    let results = futures::future::join_all(runs).await;
    for (i, result) in results.into_iter().enumerate() {
        assert_eq!(result.unwrap(), format!("{}\n", i).into_bytes());
    }
}
