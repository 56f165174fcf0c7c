use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use futures::future;
use log::{debug, info, warn};
use tokio::sync::Semaphore;

use crate::collectors::collectible::{Collectible, GeneratedEntry};
use crate::collectors::command::ShellCommand;
use crate::collectors::discovery::{discover, DiscoveryOptions, Producers};
use crate::collectors::failure_tracker::{FailureTracker, SkippedItem};
use crate::collectors::file::StaticFile;
use crate::config::SnapshotConfig;
use crate::constants::{ARCHIVE_EXTENSION, ARCHIVE_PREFIX, DEFAULT_COMMAND_TIMEOUT_SECS, SUMMARY_NAME};
use crate::error::CollectError;
use crate::security::redactor::Redactor;
use crate::utils::archive::ArchiveBuilder;
use crate::utils::hash::sha256_hex;
use crate::utils::summary::{create_collection_summary, CollectedEntry};

/// Per-run settings that do not come from the config document.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Directory the archive is created in.
    pub output_dir: PathBuf,
    /// Host name to embed in the archive name, if any.
    pub hostname: Option<String>,
    /// Deadline for every external command.
    pub timeout: Duration,
    /// Maximum number of items materialized at the same time.
    pub jobs: usize,
    pub redactor: Redactor,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            hostname: None,
            timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            jobs: num_cpus::get(),
            redactor: Redactor::safe(),
        }
    }
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub archive_path: PathBuf,
    pub collected: Vec<CollectedEntry>,
    pub skipped: Vec<SkippedItem>,
}

/// `snapshot-<host>-<YYYYmmddHHMMSS>`, or `snapshot-<YYYYmmddHHMMSS>` without a host.
pub fn snapshot_basename(hostname: Option<&str>, timestamp: &str) -> String {
    match hostname {
        Some(host) if !host.is_empty() => format!("{}-{}-{}", ARCHIVE_PREFIX, host, timestamp),
        _ => format!("{}-{}", ARCHIVE_PREFIX, timestamp),
    }
}

/// Build the configured files and commands, in config order.
pub fn resolve_config(config: &SnapshotConfig, timeout: Duration) -> Vec<Box<dyn Collectible>> {
    let files = config
        .files
        .iter()
        .map(|f| Box::new(StaticFile::new(f.name.clone(), f.link.clone())) as Box<dyn Collectible>);
    let commands = config.commands.iter().map(|c| {
        Box::new(ShellCommand::new(c.args.clone(), c.link.clone()).with_timeout(timeout))
            as Box<dyn Collectible>
    });

    files.chain(commands).collect()
}

/// Materialize every item with at most `jobs` in flight.
///
/// Results come back in input order.
pub async fn materialize_all(
    items: &[Box<dyn Collectible>],
    jobs: usize,
) -> Vec<Result<(), CollectError>> {
    let semaphore = Semaphore::new(jobs.max(1));

    let futures = items.iter().map(|item| {
        let semaphore = &semaphore;
        async move {
            let _permit = semaphore.acquire().await;
            debug!("Materializing {}", item.name());
            item.header().await.map(|_| ())
        }
    });

    future::join_all(futures).await
}

/// Materialize `items` and write the successful ones, with their links, to
/// `archive` in list order.
///
/// Item failures, including names the archive cannot hold, are logged and
/// recorded in `tracker`; only archive write failures are returned.
pub async fn write_items<W: Write>(
    items: &[Box<dyn Collectible>],
    jobs: usize,
    archive: &mut ArchiveBuilder<W>,
    tracker: &mut FailureTracker,
) -> Result<Vec<CollectedEntry>, CollectError> {
    let outcomes = materialize_all(items, jobs).await;
    let mut collected = Vec::with_capacity(items.len());

    for (item, outcome) in items.iter().zip(outcomes) {
        if let Err(e) = outcome {
            warn!("Skipping {}: {}", item.name(), e);
            tracker.record(item.name(), &e);
            continue;
        }

        let (header, content) = match archive.add(item.as_ref()).await {
            Ok(written) => written,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Skipping {}: {}", item.name(), e);
                tracker.record(item.name(), &e);
                continue;
            }
        };

        let mut link = item.link();
        if let Some(short) = link {
            match archive.link(short, item.name()) {
                Ok(()) => {}
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("Skipping link {} -> {}: {}", short, item.name(), e);
                    tracker.record(short, &e);
                    link = None;
                }
            }
        }

        collected.push(CollectedEntry {
            name: item.name().to_string(),
            size: header.size,
            sha256: sha256_hex(&content),
            link: link.map(str::to_string),
        });
    }

    Ok(collected)
}

/// Collect a full snapshot into a new archive under `options.output_dir`.
pub async fn run_snapshot(
    config: &SnapshotConfig,
    producers: &Producers,
    options: &RunOptions,
) -> Result<RunReport> {
    let timestamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
    let basename = snapshot_basename(options.hostname.as_deref(), &timestamp);

    std::fs::create_dir_all(&options.output_dir)
        .context(format!("Failed to create output directory {}", options.output_dir.display()))?;
    let archive_path = archive_path_for(&options.output_dir, options.hostname.as_deref(), &timestamp);

    let file = File::create(&archive_path)
        .context(format!("Failed to create archive {}", archive_path.display()))?;
    info!("Writing snapshot to {}", archive_path.display());

    let result = write_snapshot(config, producers, options, &basename, BufWriter::new(file)).await;

    match result {
        Ok((collected, skipped)) => Ok(RunReport {
            archive_path,
            collected,
            skipped,
        }),
        Err(e) => {
            if let Err(remove_err) = std::fs::remove_file(&archive_path) {
                warn!("Failed to remove incomplete archive {}: {}", archive_path.display(), remove_err);
            }
            Err(e).context(format!("Failed to write archive {}", archive_path.display()))
        }
    }
}

async fn write_snapshot<W: Write>(
    config: &SnapshotConfig,
    producers: &Producers,
    options: &RunOptions,
    basename: &str,
    sink: W,
) -> Result<(Vec<CollectedEntry>, Vec<SkippedItem>)> {
    let mut tracker = FailureTracker::new();

    let mut items = resolve_config(config, options.timeout);
    let discovery = DiscoveryOptions {
        redactor: options.redactor,
        timeout: options.timeout,
    };
    items.extend(discover(producers, &discovery, &mut tracker).await);
    info!("Collecting {} items with up to {} jobs", items.len(), options.jobs.max(1));

    let mut archive = ArchiveBuilder::open(sink, Some(basename));
    let collected = write_items(&items, options.jobs, &mut archive, &mut tracker).await?;

    let summary = create_collection_summary(
        options.hostname.as_deref().unwrap_or_default(),
        &chrono::Utc::now().to_rfc3339(),
        options.redactor.is_danger(),
        &collected,
        tracker.skipped(),
    )?;
    archive.add(&GeneratedEntry::new(SUMMARY_NAME, summary)).await?;

    archive.close()?;
    tracker.report_failures();

    info!(
        "Collected {} items, skipped {}",
        collected.len(),
        tracker.failure_count()
    );
    Ok((collected, tracker.into_skipped()))
}

/// Synchronous entry point that drives [`run_snapshot`] on its own runtime.
pub fn run(config: &SnapshotConfig, producers: &Producers, options: &RunOptions) -> Result<RunReport> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(options.jobs.clamp(1, num_cpus::get().max(1)))
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    runtime.block_on(run_snapshot(config, producers, options))
}

/// Archive path a run would use for `hostname` at `timestamp`.
pub fn archive_path_for(output_dir: &Path, hostname: Option<&str>, timestamp: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", snapshot_basename(hostname, timestamp), ARCHIVE_EXTENSION))
}
