//! Collectible sources and snapshot orchestration.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Orchestrator (collector)        │
//! ├─────────────────────────────────────────┤
//! │   Config resolution  │    Discovery     │
//! │                      │ ┌──────┬───────┐ │
//! │                      │ │units │ docker│ │
//! │                      │ │      │  rkt  │ │
//! │                      │ └──────┴───────┘ │
//! ├─────────────────────────────────────────┤
//! │             Collectibles                │
//! │  ┌──────┬─────────┬─────────┬────────┐  │
//! │  │ file │ command │ journal │ docker │  │
//! │  │      │         │         │  pod   │  │
//! │  └──────┴─────────┴─────────┴────────┘  │
//! ├─────────────────────────────────────────┤
//! │            Archive builder              │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use rust_snapshot::collectors::collector::{run_snapshot, RunOptions};
//! use rust_snapshot::collectors::discovery::Producers;
//! use rust_snapshot::config::SnapshotConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = SnapshotConfig::default_host();
//! let report = run_snapshot(&config, &Producers::none(), &RunOptions::default()).await?;
//!
//! println!("Collected {} items", report.collected.len());
//! # Ok(())
//! # }
//! ```

/// The collectible trait and content memoization
pub mod collectible;

/// Run orchestration
pub mod collector;

/// Files read from the host filesystem
pub mod file;

/// External command output
pub mod command;

/// Service journal excerpts
pub mod journal;

/// Container metadata and logs
pub mod container;

/// Pod metadata and logs
pub mod pod;

/// Runtime discovery of journals, containers and pods
pub mod discovery;

/// Skipped item tracking and reporting
pub mod failure_tracker;
