//! # rs-snapshot
//!
//! A host diagnostic snapshot collector written in Rust.
//!
//! ## Overview
//!
//! rs-snapshot gathers a heterogeneous set of system artifacts (static files,
//! command output, service journals, container and pod metadata) and bundles
//! them into a single `.tar.gz` archive for offline triage. Every source is
//! modelled as a [`collectors::collectible::Collectible`]; the archive builder
//! only ever sees that trait.
//!
//! ## Features
//!
//! - **Bounded commands**: every external command runs with a deadline and is
//!   killed and reaped when it expires
//! - **Parallel collection**: items are materialized concurrently, written in order
//! - **Redaction**: container environment values are masked unless danger mode is on
//! - **Failure isolation**: an unreadable file or a missing runtime never aborts a run
//! - **Collection summary**: `summary.json` with digests of every archived entry
//!
//! ## Usage
//!
//! ```no_run
//! use rust_snapshot::collectors::collector::{run, RunOptions};
//! use rust_snapshot::collectors::discovery::Producers;
//! use rust_snapshot::config::SnapshotConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SnapshotConfig::default_host();
//! let options = RunOptions {
//!     output_dir: "/tmp".into(),
//!     ..RunOptions::default()
//! };
//!
//! let report = run(&config, &Producers::host(options.timeout, None), &options)?;
//! println!("Output saved in {}", report.archive_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`cli`]: Command-line interface definitions and argument parsing
//! - [`models`]: Archive entry metadata
//! - [`collectors`]: Collectible variants, discovery and the run orchestrator
//! - [`config`]: File and command lists
//! - [`runner`]: Bounded-time external command execution
//! - [`utils`]: Archive writing, hashing and the collection summary
//! - [`security`]: Redaction of container metadata
//! - [`privileges`]: Elevated privilege checks
//! - [`constants`]: Application-wide constants
//! - [`error`]: The collection error type

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Core data models and structures used throughout the application
pub mod models;

/// Collectible sources, discovery and orchestration
pub mod collectors;

/// Utility functions for archiving and hashing
pub mod utils;

/// Configuration management
pub mod config;

/// Platform-specific privilege checks
pub mod privileges;

/// Application constants and configuration values
pub mod constants;

/// Redaction of sensitive metadata
pub mod security;

/// Bounded-time process execution
pub mod runner;

/// Error types for collection and archiving
pub mod error;
