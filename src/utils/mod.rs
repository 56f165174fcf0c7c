//! Utility functions for snapshot output.
//!
//! ## Components
//!
//! - **Archive**: streaming `.tar.gz` writer for collectibles and links
//! - **Hashing**: SHA-256 digests of archived content
//! - **Summary**: the `summary.json` entry closing every archive
//!
//! ### Writing an Archive
//!
//! ```no_run
//! use rust_snapshot::collectors::collectible::GeneratedEntry;
//! use rust_snapshot::utils::archive::ArchiveBuilder;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let file = std::fs::File::create("/tmp/snapshot.tar.gz")?;
//! let mut archive = ArchiveBuilder::open(file, Some("snapshot"));
//!
//! archive.add(&GeneratedEntry::new("/notes.txt", "hello\n")).await?;
//! archive.link("notes", "/notes.txt")?;
//! archive.close()?;
//! # Ok(())
//! # }
//! ```

/// Streaming gzip-compressed tar writer
pub mod archive;

/// Collection summary generation
pub mod summary;

/// Cryptographic hash calculation utilities
pub mod hash;
