//! Streaming gzip-compressed tar output.
//!
//! Entries are written in the order they are added. Every regular entry is
//! fully materialized before its header is written, so the header size always
//! matches the body even for pseudo-files that report a size of 0.

use std::io::Write;

use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;
use tar::{EntryType, Header};

use crate::collectors::collectible::Collectible;
use crate::constants::SYMLINK_MODE;
use crate::error::CollectError;
use crate::models::{unix_now, EntryHeader};

/// Writes collectibles into a `.tar.gz` stream.
pub struct ArchiveBuilder<W: Write> {
    builder: tar::Builder<GzEncoder<W>>,
    prefix: Option<String>,
    entries: usize,
}

impl<W: Write> ArchiveBuilder<W> {
    /// Wrap `sink`. When `prefix` is set every entry lives under that
    /// directory.
    pub fn open(sink: W, prefix: Option<&str>) -> Self {
        let encoder = GzEncoder::new(sink, Compression::default());
        let mut builder = tar::Builder::new(encoder);
        builder.follow_symlinks(false);

        Self {
            builder,
            prefix: prefix
                .map(|p| p.trim_matches('/').to_string())
                .filter(|p| !p.is_empty()),
            entries: 0,
        }
    }

    /// Materialize `item` and append it as a regular file, returning the
    /// header and body that were written.
    ///
    /// Item failures and unusable names are returned unchanged and nothing is
    /// written; write failures are [`CollectError::Archive`].
    pub async fn add(&mut self, item: &dyn Collectible) -> Result<(EntryHeader, Bytes), CollectError> {
        let content = item.content().await?;
        let header = item.header().await?;
        self.append(&header, &content)?;
        Ok((header, content))
    }

    /// Append a regular entry whose body is already in memory.
    pub fn append(&mut self, entry: &EntryHeader, content: &[u8]) -> Result<(), CollectError> {
        let path = self.archive_path(&entry.path)?;

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(content.len() as u64);
        header.set_mode(entry.mode);
        header.set_mtime(entry.mtime);

        debug!("Adding {} ({} bytes)", path, content.len());
        self.builder
            .append_data(&mut header, &path, content)
            .map_err(CollectError::Archive)?;
        self.entries += 1;
        Ok(())
    }

    /// Append a symlink `short -> target`. Neither path keeps a leading `/`.
    pub fn link(&mut self, short: &str, target: &str) -> Result<(), CollectError> {
        let path = self.archive_path(short)?;
        let target = target.trim_start_matches('/');

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Symlink);
        header.set_size(0);
        header.set_mode(SYMLINK_MODE);
        header.set_mtime(unix_now());

        debug!("Linking {} -> {}", path, target);
        self.builder
            .append_link(&mut header, &path, target)
            .map_err(CollectError::Archive)?;
        self.entries += 1;
        Ok(())
    }

    /// Number of entries written so far, links included.
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write the tar trailer, then the gzip trailer, and hand back the sink.
    pub fn close(self) -> Result<W, CollectError> {
        let encoder = self.builder.into_inner().map_err(CollectError::Archive)?;
        let mut sink = encoder.finish().map_err(CollectError::Archive)?;
        sink.flush().map_err(CollectError::Archive)?;
        Ok(sink)
    }

    fn archive_path(&self, name: &str) -> Result<String, CollectError> {
        archive_path(self.prefix.as_deref(), name)
    }
}

/// The path an entry named `name` gets inside the archive.
///
/// Names that are empty once leading slashes are gone, or that contain a `..`
/// component, are [`CollectError::InvalidName`].
pub fn archive_path(prefix: Option<&str>, name: &str) -> Result<String, CollectError> {
    let relative = name.trim_start_matches('/');
    if relative.is_empty() || relative.split('/').any(|component| component == "..") {
        return Err(CollectError::InvalidName(name.to_string()));
    }

    Ok(match prefix {
        Some(prefix) => format!("{}/{}", prefix, relative),
        None => relative.to_string(),
    })
}
