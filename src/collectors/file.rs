use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use bytes::Bytes;
use log::{debug, info};
use tokio::io::AsyncReadExt;

use crate::collectors::collectible::{Collectible, MemoizedContent};
use crate::constants::DEFAULT_ENTRY_MODE;
use crate::error::CollectError;
use crate::models::{unix_now, EntryHeader};

/// A file read verbatim from the host filesystem.
///
/// The file is buffered completely before its header is produced: files under
/// `/proc` and `/sys` report a size of 0 to `stat`, so the size always comes
/// from the buffer.
pub struct StaticFile {
    name: String,
    link: Option<String>,
    content: MemoizedContent,
}

impl StaticFile {
    pub fn new(path: impl Into<String>, link: Option<String>) -> Self {
        Self {
            name: path.into(),
            link: link.filter(|l| !l.is_empty()),
            content: MemoizedContent::new(),
        }
    }

    pub fn path(&self) -> &Path {
        Path::new(&self.name)
    }

    async fn read(&self) -> Result<Vec<u8>, CollectError> {
        let path = self.path();
        info!("Collecting file: {:?}", self.name);

        let mut file = tokio::fs::File::open(path).await.map_err(|source| CollectError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)
            .await
            .map_err(|source| CollectError::Read {
                path: PathBuf::from(&self.name),
                source,
            })?;

        debug!("Read {} bytes from {}", buffer.len(), self.name);
        Ok(buffer)
    }
}

#[async_trait::async_trait]
impl Collectible for StaticFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    async fn content(&self) -> Result<Bytes, CollectError> {
        self.content.get_or_try_init(self.read()).await
    }

    async fn header(&self) -> Result<EntryHeader, CollectError> {
        let content = self.content().await?;

        // Mode and mtime come from the file, size never does.
        let (mode, mtime) = match tokio::fs::metadata(self.path()).await {
            Ok(metadata) => (file_mode(&metadata), file_mtime(&metadata)),
            Err(_) => (DEFAULT_ENTRY_MODE, unix_now()),
        };

        Ok(EntryHeader {
            path: self.name.clone(),
            size: content.len() as u64,
            mode,
            mtime,
        })
    }
}

#[cfg(unix)]
fn file_mode(metadata: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn file_mode(_metadata: &std::fs::Metadata) -> u32 {
    DEFAULT_ENTRY_MODE
}

fn file_mtime(metadata: &std::fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or_else(unix_now)
}
