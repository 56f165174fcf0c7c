use std::future::Future;

use bytes::Bytes;
use tokio::sync::OnceCell;

use crate::error::CollectError;
use crate::models::EntryHeader;

/// A unit of diagnostic data destined for the archive.
///
/// Implementations materialize their content at most once; every later call
/// to [`Collectible::content`] returns the same bytes without touching the
/// source again.
#[async_trait::async_trait]
pub trait Collectible: Send + Sync {
    /// Canonical path of this item inside the archive.
    fn name(&self) -> &str;

    /// Short alias to create as a symlink at the archive root.
    fn link(&self) -> Option<&str> {
        None
    }

    /// Materialize (or return the already materialized) content.
    async fn content(&self) -> Result<Bytes, CollectError>;

    /// Archive header consistent with the materialized content.
    async fn header(&self) -> Result<EntryHeader, CollectError> {
        let content = self.content().await?;
        Ok(EntryHeader::new(self.name(), content.len() as u64))
    }
}

/// Compute-once cache for collectible content.
///
/// A failed materialization is not cached; the orchestrator never retries a
/// failed item, so in practice every source is touched at most once.
#[derive(Debug, Default)]
pub struct MemoizedContent {
    cell: OnceCell<Bytes>,
}

impl MemoizedContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated cache, for content that is already in memory.
    pub fn ready(content: impl Into<Bytes>) -> Self {
        Self {
            cell: OnceCell::new_with(Some(content.into())),
        }
    }

    /// Return the cached bytes, or drive `init` to produce them.
    ///
    /// `init` is only polled when nothing is cached yet.
    pub async fn get_or_try_init<F>(&self, init: F) -> Result<Bytes, CollectError>
    where
        F: Future<Output = Result<Vec<u8>, CollectError>>,
    {
        self.cell
            .get_or_try_init(move || async move { init.await.map(Bytes::from) })
            .await
            .map(Bytes::clone)
    }

    pub fn is_materialized(&self) -> bool {
        self.cell.initialized()
    }
}

/// Content produced by the collector itself, such as the run summary.
pub struct GeneratedEntry {
    name: String,
    content: MemoizedContent,
}

impl GeneratedEntry {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: MemoizedContent::ready(content),
        }
    }
}

#[async_trait::async_trait]
impl Collectible for GeneratedEntry {
    fn name(&self) -> &str {
        &self.name
    }

    async fn content(&self) -> Result<Bytes, CollectError> {
        self.content.get_or_try_init(async { Ok(Vec::new()) }).await
    }
}
