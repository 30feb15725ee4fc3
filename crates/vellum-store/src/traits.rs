use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::StoreResult;

/// Byte source handed to [`ArtifactStore::store`].
pub type ArtifactReader<'a> = dyn AsyncRead + Send + Unpin + 'a;

/// Byte sink handed to [`ArtifactStore::pull`].
pub type ArtifactSink<'a> = dyn AsyncWrite + Send + Unpin + 'a;

/// Keyed storage for opaque artifacts.
///
/// All implementations must satisfy these invariants:
/// - Every key is passed through [`clean_key`](crate::clean_key) before it
///   touches the backing medium; a key never resolves outside the store.
/// - Storing under an existing key replaces the content completely.
/// - Content is streamed in both directions, never required to fit in memory.
/// - Missing keys surface as [`StoreError::NotFound`](crate::StoreError::NotFound),
///   never as a generic I/O error.
/// - Concurrent calls are safe; overlapping writes to one key race and the
///   last to complete wins.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// List every stored key. Order is unspecified.
    async fn list(&self) -> StoreResult<Vec<String>>;

    /// Store the full content of `content` under `key`, replacing any prior
    /// content. Returns the number of bytes stored.
    async fn store(&self, key: &str, content: &mut ArtifactReader<'_>) -> StoreResult<u64>;

    /// Size in bytes of the artifact under `key`, without reading it.
    async fn length(&self, key: &str) -> StoreResult<u64>;

    /// Stream the artifact under `key` into `sink` in one pass. Returns the
    /// number of bytes written.
    async fn pull(&self, key: &str, sink: &mut ArtifactSink<'_>) -> StoreResult<u64>;

    /// Remove the artifact under `key`.
    async fn remove(&self, key: &str) -> StoreResult<()>;
}
