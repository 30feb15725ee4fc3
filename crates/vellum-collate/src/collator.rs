use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tracing::debug;
use vellum_store::{ArtifactReader, ArtifactSink, ArtifactStore};

use crate::error::{CollateError, CollateResult};

/// Artifact operations over an injected store, plus ordered collation.
#[derive(Clone)]
pub struct Collator {
    store: Arc<dyn ArtifactStore>,
}

impl Collator {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }

    /// List stored keys in backend order.
    pub async fn list_artifacts(&self) -> CollateResult<Vec<String>> {
        Ok(self.store.list().await?)
    }

    pub async fn store_artifact(
        &self,
        key: &str,
        content: &mut ArtifactReader<'_>,
    ) -> CollateResult<u64> {
        Ok(self.store.store(key, content).await?)
    }

    pub async fn remove_artifact(&self, key: &str) -> CollateResult<()> {
        Ok(self.store.remove(key).await?)
    }

    /// Total size of the listed artifacts, counting repeats. Fails on the
    /// first key that does not resolve.
    pub async fn measure_artifacts<S>(&self, keys: &[S]) -> CollateResult<u64>
    where
        S: AsRef<str> + Sync,
    {
        let mut size = 0;
        for key in keys {
            size += self.store.length(key.as_ref()).await?;
        }
        Ok(size)
    }

    /// Stream each artifact into `sink` in the given order.
    ///
    /// Fails fast: the first error is returned immediately and bytes of the
    /// artifacts streamed before it stay in the sink. Returns the total
    /// number of bytes written.
    pub async fn collate<S>(&self, keys: &[S], sink: &mut ArtifactSink<'_>) -> CollateResult<u64>
    where
        S: AsRef<str> + Sync,
    {
        let mut written = 0;
        for key in keys {
            written += self.store.pull(key.as_ref(), sink).await?;
        }
        sink.flush().await.map_err(CollateError::Sink)?;
        debug!(artifacts = keys.len(), bytes = written, "collated artifacts");
        Ok(written)
    }
}

impl std::fmt::Debug for Collator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collator").finish_non_exhaustive()
    }
}
