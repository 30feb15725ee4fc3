use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::key::{clean_key, STAGING_DIR};
use crate::traits::{ArtifactReader, ArtifactSink, ArtifactStore};

/// Directory-backed artifact store.
///
/// Each artifact is one file at `{root}/{cleaned key}`. Writes stream into
/// `{root}/.staging/` first and are renamed into place once complete, so a
/// reader sees either the previous content or the new content.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    /// Create a store over an existing root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store, creating the root directory first if needed.
    pub async fn create(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|source| StoreError::StorageUnavailable {
                root: root.clone(),
                source,
            })?;
        Ok(Self { root })
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn artifact_path(&self, key: &str) -> StoreResult<PathBuf> {
        Ok(self.root.join(clean_key(key)?))
    }

    fn unavailable(&self, source: io::Error) -> StoreError {
        StoreError::StorageUnavailable {
            root: self.root.clone(),
            source,
        }
    }

    async fn staging_path(&self) -> StoreResult<PathBuf> {
        let dir = self.root.join(STAGING_DIR);
        match fs::create_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(self.unavailable(e)),
            Err(e) => return Err(StoreError::Io(e)),
        }
        Ok(dir.join(Uuid::now_v7().to_string()))
    }
}

fn not_found_or_io(key: &str) -> impl FnOnce(io::Error) -> StoreError + '_ {
    move |e| {
        if e.kind() == io::ErrorKind::NotFound {
            StoreError::NotFound(key.to_string())
        } else {
            StoreError::Io(e)
        }
    }
}

async fn write_staged(path: &Path, content: &mut ArtifactReader<'_>) -> io::Result<u64> {
    let mut file = File::create(path).await?;
    let written = tokio::io::copy(content, &mut file).await?;
    file.flush().await?;
    file.sync_all().await?;
    Ok(written)
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn list(&self) -> StoreResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.root)
            .await
            .map_err(|e| self.unavailable(e))?;

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.unavailable(e))? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => keys.push(name),
                Err(name) => warn!("skipping non UTF-8 artifact name {:?}", name),
            }
        }
        Ok(keys)
    }

    async fn store(&self, key: &str, content: &mut ArtifactReader<'_>) -> StoreResult<u64> {
        let name = clean_key(key)?;
        let path = self.root.join(&name);
        let staged = self.staging_path().await?;

        let written = match write_staged(&staged, content).await {
            Ok(written) => written,
            Err(e) => {
                if let Err(cleanup) = fs::remove_file(&staged).await {
                    warn!("failed to remove staged write {:?}: {}", staged, cleanup);
                }
                return Err(StoreError::Io(e));
            }
        };

        if let Err(e) = fs::rename(&staged, &path).await {
            if let Err(cleanup) = fs::remove_file(&staged).await {
                warn!("failed to remove staged write {:?}: {}", staged, cleanup);
            }
            return Err(StoreError::Io(e));
        }

        debug!(key = %name, bytes = written, "stored artifact");
        Ok(written)
    }

    async fn length(&self, key: &str) -> StoreResult<u64> {
        let path = self.artifact_path(key)?;
        let metadata = fs::metadata(&path).await.map_err(not_found_or_io(key))?;
        if !metadata.is_file() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(metadata.len())
    }

    async fn pull(&self, key: &str, sink: &mut ArtifactSink<'_>) -> StoreResult<u64> {
        let path = self.artifact_path(key)?;
        let mut file = File::open(&path).await.map_err(not_found_or_io(key))?;
        if !file.metadata().await?.is_file() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        let copied = tokio::io::copy(&mut file, sink).await?;
        debug!(key, bytes = copied, "pulled artifact");
        Ok(copied)
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.artifact_path(key)?;
        // Only regular files are artifacts.
        let metadata = fs::symlink_metadata(&path).await.map_err(not_found_or_io(key))?;
        if metadata.is_dir() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        fs::remove_file(&path).await.map_err(not_found_or_io(key))?;
        debug!(key, "removed artifact");
        Ok(())
    }
}
