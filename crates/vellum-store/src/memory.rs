use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::error::{StoreError, StoreResult};
use crate::key::clean_key;
use crate::traits::{ArtifactReader, ArtifactSink, ArtifactStore};

/// In-memory, HashMap-based artifact store.
///
/// Intended for tests and embedding. Content is buffered whole on store and
/// shared cheaply on pull; the lock is never held across an await point.
pub struct InMemoryArtifactStore {
    artifacts: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryArtifactStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            artifacts: RwLock::new(HashMap::new()),
        }
    }

    /// Number of artifacts currently stored.
    pub fn len(&self) -> usize {
        self.artifacts.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.artifacts.read().expect("lock poisoned").is_empty()
    }

    fn get(&self, key: &str) -> StoreResult<Bytes> {
        let name = clean_key(key)?;
        self.artifacts
            .read()
            .expect("lock poisoned")
            .get(&name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }
}

impl Default for InMemoryArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn list(&self) -> StoreResult<Vec<String>> {
        let map = self.artifacts.read().expect("lock poisoned");
        Ok(map.keys().cloned().collect())
    }

    async fn store(&self, key: &str, content: &mut ArtifactReader<'_>) -> StoreResult<u64> {
        let name = clean_key(key)?;
        let mut data = Vec::new();
        content.read_to_end(&mut data).await?;
        let written = data.len() as u64;
        self.artifacts
            .write()
            .expect("lock poisoned")
            .insert(name, Bytes::from(data));
        Ok(written)
    }

    async fn length(&self, key: &str) -> StoreResult<u64> {
        Ok(self.get(key)?.len() as u64)
    }

    async fn pull(&self, key: &str, sink: &mut ArtifactSink<'_>) -> StoreResult<u64> {
        let data = self.get(key)?;
        sink.write_all(&data).await?;
        Ok(data.len() as u64)
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let name = clean_key(key)?;
        let mut map = self.artifacts.write().expect("lock poisoned");
        match map.remove(&name) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(key.to_string())),
        }
    }
}

impl std::fmt::Debug for InMemoryArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryArtifactStore")
            .field("artifact_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    async fn put(store: &InMemoryArtifactStore, key: &str, data: &[u8]) -> u64 {
        let mut reader = data;
        store.store(key, &mut reader).await.unwrap()
    }

    async fn get(store: &InMemoryArtifactStore, key: &str) -> StoreResult<Vec<u8>> {
        let mut sink = Vec::new();
        store.pull(key, &mut sink).await?;
        Ok(sink)
    }

    #[tokio::test]
    async fn store_and_pull() {
        let store = InMemoryArtifactStore::new();
        assert_eq!(put(&store, "a", b"hello").await, 5);
        assert_eq!(get(&store, "a").await.unwrap(), b"hello");
        assert_eq!(store.length("a").await.unwrap(), 5);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn overwrite_replaces() {
        let store = InMemoryArtifactStore::new();
        put(&store, "a", b"first").await;
        put(&store, "a", b"second").await;
        assert_eq!(get(&store, "a").await.unwrap(), b"second");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn keys_are_cleaned() {
        let store = InMemoryArtifactStore::new();
        put(&store, "./a", b"x").await;
        assert_eq!(store.list().await.unwrap(), vec!["a".to_string()]);
        assert_eq!(get(&store, "../a").await.unwrap(), b"x");

        let mut reader: &[u8] = b"x";
        assert!(matches!(
            store.store("a/b", &mut reader).await.unwrap_err(),
            StoreError::InvalidKey { .. }
        ));
    }

    #[tokio::test]
    async fn remove_then_missing() {
        let store = InMemoryArtifactStore::new();
        put(&store, "a", b"x").await;
        store.remove("a").await.unwrap();
        assert!(store.is_empty());
        assert!(get(&store, "a").await.unwrap_err().is_not_found());
        assert!(store.remove("a").await.unwrap_err().is_not_found());
        assert!(store.length("a").await.unwrap_err().is_not_found());
    }

    #[test]
    fn debug_shows_count() {
        let store = InMemoryArtifactStore::new();
        assert!(format!("{store:?}").contains("artifact_count: 0"));
    }

    proptest! {
        #[test]
        fn round_trip_any_bytes(data in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let pulled = rt.block_on(async {
                let store = InMemoryArtifactStore::new();
                put(&store, "blob", &data).await;
                get(&store, "blob").await.unwrap()
            });
            prop_assert_eq!(pulled, data);
        }
    }
}
