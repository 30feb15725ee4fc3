//! Keyed artifact storage for Vellum.
//!
//! An artifact is an opaque byte sequence stored under a string key. Keys
//! form a flat namespace; every key is cleaned with [`clean_key`] before it
//! reaches a backend, so no key can resolve outside the store.
//!
//! # Storage Backends
//!
//! All backends implement the [`ArtifactStore`] trait:
//!
//! - [`FsArtifactStore`] -- one file per artifact under a root directory
//! - [`InMemoryArtifactStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Content is streamed through `AsyncRead`/`AsyncWrite`, never required
//!    to fit in memory (the in-memory backend aside).
//! 2. Storing under an existing key fully replaces the old content.
//! 3. A missing key is always [`StoreError::NotFound`].
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod key;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use fs::FsArtifactStore;
pub use key::{clean_key, STAGING_DIR};
pub use memory::InMemoryArtifactStore;
pub use traits::{ArtifactReader, ArtifactSink, ArtifactStore};
