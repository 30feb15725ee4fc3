//! Collation service for Vellum.
//!
//! [`Collator`] sits between the request layer and an injected
//! [`ArtifactStore`](vellum_store::ArtifactStore). Besides passing the
//! single-artifact operations through, it composes several artifacts into
//! one ordered byte stream without buffering them.

pub mod collator;
pub mod error;

pub use collator::Collator;
pub use error::{CollateError, CollateResult};
