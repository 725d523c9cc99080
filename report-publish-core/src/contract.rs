#![allow(unused)]

//! # contract: the storage seam
//!
//! This module defines the single trait ([`StorageBackend`]) the pipeline uses
//! to push bytes into an object store. Everything upstream (materializing,
//! entry-point selection, archiving) is storage-agnostic.
//!
//! ## Implementing a backend
//! - Implement [`StorageBackend`] for your destination (HTTP bucket, local
//!   directory, test recorder).
//! - The handle is shared across every concurrent upload task, so it must be
//!   `Send + Sync` and safe for concurrent `create` calls.
//! - Convert upstream failures to a boxed error. The dispatcher logs them and
//!   moves on; nothing retries.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`, so consumers get `MockStorageBackend`
//!   in tests or with the `test-export-mocks` feature.

use async_trait::async_trait;

use mockall::{automock, predicate::*};

/// Error type returned by storage backends.
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for storing objects in a bucket.
///
/// Keys always use `/` between segments, whatever the host separator is.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Create (or overwrite) the object `key` in `bucket` with `bytes`.
    async fn create(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), BackendError>;
}
