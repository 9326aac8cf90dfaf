//! Main document store interface for interacting with storage backends.
//!
//! This module provides the primary API for working with pagedoc stores:
//! [`DocumentStore`] binds a backend and hands out [`Collection`] and
//! [`ModelCollection`] handles.
//!
//! # Example
//!
//! ```ignore
//! use pagedoc::store::DocumentStore;
//! use pagedoc::document::Model;
//!
//! let store = DocumentStore::new(backend);
//! let users = store.model_collection::<User>();
//! ```

use std::time::Duration;

use crate::{
    backend::StoreBackend,
    collection::{Collection, ModelCollection},
    document::Model,
    error::PagedocResult,
};

/// Deadline for point lookups.
pub const SHORT_TIMEOUT: Duration = Duration::from_secs(2);
/// Deadline for single-document writes and ordinary reads.
pub const MEDIUM_TIMEOUT: Duration = Duration::from_secs(5);
/// Deadline for scans, counts, bulk writes, and paginated fetches.
pub const LONG_TIMEOUT: Duration = Duration::from_secs(10);

/// A document store bound to a specific backend implementation.
///
/// This struct provides access to a store with compile-time knowledge of the
/// backend type, so collection handles dispatch statically.
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
///
/// # Example
///
/// ```ignore
/// let store = DocumentStore::new(my_backend);
/// let users = store.model_collection::<User>();
/// ```
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Gets an untyped collection with the given name.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the collection
    pub fn collection<'a>(&'a self, name: &str) -> Collection<'a, B> {
        Collection::new(name.to_string(), &self.backend)
    }

    /// Gets a typed collection for the specified model type.
    ///
    /// The collection name is determined by the model type's
    /// `collection_name()` method.
    pub fn model_collection<'a, M: Model>(&'a self) -> ModelCollection<'a, B, M> {
        ModelCollection::new(M::collection_name().to_string(), &self.backend)
    }

    /// Drops (deletes) a collection with the given name.
    ///
    /// # Errors
    ///
    /// Returns an error if deletion fails.
    pub async fn drop_collection(&self, name: &str) -> PagedocResult<()> {
        self.backend.drop_collection(name).await
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// This consumes the store and should be called when no longer needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown operation fails.
    pub async fn shutdown(self) -> PagedocResult<()> {
        self.backend.shutdown().await?;

        Ok(())
    }
}
