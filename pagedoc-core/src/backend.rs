//! Backend abstraction layer for document storage implementations.
//!
//! This module defines the [`StoreBackend`] trait that storage backends must
//! implement, along with the [`FindPlan`] struct describing one fetch. The
//! pagination engine only ever talks to a backend through this seam, so any
//! implementation of the trait gains cursor pagination, counting, and
//! populate joins for free.

use async_trait::async_trait;
use bson::Document;
use std::{fmt::Debug, time::Duration};

use crate::{
    error::PagedocResult,
    pagination::PopulateSpec,
    query::{Collation, Expr, Sort},
};

/// A fully-resolved fetch against one collection.
///
/// Built by the pagination engine (filter augmented with the keyset boundary,
/// sort carrying the tie-break key) or directly by the simpler find helpers.
/// Every field is optional so the same plan type serves both paths.
#[derive(Debug, Clone, Default)]
pub struct FindPlan {
    /// Filter expression; `None` matches every document.
    pub filter: Option<Expr>,
    /// Sort keys applied in order.
    pub sort: Vec<Sort>,
    /// Maximum number of documents to return.
    pub limit: Option<i64>,
    /// Allowlist of fields to return; `None` returns full documents.
    pub projection: Option<Vec<String>>,
    /// Locale-aware comparison rule for filter and sort.
    pub collation: Option<Collation>,
    /// Index hint passed through to backends that support one.
    pub hint: Option<String>,
}

/// Backend interface for document storage implementations.
///
/// Implementations must be `Send + Sync` so a store can be shared across
/// tasks. Every data operation carries a `deadline`: backends that talk to a
/// remote store propagate it as a server-side time limit, embedded backends
/// may ignore it.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts the given documents into a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if any document violates a uniqueness constraint or
    /// the write fails.
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<()>;

    /// Executes a find plan against a collection.
    ///
    /// Returns matching documents in the plan's sort order, up to the plan's
    /// limit.
    async fn find_documents(
        &self,
        plan: FindPlan,
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<Vec<Document>>;

    /// Counts the documents in a collection matching a filter.
    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<u64>;

    /// Executes a find plan with populate joins applied to each result.
    ///
    /// The joins run after the plan's filter, sort, and limit, so boundary
    /// cursors derived from the results still reference the original field
    /// values.
    async fn aggregate_documents(
        &self,
        plan: FindPlan,
        populate: &[PopulateSpec],
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<Vec<Document>>;

    /// Drops (deletes) a collection and all its documents.
    async fn drop_collection(&self, collection: &str) -> PagedocResult<()>;

    /// Shuts down the backend and releases its resources.
    async fn shutdown(self) -> PagedocResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
impl<B: StoreBackend> StoreBackend for &B {
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<()> {
        (**self)
            .insert_documents(documents, collection, deadline)
            .await
    }

    async fn find_documents(
        &self,
        plan: FindPlan,
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<Vec<Document>> {
        (**self)
            .find_documents(plan, collection, deadline)
            .await
    }

    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<u64> {
        (**self)
            .count_documents(filter, collection, deadline)
            .await
    }

    async fn aggregate_documents(
        &self,
        plan: FindPlan,
        populate: &[PopulateSpec],
        collection: &str,
        deadline: Duration,
    ) -> PagedocResult<Vec<Document>> {
        (**self)
            .aggregate_documents(plan, populate, collection, deadline)
            .await
    }

    async fn drop_collection(&self, collection: &str) -> PagedocResult<()> {
        (**self).drop_collection(collection).await
    }
}

/// Factory trait for constructing store backends from configuration.
///
/// Separating construction from the backend itself lets callers hold a
/// builder (connection string, database name) and defer the actual
/// connection until first use.
#[async_trait]
pub trait StoreBackendBuilder: Send + Sync {
    /// The backend type this builder produces.
    type Backend: StoreBackend;

    /// Builds and initializes the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the connection
    /// cannot be established.
    async fn build(self) -> PagedocResult<Self::Backend>;
}
