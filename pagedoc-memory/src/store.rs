//! In-memory storage implementation for pagedoc stores.
//!
//! This module provides a simple but complete in-memory backend that stores
//! documents as BSON documents in per-collection vectors behind an
//! async-aware read-write lock.

use async_trait::async_trait;
use bson::Document;
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc, time::Duration};

use pagedoc_core::{
    backend::{FindPlan, StoreBackend, StoreBackendBuilder},
    cursor::ID_FIELD,
    error::{PagedocError, PagedocResult},
    pagination::PopulateSpec,
    query::Expr,
};

use crate::{
    evaluator::{DocumentEvaluator, compare_by_sort},
    populate::apply_populate,
};

type StoreMap = HashMap<String, Vec<Document>>;

/// Thread-safe in-memory storage backend.
///
/// This struct implements the [`StoreBackend`] trait to provide a fully
/// functional backend that operates entirely in memory. Documents are stored
/// in insertion order per collection; queries scan the whole collection, so
/// this backend suits development, testing, and small datasets.
///
/// Deadlines are accepted but ignored, and collations are not applied;
/// string comparison is binary.
///
/// # Thread Safety
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state,
/// allowing it to be safely shared across async tasks. Multiple clones of
/// the same instance share the same underlying data.
///
/// # Example
///
/// ```ignore
/// use pagedoc_memory::InMemoryStore;
/// use pagedoc::store::DocumentStore;
///
/// let store = DocumentStore::new(InMemoryStore::new());
/// let items = store.collection("items");
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// The main storage map: collection_name -> documents in insertion order
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    ///
    /// The returned store is ready for use and contains no collections or
    /// documents.
    pub fn new() -> Self {
        Self { store: Arc::new(RwLock::new(StoreMap::new())) }
    }

    /// Creates a builder for constructing an `InMemoryStore`.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }

    fn run_plan(collection: &[Document], plan: &FindPlan) -> Vec<Document> {
        let mut documents = match &plan.filter {
            Some(filter) => DocumentEvaluator::filter_documents(collection.iter(), filter),
            None => collection.to_vec(),
        };

        if !plan.sort.is_empty() {
            documents.sort_by(|a, b| compare_by_sort(a, b, &plan.sort));
        }

        if let Some(limit) = plan.limit {
            documents.truncate(limit.max(0) as usize);
        }

        if let Some(projection) = &plan.projection {
            for document in documents.iter_mut() {
                let kept = document
                    .iter()
                    .filter(|(key, _)| {
                        *key == ID_FIELD || projection.iter().any(|f| f == *key)
                    })
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                *document = kept;
            }
        }

        documents
    }
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn insert_documents(
        &self,
        documents: Vec<Document>,
        collection: &str,
        _deadline: Duration,
    ) -> PagedocResult<()> {
        let mut store = self.store.write().await;
        let existing = store
            .entry(collection.to_string())
            .or_default();

        for document in documents {
            let id = document
                .get(ID_FIELD)
                .ok_or_else(|| {
                    PagedocError::Backend(format!(
                        "document inserted into '{collection}' has no identifier"
                    ))
                })?;

            if existing
                .iter()
                .any(|stored| stored.get(ID_FIELD) == Some(id))
            {
                return Err(PagedocError::Backend(format!(
                    "identifier {id} already exists in collection '{collection}'"
                )));
            }

            existing.push(document);
        }

        Ok(())
    }

    async fn find_documents(
        &self,
        plan: FindPlan,
        collection: &str,
        _deadline: Duration,
    ) -> PagedocResult<Vec<Document>> {
        let store = self.store.read().await;

        Ok(store
            .get(collection)
            .map(|documents| Self::run_plan(documents, &plan))
            .unwrap_or_default())
    }

    async fn count_documents(
        &self,
        filter: Option<Expr>,
        collection: &str,
        _deadline: Duration,
    ) -> PagedocResult<u64> {
        let store = self.store.read().await;
        let Some(documents) = store.get(collection) else {
            return Ok(0);
        };

        let count = match &filter {
            Some(filter) => DocumentEvaluator::filter_documents(documents.iter(), filter).len(),
            None => documents.len(),
        };

        Ok(count as u64)
    }

    async fn aggregate_documents(
        &self,
        plan: FindPlan,
        populate: &[PopulateSpec],
        collection: &str,
        _deadline: Duration,
    ) -> PagedocResult<Vec<Document>> {
        let store = self.store.read().await;
        let mut documents = store
            .get(collection)
            .map(|documents| Self::run_plan(documents, &plan))
            .unwrap_or_default();

        for spec in populate {
            let source = store
                .get(&spec.collection)
                .map(Vec::as_slice)
                .unwrap_or_default();
            apply_populate(&mut documents, spec, source);
        }

        Ok(documents)
    }

    async fn drop_collection(&self, collection: &str) -> PagedocResult<()> {
        self.store.write().await.remove(collection);

        Ok(())
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// Currently a no-op builder, but can be extended to support configuration
/// options like capacity hints.
#[derive(Default)]
pub struct InMemoryStoreBuilder;

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    /// Builds and returns a new [`InMemoryStore`] instance.
    ///
    /// This always succeeds and returns a freshly initialized store.
    async fn build(self) -> PagedocResult<Self::Backend> {
        Ok(InMemoryStore::new())
    }
}
