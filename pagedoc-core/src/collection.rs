//! Collection handles and the cursor pagination engine.
//!
//! This module provides two views onto a named collection:
//!
//! - [`Collection`] - Untyped operations over raw BSON documents
//! - [`ModelCollection`] - Typed operations over a [`Model`] implementation
//!
//! Both are cheap borrows of a store's backend; the typed variant delegates
//! to the untyped engine and converts at the edges.
//!
//! The pagination engine lives in [`Collection::paginate`]. It fetches one
//! document past the requested limit to learn whether more pages exist,
//! restores display order for backward navigation, and derives the boundary
//! cursors from the first and last items of the returned page.

use bson::{Bson, Document, oid::ObjectId};

use crate::{
    backend::{FindPlan, StoreBackend},
    cursor::{Cursor, ID_FIELD},
    document::{Model, ModelExt},
    error::PagedocResult,
    page::{Page, Paginated},
    pagination::{
        PaginationParams, PopulateSpec, build_page_query, effective_collation,
        effective_paginated_field,
    },
    query::Expr,
    store::{LONG_TIMEOUT, MEDIUM_TIMEOUT, SHORT_TIMEOUT},
};

/// An untyped handle to a named collection.
///
/// Operates on raw BSON documents. Obtained from
/// [`DocumentStore::collection`](crate::store::DocumentStore::collection).
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    name: String,
    backend: &'a B,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    /// Creates a collection handle bound to a backend.
    pub fn new(name: String, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// The collection name this handle operates on.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts a single document, assigning a fresh identifier when the
    /// document does not carry one.
    ///
    /// Returns the identifier of the inserted document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or the identifier already exists.
    pub async fn insert_one(&self, mut document: Document) -> PagedocResult<ObjectId> {
        let id = ensure_document_id(&mut document);
        self.backend
            .insert_documents(vec![document], &self.name, MEDIUM_TIMEOUT)
            .await?;

        Ok(id)
    }

    /// Inserts multiple documents, assigning fresh identifiers where absent.
    ///
    /// Returns the identifiers of the inserted documents in input order.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or any identifier already exists.
    pub async fn insert_many(&self, mut documents: Vec<Document>) -> PagedocResult<Vec<ObjectId>> {
        let ids = documents
            .iter_mut()
            .map(ensure_document_id)
            .collect();
        self.backend
            .insert_documents(documents, &self.name, LONG_TIMEOUT)
            .await?;

        Ok(ids)
    }

    /// Finds the first document matching a filter.
    pub async fn find_one(&self, filter: Expr) -> PagedocResult<Option<Document>> {
        let plan = FindPlan {
            filter: Some(filter),
            limit: Some(1),
            ..FindPlan::default()
        };
        let mut documents = self
            .backend
            .find_documents(plan, &self.name, SHORT_TIMEOUT)
            .await?;

        Ok(if documents.is_empty() { None } else { Some(documents.remove(0)) })
    }

    /// Finds a document by its identifier.
    pub async fn find_by_id(&self, id: &ObjectId) -> PagedocResult<Option<Document>> {
        self.find_one(Expr::field(
            ID_FIELD.to_string(),
            crate::query::FieldOp::Eq,
            Bson::ObjectId(*id),
        ))
        .await
    }

    /// Finds all documents matching a filter, or every document when no
    /// filter is given.
    pub async fn find(&self, filter: Option<Expr>) -> PagedocResult<Vec<Document>> {
        self.find_with(FindPlan { filter, ..FindPlan::default() })
            .await
    }

    /// Executes an explicit find plan against this collection.
    pub async fn find_with(&self, plan: FindPlan) -> PagedocResult<Vec<Document>> {
        self.backend
            .find_documents(plan, &self.name, LONG_TIMEOUT)
            .await
    }

    /// Finds documents matching a filter with populate joins applied.
    pub async fn find_and_populate(
        &self,
        filter: Option<Expr>,
        populate: &[PopulateSpec],
    ) -> PagedocResult<Vec<Document>> {
        let plan = FindPlan { filter, ..FindPlan::default() };
        self.backend
            .aggregate_documents(plan, populate, &self.name, LONG_TIMEOUT)
            .await
    }

    /// Counts the documents matching a filter.
    pub async fn count(&self, filter: Option<Expr>) -> PagedocResult<u64> {
        self.backend
            .count_documents(filter, &self.name, LONG_TIMEOUT)
            .await
    }

    /// Fetches one page of results using keyset pagination.
    ///
    /// The page is returned in the requested display order regardless of
    /// navigation direction, together with opaque cursors addressing the
    /// neighboring pages. The optional total count is an extra round trip
    /// over the base filter and never affects the navigation flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the limit is below 1, a supplied cursor fails to
    /// decode or carries the wrong number of components, or the fetch fails.
    pub async fn paginate(&self, params: PaginationParams) -> PagedocResult<Paginated<Document>> {
        let query = build_page_query(&params)?;
        let (paginated_field, tie_break) = effective_paginated_field(&params);

        let count = if params.count_total {
            Some(
                self.backend
                    .count_documents(params.filter.clone(), &self.name, LONG_TIMEOUT)
                    .await?,
            )
        } else {
            None
        };

        let plan = FindPlan {
            filter: query.filter,
            sort: query.sort,
            // One past the limit to learn whether another page follows.
            limit: Some(params.limit + 1),
            projection: cursor_safe_projection(params.projection.clone(), &paginated_field),
            collation: effective_collation(&params),
            hint: params.hint.clone(),
        };

        let mut items = if params.populate.is_empty() {
            self.backend
                .find_documents(plan, &self.name, LONG_TIMEOUT)
                .await?
        } else {
            self.backend
                .aggregate_documents(plan, &params.populate, &self.name, LONG_TIMEOUT)
                .await?
        };

        let has_more = items.len() as i64 > params.limit;
        if has_more {
            items.truncate(params.limit as usize);
        }

        // Backward pages are scanned in reverse; restore display order.
        let paging_backward = params.previous.is_some();
        if paging_backward {
            items.reverse();
        }

        let has_previous = params.next.is_some() || (paging_backward && has_more);
        let has_next = paging_backward || has_more;

        let previous = match (has_previous, items.first()) {
            (true, Some(first)) => {
                Some(Cursor::from_record(first, &paginated_field, tie_break).encode()?)
            }
            _ => None,
        };
        let next = match (has_next, items.last()) {
            (true, Some(last)) => {
                Some(Cursor::from_record(last, &paginated_field, tie_break).encode()?)
            }
            _ => None,
        };

        Ok(Paginated::new(
            items,
            Page { previous, next, has_previous, has_next, count },
        ))
    }
}

/// A typed handle to a named collection.
///
/// Wraps the untyped engine and converts documents to and from `M` at the
/// boundary. Obtained from
/// [`DocumentStore::model_collection`](crate::store::DocumentStore::model_collection).
///
/// # Type Parameters
///
/// * `B` - The backend implementation type
/// * `M` - The model type stored in this collection
#[derive(Debug)]
pub struct ModelCollection<'a, B: StoreBackend, M: Model> {
    inner: Collection<'a, B>,
    _marker: std::marker::PhantomData<M>,
}

impl<'a, B: StoreBackend, M: Model> ModelCollection<'a, B, M> {
    /// Creates a typed collection handle bound to a backend.
    pub fn new(name: String, backend: &'a B) -> Self {
        Self {
            inner: Collection::new(name, backend),
            _marker: std::marker::PhantomData,
        }
    }

    /// The collection name this handle operates on.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Inserts a single model.
    pub async fn insert_one(&self, model: &M) -> PagedocResult<ObjectId> {
        self.inner
            .insert_one(model.to_document()?)
            .await
    }

    /// Inserts multiple models.
    pub async fn insert_many(&self, models: &[M]) -> PagedocResult<Vec<ObjectId>> {
        let documents = models
            .iter()
            .map(ModelExt::to_document)
            .collect::<PagedocResult<Vec<Document>>>()?;
        self.inner.insert_many(documents).await
    }

    /// Finds the first model matching a filter.
    pub async fn find_one(&self, filter: Expr) -> PagedocResult<Option<M>> {
        self.inner
            .find_one(filter)
            .await?
            .map(M::from_document)
            .transpose()
    }

    /// Finds a model by its identifier.
    pub async fn find_by_id(&self, id: &ObjectId) -> PagedocResult<Option<M>> {
        self.inner
            .find_by_id(id)
            .await?
            .map(M::from_document)
            .transpose()
    }

    /// Finds all models matching a filter.
    pub async fn find(&self, filter: Option<Expr>) -> PagedocResult<Vec<M>> {
        self.inner
            .find(filter)
            .await?
            .into_iter()
            .map(M::from_document)
            .collect()
    }

    /// Counts the models matching a filter.
    pub async fn count(&self, filter: Option<Expr>) -> PagedocResult<u64> {
        self.inner.count(filter).await
    }

    /// Fetches one page of models using keyset pagination.
    ///
    /// Populate joins change the document shape, so paginated fetches that
    /// join should go through the untyped engine or a dedicated view type.
    pub async fn paginate(&self, params: PaginationParams) -> PagedocResult<Paginated<M>> {
        self.inner
            .paginate(params)
            .await?
            .try_map(M::from_document)
    }
}

fn ensure_document_id(document: &mut Document) -> ObjectId {
    match document.get_object_id(ID_FIELD) {
        Ok(id) => id,
        Err(_) => {
            let id = ObjectId::new();
            document.insert(ID_FIELD, id);
            id
        }
    }
}

/// Widens a projection so the boundary cursor fields survive the fetch.
fn cursor_safe_projection(
    projection: Option<Vec<String>>,
    paginated_field: &str,
) -> Option<Vec<String>> {
    projection.map(|mut fields| {
        for required in [paginated_field, ID_FIELD] {
            if !fields.iter().any(|f| f == required) {
                fields.push(required.to_string());
            }
        }
        fields
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bson::doc;
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        time::Duration,
    };

    /// Serves a fixed document list and records whether count ran.
    #[derive(Debug, Default)]
    struct FixedBackend {
        documents: Vec<Document>,
        counted: AtomicBool,
    }

    impl FixedBackend {
        fn with_documents(documents: Vec<Document>) -> Self {
            Self { documents, counted: AtomicBool::new(false) }
        }
    }

    #[async_trait]
    impl StoreBackend for FixedBackend {
        async fn insert_documents(
            &self,
            _documents: Vec<Document>,
            _collection: &str,
            _deadline: Duration,
        ) -> PagedocResult<()> {
            Ok(())
        }

        async fn find_documents(
            &self,
            plan: FindPlan,
            _collection: &str,
            _deadline: Duration,
        ) -> PagedocResult<Vec<Document>> {
            let mut documents = self.documents.clone();
            if let Some(limit) = plan.limit {
                documents.truncate(limit as usize);
            }

            Ok(documents)
        }

        async fn count_documents(
            &self,
            _filter: Option<Expr>,
            _collection: &str,
            _deadline: Duration,
        ) -> PagedocResult<u64> {
            self.counted.store(true, Ordering::SeqCst);

            Ok(self.documents.len() as u64)
        }

        async fn aggregate_documents(
            &self,
            plan: FindPlan,
            _populate: &[PopulateSpec],
            collection: &str,
            deadline: Duration,
        ) -> PagedocResult<Vec<Document>> {
            self.find_documents(plan, collection, deadline)
                .await
        }

        async fn drop_collection(&self, _collection: &str) -> PagedocResult<()> {
            Ok(())
        }
    }

    fn numbered_documents(n: i64) -> Vec<Document> {
        (0..n)
            .map(|i| doc! { "_id": ObjectId::new(), "rank": i })
            .collect()
    }

    #[tokio::test]
    async fn paginate_truncates_the_probe_row() {
        let backend = FixedBackend::with_documents(numbered_documents(3));
        let collection = Collection::new("items".to_string(), &backend);

        let page = collection
            .paginate(PaginationParams::builder(2).build())
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(page.page.has_next);
        assert!(!page.page.has_previous);
        assert!(page.page.next.is_some());
        assert!(page.page.previous.is_none());
    }

    #[tokio::test]
    async fn paginate_exact_page_has_no_more() {
        let backend = FixedBackend::with_documents(numbered_documents(2));
        let collection = Collection::new("items".to_string(), &backend);

        let page = collection
            .paginate(PaginationParams::builder(2).build())
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert!(!page.page.has_next);
        assert!(!page.page.has_previous);
        assert!(page.page.next.is_none());
    }

    #[tokio::test]
    async fn paginate_skips_count_unless_requested() {
        let backend = FixedBackend::with_documents(numbered_documents(1));
        let collection = Collection::new("items".to_string(), &backend);

        let page = collection
            .paginate(PaginationParams::builder(2).build())
            .await
            .unwrap();

        assert!(page.page.count.is_none());
        assert!(!backend.counted.load(Ordering::SeqCst));

        let page = collection
            .paginate(PaginationParams::builder(2).count_total(true).build())
            .await
            .unwrap();

        assert_eq!(page.page.count, Some(1));
        assert!(backend.counted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn paginate_empty_collection_yields_empty_page() {
        let backend = FixedBackend::default();
        let collection = Collection::new("items".to_string(), &backend);

        let page = collection
            .paginate(PaginationParams::builder(5).build())
            .await
            .unwrap();

        assert!(page.items.is_empty());
        assert!(!page.page.has_next);
        assert!(!page.page.has_previous);
        assert!(page.page.next.is_none());
        assert!(page.page.previous.is_none());
    }

    #[test]
    fn projection_is_widened_with_cursor_fields() {
        let widened = cursor_safe_projection(Some(vec!["name".to_string()]), "rank").unwrap();

        assert_eq!(widened, vec!["name", "rank", "_id"]);

        let untouched =
            cursor_safe_projection(Some(vec!["rank".to_string(), "_id".to_string()]), "rank")
                .unwrap();

        assert_eq!(untouched, vec!["rank", "_id"]);
        assert_eq!(cursor_safe_projection(None, "rank"), None);
    }

    #[test]
    fn insert_assigns_missing_identifier() {
        let mut document = doc! { "name": "a" };
        let id = ensure_document_id(&mut document);

        assert_eq!(document.get_object_id("_id").unwrap(), id);

        let existing = ObjectId::new();
        let mut document = doc! { "_id": existing };

        assert_eq!(ensure_document_id(&mut document), existing);
    }
}
