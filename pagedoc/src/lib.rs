//! Main pagedoc crate providing a unified interface for paginated document storage.
//!
//! This crate is the primary entry point for users of the pagedoc framework.
//! It re-exports the core types and functionality from various sub-crates and provides
//! convenient access to different storage backends.
//!
//! # Features
//!
//! - **Type-safe document storage** - Define your data structures with Serde and store them safely
//! - **Keyset cursor pagination** - Opaque cursors, stable tie-broken ordering, forward and backward navigation
//! - **Populate joins** - Replace reference fields with the documents they point to
//! - **Multiple backends** - Support for in-memory and MongoDB storage with an extensible trait system
//! - **Flexible querying** - Powerful, composable filter API
//!
//! # Quick Start
//!
//! ```ignore
//! use pagedoc::{prelude::*, memory::InMemoryStore};
//! use bson::oid::ObjectId;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! pub struct User {
//!     #[serde(rename = "_id")]
//!     pub id: ObjectId,
//!     pub name: String,
//! }
//!
//! impl Model for User {
//!     fn id(&self) -> &ObjectId { &self.id }
//!     fn collection_name() -> &'static str { "users" }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = DocumentStore::new(InMemoryStore::builder().build().await.unwrap());
//!     let users = store.model_collection::<User>();
//!
//!     let user = User {
//!         id: ObjectId::new(),
//!         name: "Alice".to_string(),
//!     };
//!     users.insert_one(&user).await.unwrap();
//!
//!     // Fetch the first page of up to 25 users by name.
//!     let page = users
//!         .paginate(
//!             PaginationParams::builder(25)
//!                 .paginated_field("name")
//!                 .sort_ascending(true)
//!                 .build(),
//!         )
//!         .await
//!         .unwrap();
//!
//!     // Feed the returned cursor back in to fetch the next page.
//!     if let Some(next) = page.page.next {
//!         let second = users
//!             .paginate(
//!                 PaginationParams::builder(25)
//!                     .paginated_field("name")
//!                     .sort_ascending(true)
//!                     .next(next)
//!                     .build(),
//!             )
//!             .await
//!             .unwrap();
//!     }
//!
//!     store.shutdown().await.unwrap();
//! }
//! ```
//!
//! # Pagination Model
//!
//! Pages are addressed by opaque cursors rather than offsets, so navigation
//! stays consistent while documents are inserted or removed. Each returned
//! [`page::Page`](pagedoc_core::page::Page) carries `previous`/`next` cursor
//! strings and `has_previous`/`has_next` flags; pass a cursor back via
//! `PaginationParams` to move through the result set in either direction.
//!
//! # Backends
//!
//! - [`memory`] - Fast in-memory storage for development and testing
//! - [`mongodb`] - Persistent MongoDB backend (requires `mongodb` feature)

pub mod prelude;

pub use pagedoc_core::{
    backend, collection, cursor, document, error, page, pagination, query, store,
};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use pagedoc_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use pagedoc_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
