//! A cursor pagination layer over document stores, with a unified interface for
//! querying, counting, and joining collections.
//!
//! This crate is the core of the pagedoc project and provides:
//!
//! - **Model traits** ([`document`]) - Core traits for defining and serializing typed documents
//! - **Store backend abstraction** ([`backend`]) - Traits for implementing different storage backends
//! - **Query and filtering API** ([`query`]) - Type-safe query construction and filtering
//! - **Cursor codec** ([`cursor`]) - Opaque, type-preserving pagination cursors
//! - **Pagination engine** ([`pagination`], [`collection`]) - Keyset pagination with stable tie-broken ordering
//! - **Page results** ([`page`]) - Navigation metadata returned with each page
//! - **Document store** ([`store`]) - Main interface for working with typed or untyped documents
//! - **Error handling** ([`error`]) - Comprehensive error types and result types
//!
//! # Example
//!
//! ```ignore
//! use pagedoc::{Model, DocumentStore, PaginationParams};
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
//!     fn id(&self) -> &ObjectId {
//!         &self.id
//!     }
//!
//!     fn collection_name() -> &'static str {
//!         "users"
//!     }
//! }
//!
//! let store = DocumentStore::new(backend);
//! let page = store
//!     .model_collection::<User>()
//!     .paginate(PaginationParams::builder(25).build())
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as pagedoc_core;

pub mod backend;
pub mod collection;
pub mod cursor;
pub mod document;
pub mod error;
pub mod page;
pub mod pagination;
pub mod query;
pub mod store;
