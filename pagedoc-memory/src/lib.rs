//! In-memory storage backend for pagedoc.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreBackend` trait. It uses async-aware read-write locks for concurrent
//! access and is ideal for development, testing, and small-scale use.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Full query support** - Filtering, multi-key sorting, projections, and limits
//! - **Populate joins** - The same join semantics as the aggregation-based backends
//!
//! # Quick Start
//!
//! ```ignore
//! use pagedoc::{DocumentStore, PaginationParams, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::new());
//!     let items = store.collection("items");
//!
//!     items.insert_one(doc! { "name": "first" }).await?;
//!     let page = items
//!         .paginate(PaginationParams::builder(25).build())
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as pagedoc_memory;

pub mod evaluator;
pub mod populate;
pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
