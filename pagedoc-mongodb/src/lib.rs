//! MongoDB backend implementation for pagedoc.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait,
//! enabling persistent document storage with query, count, and populate support
//! using MongoDB's query engine and aggregation framework.
//!
//! To use this backend, include the `mongodb` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! pagedoc = { version = "x.y.z", features = ["mongodb"] }
//! ```
//!
//! # Features
//!
//! - **Persistent storage** - Data is persisted to MongoDB Atlas or self-hosted MongoDB
//! - **Full query support** - Filters, multi-key sorts, collations, and index hints
//! - **Populate joins** - `$lookup`-based joins over referenced collections
//! - **Server-side deadlines** - Operation deadlines propagate as `maxTimeMS`
//!
//! # Connection
//!
//! To use this backend, you need a MongoDB connection string. This can be provided
//! through the builder pattern.
//!
//! # Example
//!
//! ```ignore
//! use pagedoc::{backend::StoreBackendBuilder, mongodb::MongoDbStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = MongoDbStore::builder("mongodb://localhost:27017", "my_database")
//!         .build()
//!         .await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as pagedoc_mongodb;

pub mod populate;
pub mod query;
pub mod store;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
