//! Convenient re-exports of commonly used types from pagedoc.
//!
//! Import this prelude module to quickly access the most frequently used types
//! and traits without needing to import from multiple sub-modules:
//!
//! ```ignore
//! use pagedoc::prelude::*;
//! ```
//!
//! This provides access to:
//! - Model traits and serialization helpers
//! - Store backends and builders
//! - Query construction and filtering
//! - Pagination parameters, pages, and cursors
//! - Collection interfaces and error types

pub use pagedoc_core::{
    backend::{FindPlan, StoreBackend, StoreBackendBuilder},
    collection::{Collection, ModelCollection},
    cursor::Cursor,
    document::{Model, ModelExt},
    error::{CursorSide, PagedocError, PagedocResult},
    page::{Page, Paginated},
    pagination::{PaginationParams, PaginationParamsBuilder, PopulateSpec},
    query::{Collation, Expr, FieldOp, Filter, QueryVisitor, Sort, SortDirection},
    store::DocumentStore,
};
