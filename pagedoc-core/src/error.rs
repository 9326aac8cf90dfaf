//! Error types and result types for store and pagination operations.
//!
//! This module provides error handling for all pagedoc operations.
//! Use [`PagedocResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use thiserror::Error;

/// Identifies which navigation cursor a pagination error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorSide {
    /// The `next` cursor (forward navigation).
    Next,
    /// The `previous` cursor (backward navigation).
    Previous,
}

impl fmt::Display for CursorSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CursorSide::Next => write!(f, "next"),
            CursorSide::Previous => write!(f, "previous"),
        }
    }
}

/// Represents all possible errors that can occur when interacting with a pagedoc store.
///
/// This enum covers serialization errors, pagination parameter validation,
/// cursor decoding failures, and backend-specific errors.
#[derive(Error, Debug)]
pub enum PagedocError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The pagination limit was missing or smaller than 1.
    #[error("a limit of at least 1 is required")]
    InvalidLimit,
    /// A cursor string failed to decode (bad encoding or a corrupt payload).
    ///
    /// This indicates tampering or version skew and is never silently treated
    /// as "no cursor".
    #[error("{side} cursor is malformed: {reason}")]
    MalformedCursor {
        /// Which navigation cursor failed to decode.
        side: CursorSide,
        /// Decoder diagnostic.
        reason: String,
    },
    /// A decoded cursor carried the wrong number of components for the
    /// current tie-break configuration.
    #[error("{side} cursor has {found} component(s), expected {expected}")]
    CursorComponentMismatch {
        /// Which navigation cursor is at fault.
        side: CursorSide,
        /// Component count required by the tie-break configuration.
        expected: usize,
        /// Component count actually present in the cursor.
        found: usize,
    },
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A specialized `Result` type for pagedoc operations.
pub type PagedocResult<T> = Result<T, PagedocError>;

impl From<BsonError> for PagedocError {
    fn from(err: BsonError) -> Self {
        PagedocError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for PagedocError {
    fn from(err: SerdeJsonError) -> Self {
        PagedocError::Serialization(err.to_string())
    }
}
