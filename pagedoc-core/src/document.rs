//! Core traits and types for model representation and serialization.
//!
//! This module provides the fundamental traits that all stored models must implement,
//! as well as utilities for converting models between different formats (BSON, JSON).

use bson::{
    Bson, Document, de::deserialize_from_bson, oid::ObjectId, ser::serialize_to_bson,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, from_value, to_value};

use crate::error::{PagedocError, PagedocResult};

/// Core trait that all typed documents stored in a pagedoc store must implement.
///
/// This trait defines the minimal interface required for a type to be used with
/// typed collections. Every model must expose its unique identifier and specify
/// which collection it belongs to.
///
/// # Deriving with `#[derive]`
///
/// While `Model` cannot be automatically derived, you can derive its super-traits:
/// - `Serialize` (from serde)
/// - `Deserialize` (from serde)
/// - `Clone`
/// - `Debug`
///
/// # Example
///
/// ```ignore
/// use pagedoc::document::Model;
/// use bson::oid::ObjectId;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// pub struct User {
///     #[serde(rename = "_id")]
///     pub id: ObjectId,
///     pub name: String,
///     pub email: String,
/// }
///
/// impl Model for User {
///     fn id(&self) -> &ObjectId {
///         &self.id
///     }
///
///     fn collection_name() -> &'static str {
///         "users"
///     }
/// }
/// ```
pub trait Model: Serialize + for<'de> Deserialize<'de> + Send + Sync + Clone + 'static {
    /// Returns a reference to this model's unique identifier.
    fn id(&self) -> &ObjectId;

    /// Returns the name of the collection this model belongs to.
    ///
    /// This should be a static, lowercase identifier (e.g., "users", "products").
    fn collection_name() -> &'static str;
}

/// Extension trait providing serialization/deserialization utilities for models.
///
/// This trait is automatically implemented for all types that implement [`Model`].
/// It provides convenient methods to convert models to and from BSON documents
/// and JSON values.
pub trait ModelExt: Model {
    /// Converts this model to a BSON document for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the model does not
    /// serialize to a document.
    fn to_document(&self) -> PagedocResult<Document>;

    /// Creates a model from a BSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_document(document: Document) -> PagedocResult<Self>;

    /// Converts this model to a JSON value for serialization.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn to_json(&self) -> PagedocResult<Value>;

    /// Creates a model from a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails or the structure is invalid.
    fn from_json(value: Value) -> PagedocResult<Self>;
}

impl<M: Model> ModelExt for M {
    fn to_document(&self) -> PagedocResult<Document> {
        match serialize_to_bson(self)? {
            Bson::Document(document) => Ok(document),
            other => Err(PagedocError::Serialization(format!(
                "model serialized to {:?} instead of a document",
                other.element_type()
            ))),
        }
    }

    fn from_document(document: Document) -> PagedocResult<Self> {
        Ok(deserialize_from_bson(Bson::Document(document))?)
    }

    fn to_json(&self) -> PagedocResult<Value> {
        Ok(to_value(self)?)
    }

    fn from_json(value: Value) -> PagedocResult<Self> {
        Ok(from_value(value)?)
    }
}
