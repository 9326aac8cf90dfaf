//! Opaque cursor encoding for keyset pagination.
//!
//! A cursor is an ordered list of (field name, BSON value) pairs derived from
//! a boundary record. It is serialized as a BSON document (which preserves
//! both ordering and value types) and then base64url-encoded without padding,
//! so it can travel inside URLs without escaping. Consumers must treat the
//! string as opaque; its internal layout may change between versions.
//!
//! Type preservation is the reason this is structured serialization rather
//! than string concatenation: a numeric boundary value compared as a string
//! would break the keyset ordering.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use bson::{Bson, Document};
use thiserror::Error;

use crate::error::PagedocResult;

/// Name of the unique identifier field used for tie-breaking.
pub const ID_FIELD: &str = "_id";

/// Why a cursor string failed to decode.
///
/// Callers wrap this into [`PagedocError::MalformedCursor`](crate::error::PagedocError)
/// together with the navigation side that supplied the string.
#[derive(Error, Debug)]
pub enum CursorDecodeError {
    /// The string was not valid unpadded base64url.
    #[error("invalid base64 encoding: {0}")]
    Encoding(#[from] base64::DecodeError),
    /// The decoded bytes were not a valid BSON cursor payload.
    #[error("invalid cursor payload: {0}")]
    Payload(String),
}

/// An ordered, type-preserving list of boundary field values.
///
/// Either one component (paginating on the identifier field, no tie-break
/// needed) or two (paginated-field value first, identifier value second).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cursor {
    fields: Document,
}

impl Cursor {
    /// Creates an empty cursor.
    pub fn new() -> Self {
        Self { fields: Document::new() }
    }

    /// Creates a cursor from ordered (name, value) pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, Bson)>) -> Self {
        Self { fields: Document::from_iter(pairs) }
    }

    /// Derives a cursor from a boundary record.
    ///
    /// Extracts the paginated field's value and, when `tie_break_on_id` is
    /// set, the identifier value as the second component. A field missing
    /// from the record encodes as [`Bson::Null`] so the cursor always carries
    /// the expected number of components.
    pub fn from_record(record: &Document, paginated_field: &str, tie_break_on_id: bool) -> Self {
        let mut fields = Document::new();
        fields.insert(
            paginated_field.to_string(),
            record
                .get(paginated_field)
                .cloned()
                .unwrap_or(Bson::Null),
        );

        if tie_break_on_id {
            fields.insert(
                ID_FIELD.to_string(),
                record.get(ID_FIELD).cloned().unwrap_or(Bson::Null),
            );
        }

        Self { fields }
    }

    /// Number of components in this cursor.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the cursor carries no components.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The component values in order.
    pub fn values(&self) -> Vec<&Bson> {
        self.fields.values().collect()
    }

    /// The components as ordered (name, value) pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &Bson)> {
        self.fields
            .iter()
            .map(|(k, v)| (k.as_str(), v))
    }

    /// Encodes the cursor into an opaque URL-safe string.
    pub fn encode(&self) -> PagedocResult<String> {
        let bytes = bson::ser::serialize_to_vec(&self.fields)?;

        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Decodes an opaque cursor string back into its ordered components.
    pub fn decode(input: &str) -> Result<Self, CursorDecodeError> {
        let bytes = URL_SAFE_NO_PAD.decode(input)?;
        let fields: Document = bson::de::deserialize_from_slice(&bytes)
            .map_err(|e| CursorDecodeError::Payload(e.to_string()))?;

        Ok(Self { fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::{DateTime, doc, oid::ObjectId};

    #[test]
    fn round_trips_typed_values() {
        let id = ObjectId::new();
        let cursor = Cursor::from_pairs(vec![
            ("rank".to_string(), Bson::Int64(42)),
            (ID_FIELD.to_string(), Bson::ObjectId(id)),
        ]);

        let decoded = Cursor::decode(&cursor.encode().unwrap()).unwrap();

        assert_eq!(decoded, cursor);
        assert_eq!(decoded.values(), vec![&Bson::Int64(42), &Bson::ObjectId(id)]);
    }

    #[test]
    fn round_trips_strings_booleans_and_timestamps() {
        let ts = DateTime::now();
        let cursor = Cursor::from_pairs(vec![
            ("name".to_string(), Bson::String("zoe".to_string())),
            ("active".to_string(), Bson::Boolean(true)),
            ("seen_at".to_string(), Bson::DateTime(ts)),
        ]);

        let decoded = Cursor::decode(&cursor.encode().unwrap()).unwrap();

        assert_eq!(decoded, cursor);
    }

    #[test]
    fn preserves_component_order() {
        let cursor = Cursor::from_pairs(vec![
            ("b".to_string(), Bson::Int32(2)),
            ("a".to_string(), Bson::Int32(1)),
        ]);

        let decoded = Cursor::decode(&cursor.encode().unwrap()).unwrap();
        let names: Vec<&str> = decoded.pairs().map(|(k, _)| k).collect();

        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn encoding_is_url_safe_without_padding() {
        let cursor = Cursor::from_pairs(vec![(
            "name".to_string(),
            Bson::String("???>>>~~~".to_string()),
        )]);
        let encoded = cursor.encode().unwrap();

        assert!(
            encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn rejects_non_base64_input() {
        assert!(matches!(
            Cursor::decode("not/base64!"),
            Err(CursorDecodeError::Encoding(_))
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let encoded = Cursor::from_pairs(vec![(ID_FIELD.to_string(), Bson::Int64(7))])
            .encode()
            .unwrap();
        let truncated = &encoded[..encoded.len() / 2];

        assert!(matches!(
            Cursor::decode(truncated),
            Err(CursorDecodeError::Payload(_))
        ));
    }

    #[test]
    fn from_record_extracts_field_and_id() {
        let id = ObjectId::new();
        let record = doc! { "_id": id, "rank": 3_i64 };

        let cursor = Cursor::from_record(&record, "rank", true);

        assert_eq!(cursor.len(), 2);
        assert_eq!(cursor.values(), vec![&Bson::Int64(3), &Bson::ObjectId(id)]);
    }

    #[test]
    fn from_record_encodes_missing_field_as_null() {
        let record = doc! { "_id": ObjectId::new() };

        let cursor = Cursor::from_record(&record, "rank", true);

        assert_eq!(cursor.values()[0], &Bson::Null);
    }
}
