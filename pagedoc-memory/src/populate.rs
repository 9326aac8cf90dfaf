//! In-memory populate joins.
//!
//! Replicates the join semantics of the aggregation-based backends: the
//! local field's value is replaced with the joined document (or an array of
//! joined documents when the local value is an array), and an optional
//! projection trims the joined documents to an allowlist of fields.

use bson::{Bson, Document};

use pagedoc_core::pagination::PopulateSpec;

use crate::evaluator::Comparable;

/// Applies one populate join to a list of documents.
///
/// `source` is the full content of the joined collection; an absent or empty
/// source joins every reference to nothing.
pub(crate) fn apply_populate(
    documents: &mut [Document],
    spec: &PopulateSpec,
    source: &[Document],
) {
    for document in documents.iter_mut() {
        let Some(local_value) = document.get(&spec.local_field).cloned() else {
            continue;
        };

        let joined = match &local_value {
            Bson::Array(references) => Bson::Array(
                references
                    .iter()
                    .flat_map(|reference| find_matches(source, &spec.foreign_field, reference))
                    .map(|doc| Bson::Document(project(doc, spec.projection.as_deref())))
                    .collect(),
            ),
            reference => match find_matches(source, &spec.foreign_field, reference).next() {
                Some(doc) => Bson::Document(project(doc, spec.projection.as_deref())),
                None => Bson::Null,
            },
        };

        document.insert(spec.local_field.clone(), joined);
    }
}

fn find_matches<'a>(
    source: &'a [Document],
    foreign_field: &'a str,
    reference: &'a Bson,
) -> impl Iterator<Item = &'a Document> {
    source.iter().filter(move |candidate| {
        candidate
            .get(foreign_field)
            .is_some_and(|value| Comparable::from(value) == Comparable::from(reference))
    })
}

fn project(document: &Document, projection: Option<&[String]>) -> Document {
    match projection {
        Some(fields) => document
            .iter()
            .filter(|(key, _)| fields.iter().any(|f| f == *key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        None => document.clone(),
    }
}
