//! Filter expression evaluation for in-memory documents.
//!
//! This module provides the evaluation engine for filter expressions,
//! enabling filtering and comparison operations directly on BSON documents.

use bson::{Bson, datetime::DateTime, oid::ObjectId};
use std::{cmp::Ordering, collections::HashMap};

use pagedoc_core::{
    error::{PagedocError, PagedocResult},
    query::{Expr, FieldOp, QueryVisitor, Sort, SortDirection},
};

/// Comparable representation of BSON values.
///
/// Wraps borrowed BSON values and provides the comparison semantics used for
/// filtering and sorting. Numeric types are normalized to f64 so mixed
/// integer and float fields compare as expected; identifiers compare by their
/// byte order, which matches their creation order for generated identifiers.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null or any non-comparable value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// Unique identifier value
    ObjectId(&'a ObjectId),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::ObjectId(value) => Comparable::ObjectId(value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null,
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::ObjectId(a), Comparable::ObjectId(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Compares two documents by an ordered list of sort keys.
///
/// Missing fields and incomparable values compare as equal, so the sort is
/// stable in their presence and later keys still break ties.
pub(crate) fn compare_by_sort(
    a: &bson::Document,
    b: &bson::Document,
    sort: &[Sort],
) -> Ordering {
    for key in sort {
        let left = a
            .get(&key.field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);
        let right = b
            .get(&key.field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);

        let ordering = match key.direction {
            SortDirection::Asc => left.partial_cmp(&right),
            SortDirection::Desc => right.partial_cmp(&left),
        }
        .unwrap_or(Ordering::Equal);

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Evaluates filter expressions against a single document.
pub(crate) struct DocumentEvaluator<'a> {
    document: &'a bson::Document,
}

impl<'a> DocumentEvaluator<'a> {
    pub fn new(document: &'a bson::Document) -> Self {
        Self { document }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> PagedocResult<bool> {
        self.visit_expr(expr)
    }

    /// Returns the documents matching an expression, in input order.
    pub fn filter_documents(
        documents: impl IntoIterator<Item = &'a bson::Document>,
        expr: &Expr,
    ) -> Vec<bson::Document> {
        documents
            .into_iter()
            .filter(|doc| {
                DocumentEvaluator::new(doc)
                    .evaluate(expr)
                    .unwrap_or(false)
            })
            .cloned()
            .collect::<Vec<_>>()
    }
}

fn array_contains(array: &[Comparable<'_>], value: &Comparable<'_>) -> bool {
    array.iter().any(|item| item == value)
}

/// Whether any element is shared between a field value and a filter value,
/// treating scalars as single-element sets.
fn any_overlap(field_value: &Comparable<'_>, value: &Comparable<'_>) -> bool {
    match (field_value, value) {
        (Comparable::Array(array), Comparable::Array(values)) => values
            .iter()
            .any(|val| array_contains(array, val)),
        (Comparable::Array(array), single) => array_contains(array, single),
        (single, Comparable::Array(values)) => array_contains(values, single),
        (a, b) => a == b,
    }
}

impl<'a> QueryVisitor for DocumentEvaluator<'a> {
    type Output = bool;
    type Error = PagedocError;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }

        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error> {
        Ok(self.document.get(field).is_some() == should_exist)
    }

    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error> {
        let field_value = match self.document.get(field) {
            Some(field_value) => Comparable::from(field_value),
            None => return Ok(false),
        };
        let value = Comparable::from(value);

        Ok(match op {
            FieldOp::Eq => field_value == value,
            FieldOp::Ne => field_value != value,
            FieldOp::Gt | FieldOp::Gte | FieldOp::Lt | FieldOp::Lte => {
                match field_value.partial_cmp(&value) {
                    Some(ordering) => match op {
                        FieldOp::Gt => ordering == Ordering::Greater,
                        FieldOp::Gte => ordering != Ordering::Less,
                        FieldOp::Lt => ordering == Ordering::Less,
                        FieldOp::Lte => ordering != Ordering::Greater,
                        _ => unreachable!(),
                    },
                    None => false,
                }
            }
            FieldOp::Contains => match (&field_value, &value) {
                (Comparable::Array(array), single) => array_contains(array, single),
                (Comparable::String(left), Comparable::String(right)) => left.contains(right),
                _ => false,
            },
            FieldOp::NotContains => match (&field_value, &value) {
                (Comparable::Array(array), single) => !array_contains(array, single),
                (Comparable::String(left), Comparable::String(right)) => !left.contains(right),
                _ => true,
            },
            FieldOp::StartsWith => match (&field_value, &value) {
                (Comparable::String(left), Comparable::String(right)) => left.starts_with(right),
                _ => false,
            },
            FieldOp::EndsWith => match (&field_value, &value) {
                (Comparable::String(left), Comparable::String(right)) => left.ends_with(right),
                _ => false,
            },
            FieldOp::AnyOf => any_overlap(&field_value, &value),
            FieldOp::NoneOf => !any_overlap(&field_value, &value),
        })
    }
}
