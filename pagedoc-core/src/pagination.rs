//! Keyset pagination parameters and query construction.
//!
//! This module turns a [`PaginationParams`] plus an optional decoded cursor
//! into the augmented filter and multi-key sort that drive one pagination
//! step. The sort is keyed on the paginated field with the identifier as a
//! mandatory tie-break whenever the two differ, which is what keeps the
//! ordering stable under duplicate values and makes forward/backward
//! navigation symmetric.

use crate::{
    cursor::{Cursor, ID_FIELD},
    error::{CursorSide, PagedocError, PagedocResult},
    query::{Collation, Expr, FieldOp, Filter, Sort, SortDirection},
};

/// Canonical join specification for populate (lookup) aggregation.
///
/// Joins `local_field` of the paginated collection against `foreign_field`
/// of `collection`, replacing the local value with the joined document. When
/// the local field holds an array the join is a membership test and the
/// result stays an array; otherwise the single joined document is unwrapped
/// in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulateSpec {
    /// Source collection to join against.
    pub collection: String,
    /// Field on the paginated documents holding the reference value(s).
    pub local_field: String,
    /// Field on the source collection matched against the local value.
    pub foreign_field: String,
    /// Optional allowlist of fields to keep on the joined documents.
    pub projection: Option<Vec<String>>,
}

impl PopulateSpec {
    /// Creates a populate spec joining on the source collection's
    /// identifier field.
    pub fn new(collection: impl Into<String>, local_field: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            local_field: local_field.into(),
            foreign_field: ID_FIELD.to_string(),
            projection: None,
        }
    }

    /// Overrides the foreign field matched by the join.
    pub fn with_foreign_field(mut self, foreign_field: impl Into<String>) -> Self {
        self.foreign_field = foreign_field.into();
        self
    }

    /// Restricts joined documents to the given fields.
    pub fn with_projection(mut self, projection: Vec<String>) -> Self {
        self.projection = Some(projection);
        self
    }
}

/// Parameters for one keyset pagination step.
///
/// At most one of `next`/`previous` should be set for a single navigation
/// step; both absent means the first page. Constructed via
/// [`PaginationParams::builder`].
#[derive(Debug, Clone, Default)]
pub struct PaginationParams {
    /// Base filter applied before the keyset predicate.
    pub filter: Option<Expr>,
    /// Page size; must be at least 1.
    pub limit: i64,
    /// Field the result set is keyed on; defaults to the identifier field.
    pub paginated_field: Option<String>,
    /// Display order of the paginated field.
    pub sort_ascending: bool,
    /// Optional collation for string-keyed pagination. Ignored when
    /// paginating on the identifier field.
    pub collation: Option<Collation>,
    /// Opaque cursor for forward navigation.
    pub next: Option<String>,
    /// Opaque cursor for backward navigation.
    pub previous: Option<String>,
    /// Whether to run the extra count round trip.
    pub count_total: bool,
    /// Optional index hint passed through to the store.
    pub hint: Option<String>,
    /// Optional projection restricting returned fields.
    pub projection: Option<Vec<String>>,
    /// Join specifications applied to the fetched page.
    pub populate: Vec<PopulateSpec>,
}

impl PaginationParams {
    /// Creates a builder for a page of at most `limit` items.
    pub fn builder(limit: i64) -> PaginationParamsBuilder {
        PaginationParamsBuilder::new(limit)
    }
}

/// Builder for [`PaginationParams`].
#[derive(Debug, Clone)]
pub struct PaginationParamsBuilder {
    params: PaginationParams,
}

impl PaginationParamsBuilder {
    /// Creates a builder for a page of at most `limit` items.
    pub fn new(limit: i64) -> Self {
        Self {
            params: PaginationParams { limit, ..PaginationParams::default() },
        }
    }

    /// Sets the base filter.
    pub fn filter(mut self, filter: Expr) -> Self {
        self.params.filter = Some(filter);
        self
    }

    /// Sets the field the result set is keyed on.
    pub fn paginated_field(mut self, field: impl Into<String>) -> Self {
        self.params.paginated_field = Some(field.into());
        self
    }

    /// Sets the display order.
    pub fn sort_ascending(mut self, ascending: bool) -> Self {
        self.params.sort_ascending = ascending;
        self
    }

    /// Sets the collation used for string comparison.
    pub fn collation(mut self, collation: Collation) -> Self {
        self.params.collation = Some(collation);
        self
    }

    /// Navigates forward from the given cursor.
    pub fn next(mut self, cursor: impl Into<String>) -> Self {
        self.params.next = Some(cursor.into());
        self
    }

    /// Navigates backward from the given cursor.
    pub fn previous(mut self, cursor: impl Into<String>) -> Self {
        self.params.previous = Some(cursor.into());
        self
    }

    /// Requests the total match count alongside the page.
    pub fn count_total(mut self, count_total: bool) -> Self {
        self.params.count_total = count_total;
        self
    }

    /// Passes an index hint through to the store.
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.params.hint = Some(hint.into());
        self
    }

    /// Restricts returned fields to the given projection.
    pub fn projection(mut self, fields: Vec<String>) -> Self {
        self.params.projection = Some(fields);
        self
    }

    /// Adds a populate join to the fetch.
    pub fn populate(mut self, spec: PopulateSpec) -> Self {
        self.params.populate.push(spec);
        self
    }

    /// Builds the final parameters.
    pub fn build(self) -> PaginationParams {
        self.params
    }
}

/// Augmented filter and sort for one pagination step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PageQuery {
    pub filter: Option<Expr>,
    pub sort: Vec<Sort>,
}

/// Resolves the effective paginated field and whether an identifier
/// tie-break is required.
pub(crate) fn effective_paginated_field(params: &PaginationParams) -> (String, bool) {
    let field = params
        .paginated_field
        .clone()
        .unwrap_or_else(|| ID_FIELD.to_string());
    let needs_tie_break = field != ID_FIELD;

    (field, needs_tie_break)
}

/// The collation actually applied to the fetch.
///
/// Identifier ordering is not collation-sensitive, so any override is
/// discarded when paginating on the identifier field.
pub(crate) fn effective_collation(params: &PaginationParams) -> Option<Collation> {
    let (_, needs_tie_break) = effective_paginated_field(params);

    if needs_tie_break { params.collation.clone() } else { None }
}

/// Builds the augmented filter and sort specification for one step.
///
/// Implements the scan-direction rule: the underlying query scans ascending
/// iff the display order is ascending and we page forward, or the display
/// order is descending and we page backward. Backward pages are therefore
/// fetched in reverse and restored to display order by the assembler.
pub(crate) fn build_page_query(params: &PaginationParams) -> PagedocResult<PageQuery> {
    let (paginated_field, needs_tie_break) = effective_paginated_field(params);

    if params.limit < 1 {
        return Err(PagedocError::InvalidLimit);
    }

    let next_cursor = params
        .next
        .as_deref()
        .map(|raw| decode_side(raw, CursorSide::Next, needs_tie_break))
        .transpose()?;
    let previous_cursor = params
        .previous
        .as_deref()
        .map(|raw| decode_side(raw, CursorSide::Previous, needs_tie_break))
        .transpose()?;

    let paging_backward = params.previous.is_some();
    let scan_ascending = params.sort_ascending != paging_backward;
    let (op, dir) = if scan_ascending {
        (FieldOp::Gt, SortDirection::Asc)
    } else {
        (FieldOp::Lt, SortDirection::Desc)
    };

    let boundary = next_cursor.or(previous_cursor);
    let filter = match boundary {
        Some(cursor) => {
            let keyset = keyset_predicate(&paginated_field, op, &cursor, needs_tie_break);
            Some(match params.filter.clone() {
                Some(base) => base.and(keyset),
                None => keyset,
            })
        }
        None => params.filter.clone(),
    };

    let sort = if needs_tie_break {
        vec![Sort::new(&paginated_field, dir), Sort::new(ID_FIELD, dir)]
    } else {
        vec![Sort::new(ID_FIELD, dir)]
    };

    Ok(PageQuery { filter, sort })
}

fn decode_side(raw: &str, side: CursorSide, needs_tie_break: bool) -> PagedocResult<Cursor> {
    let cursor = Cursor::decode(raw).map_err(|e| PagedocError::MalformedCursor {
        side,
        reason: e.to_string(),
    })?;

    let expected = if needs_tie_break { 2 } else { 1 };
    if cursor.len() != expected {
        return Err(PagedocError::CursorComponentMismatch {
            side,
            expected,
            found: cursor.len(),
        });
    }

    Ok(cursor)
}

/// The keyset boundary predicate.
///
/// With a tie-break: `(field OP v) OR (field EQ v AND _id OP id)`.
/// Without: `field OP v`.
fn keyset_predicate(paginated_field: &str, op: FieldOp, cursor: &Cursor, needs_tie_break: bool) -> Expr {
    let values = cursor.values();

    if needs_tie_break {
        Filter::or(vec![
            Expr::field(paginated_field.to_string(), op.clone(), values[0].clone()),
            Filter::and(vec![
                Expr::field(paginated_field.to_string(), FieldOp::Eq, values[0].clone()),
                Expr::field(ID_FIELD.to_string(), op, values[1].clone()),
            ]),
        ])
    } else {
        Expr::field(paginated_field.to_string(), op, values[0].clone())
    }
}
