//! Page metadata and result types for cursor pagination.
//!
//! This module provides the [`Page`] struct describing one page's navigation
//! state and [`Paginated`] pairing that metadata with the page's items.

use serde::{Deserialize, Serialize};

/// Navigation metadata for a single page of results.
///
/// Constructed once per pagination call and returned to the caller; the
/// cursor strings are the only state carried between calls, typically
/// embedded in a URL. Serializes to
/// `{previous?, next?, has_previous, has_next, count?}` with absent cursors
/// and count omitted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    /// Opaque cursor addressing the page before this one, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Opaque cursor addressing the page after this one, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Whether a page exists before this one.
    pub has_previous: bool,
    /// Whether a page exists after this one.
    pub has_next: bool,
    /// Total matching documents, present only when the caller requested a
    /// count. Informational; never used to derive the navigation flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// One page of results together with its navigation metadata.
///
/// # Type Parameters
///
/// * `T` - The type of items contained in this page
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    /// The items on this page, in the caller's requested display order.
    pub items: Vec<T>,
    /// Navigation metadata for this page.
    pub page: Page,
}

impl<T> Paginated<T> {
    /// Pairs a list of items with page metadata.
    pub fn new(items: Vec<T>, page: Page) -> Self {
        Self { items, page }
    }

    /// Maps the items of this page through a fallible conversion, keeping
    /// the page metadata intact.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Paginated<U>, E> {
        Ok(Paginated {
            items: self
                .items
                .into_iter()
                .map(f)
                .collect::<Result<Vec<U>, E>>()?,
            page: self.page,
        })
    }
}

impl<T> Default for Paginated<T> {
    fn default() -> Self {
        Self { items: Vec::new(), page: Page::default() }
    }
}
