//! Page bucketing for reaction menus.
//!
//! A [`PageSet`] splits an ordered slice of content into fixed-size, non-overlapping
//! pages. It borrows the content, so building one per session is cheap.

use crate::errors::{Error, Result};

/// Number of items shown on one page when the caller does not say otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Ordered, 0-indexed pages over a borrowed slice of items.
#[derive(Debug, Clone)]
pub struct PageSet<'a, T> {
    pages: Vec<&'a [T]>,
}

impl<'a, T> PageSet<'a, T> {
    /// Splits `items` into pages of `page_size` items each.
    ///
    /// When `items.len() <= page_size` there is exactly one page holding everything
    /// (an empty slice still yields one empty page). Otherwise the last page may be short.
    pub fn new(items: &'a [T], page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::MenuConfiguration {
                reason: "page size must be at least 1".to_string(),
            });
        }

        let pages = if items.len() <= page_size {
            vec![items]
        } else {
            items.chunks(page_size).collect()
        };

        Ok(Self { pages })
    }

    /// Number of pages, always at least 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// A page set is never empty; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Returns page `index`, or `None` when it is out of range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a [T]> {
        self.pages.get(index).copied()
    }

    /// Resolves `index` to a page that exists, clamping to the last page.
    ///
    /// Returns the effective index together with the page content.
    #[must_use]
    pub fn clamped(&self, index: usize) -> (usize, &'a [T]) {
        let last = self.pages.len().saturating_sub(1);
        let effective = index.min(last);
        (effective, self.pages[effective])
    }

    /// Iterates pages in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a [T]> + '_ {
        self.pages.iter().copied()
    }
}

/// Index of the page after `current`, wrapping from the last page back to 0.
#[must_use]
pub const fn next_index(current: usize, page_count: usize) -> usize {
    let next = current.saturating_add(1);
    if next >= page_count { 0 } else { next }
}

/// Index of the page before `current`, wrapping from 0 to the last page.
#[must_use]
pub const fn prev_index(current: usize, page_count: usize) -> usize {
    if current == 0 || current >= page_count {
        page_count.saturating_sub(1)
    } else {
        current - 1
    }
}
