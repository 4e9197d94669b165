//! Page arithmetic for the table view.
//!
//! Pages are 1-based, matching the `current_page` cursor persisted with each
//! project. Kanban layouts show every task and do not paginate.

use std::ops::Range;

/// Default number of rows on one table page.
pub const ITEMS_PER_PAGE: usize = 20;

/// The slice of a filtered list that one page covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWindow {
    /// Index range into the filtered list.
    pub range: Range<usize>,
    /// The page actually shown, after clamping.
    pub current_page: usize,
    /// Total number of pages (0 for an empty list).
    pub total_pages: usize,
}

impl PageWindow {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

impl Paginator {
    pub fn new(per_page: usize) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total_pages(&self, total_items: usize) -> usize {
        total_items.div_ceil(self.per_page)
    }

    /// Clamp a requested page into `1..=total_pages` (or 1 when there is nothing to show).
    pub fn clamp_page(&self, page: usize, total_items: usize) -> usize {
        let total_pages = self.total_pages(total_items);
        page.clamp(1, total_pages.max(1))
    }

    pub fn window(&self, page: usize, total_items: usize) -> PageWindow {
        let current_page = self.clamp_page(page, total_items);
        let start = ((current_page - 1) * self.per_page).min(total_items);
        let end = (start + self.per_page).min(total_items);
        PageWindow {
            range: start..end,
            current_page,
            total_pages: self.total_pages(total_items),
        }
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(ITEMS_PER_PAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        let window = Paginator::default().window(1, 0);
        assert_eq!(window.range, 0..0);
        assert_eq!(window.current_page, 1);
        assert_eq!(window.total_pages, 0);
        assert!(!window.has_next());
        assert!(!window.has_previous());
    }

    #[test]
    fn test_single_page_fits_all() {
        let window = Paginator::default().window(1, 5);
        assert_eq!(window.range, 0..5);
        assert_eq!(window.total_pages, 1);
    }

    #[test]
    fn test_middle_page() {
        let window = Paginator::new(5).window(2, 20);
        assert_eq!(window.range, 5..10);
        assert!(window.has_previous());
        assert!(window.has_next());
    }

    #[test]
    fn test_last_partial_page() {
        let window = Paginator::default().window(3, 45);
        assert_eq!(window.range, 40..45);
        assert_eq!(window.total_pages, 3);
        assert!(!window.has_next());
    }

    #[test]
    fn test_out_of_range_page_is_clamped() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.window(9, 25).current_page, 3);
        assert_eq!(paginator.window(0, 25).current_page, 1);
    }

    #[test]
    fn test_zero_page_size_is_treated_as_one() {
        assert_eq!(Paginator::new(0).per_page(), 1);
    }
}
