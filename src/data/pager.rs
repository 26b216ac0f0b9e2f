use std::ops::Range;

use tracing::debug;

/// Rows per page shown by the admin table
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// `ceil(n / page_size)`, never less than one page
pub fn page_count(n: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    n.div_ceil(page_size).max(1)
}

/// Index range of the 1-based `page` inside a view of `len` rows
///
/// Clamped to the view; a page past the end yields an empty range.
pub fn page_range(len: usize, page: usize, page_size: usize) -> Range<usize> {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size).min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Slice of `view` shown on the 1-based `page`
pub fn page<T>(view: &[T], page: usize, page_size: usize) -> &[T] {
    &view[page_range(view.len(), page, page_size)]
}

/// Current-page bookkeeping for a view whose length changes over time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    current_page: usize,
    page_size: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, view_len: usize) -> usize {
        page_count(view_len, self.page_size)
    }

    pub fn range(&self, view_len: usize) -> Range<usize> {
        page_range(view_len, self.current_page, self.page_size)
    }

    /// Jump to page `n`, clamped into `[1, page_count]`. Returns the page set.
    pub fn set_page(&mut self, n: usize, view_len: usize) -> usize {
        let last = self.page_count(view_len);
        let target = n.clamp(1, last);
        if target != n {
            debug!(target: "pager", "page {} out of range, clamped to {} of {}", n, target, last);
        }
        self.current_page = target;
        target
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self, view_len: usize) {
        self.current_page = self.page_count(view_len);
    }

    pub fn next(&mut self, view_len: usize) -> bool {
        if self.current_page < self.page_count(view_len) {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Pull the current page back in range after the view shrank
    pub fn clamp(&mut self, view_len: usize) -> bool {
        let last = self.page_count(view_len);
        if self.current_page > last {
            debug!(target: "pager", "view shrank, page {} -> {}", self.current_page, last);
            self.current_page = last;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_minimum_one() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(25, 10), 3);
        for n in 0..200 {
            assert_eq!(page_count(n, 10), std::cmp::max(1, (n + 9) / 10));
        }
    }

    #[test]
    fn test_page_slices() {
        let view: Vec<u32> = (1..=25).collect();
        assert_eq!(page(&view, 1, 10), &view[0..10]);
        assert_eq!(page(&view, 2, 10), &(11..=20).collect::<Vec<_>>()[..]);
        assert_eq!(page(&view, 3, 10), &[21, 22, 23, 24, 25]);
        assert!(page(&view, 4, 10).is_empty());
        assert!(page(&view, 0, 10).len() == 10);
    }

    #[test]
    fn test_set_page_clamps() {
        let mut pager = Pager::default();
        assert_eq!(pager.set_page(7, 25), 3);
        assert_eq!(pager.set_page(0, 25), 1);
        assert_eq!(pager.set_page(2, 25), 2);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut pager = Pager::default();
        assert!(!pager.prev());
        assert!(pager.next(25));
        assert!(pager.next(25));
        assert!(!pager.next(25));
        assert_eq!(pager.current_page(), 3);
        pager.first();
        assert_eq!(pager.current_page(), 1);
        pager.last(25);
        assert_eq!(pager.current_page(), 3);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut pager = Pager::default();
        pager.set_page(3, 25);
        assert!(pager.clamp(20));
        assert_eq!(pager.current_page(), 2);
        assert!(!pager.clamp(20));
        assert!(pager.clamp(0));
        assert_eq!(pager.current_page(), 1);
    }
}
