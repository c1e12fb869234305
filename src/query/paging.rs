#[cfg(feature = "serde1")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewConfig {
    pub page_size: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// A sequence of matching alignment indices split into fixed-size
/// pages. The current page is kept in range by every mutation, and
/// pages are contiguous slices of the match sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedView {
    matches: Vec<usize>,
    page_size: usize,
    current_page: usize,
}

impl Default for PagedView {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl PagedView {
    pub fn new(matches: Vec<usize>) -> Self {
        Self::with_config(matches, &ViewConfig::default())
    }

    pub fn with_config(matches: Vec<usize>, config: &ViewConfig) -> Self {
        PagedView {
            matches,
            page_size: config.page_size.max(1),
            current_page: 0,
        }
    }

    /// Replace the match sequence, e.g. after filtering again. The
    /// current page is kept if it still exists.
    pub fn set_matches(&mut self, matches: Vec<usize>) {
        self.matches = matches;
        self.reset_page_if_out_of_range();
    }

    /// Page sizes below 1 are raised to 1.
    pub fn set_page_size(&mut self, size: usize) {
        let size = size.max(1);
        if size == self.page_size {
            return;
        }
        self.page_size = size;
        self.reset_page_if_out_of_range();
    }

    /// Out of range pages are clamped to the last page.
    pub fn set_current_page(&mut self, page: usize) {
        self.current_page = page.min(self.page_count().saturating_sub(1));
    }

    pub fn next_page(&mut self) {
        self.set_current_page(self.current_page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.set_current_page(self.current_page.saturating_sub(1));
    }

    pub fn has_next_page(&self) -> bool {
        self.current_page + 1 < self.page_count()
    }

    pub fn has_previous_page(&self) -> bool {
        self.current_page > 0
    }

    fn reset_page_if_out_of_range(&mut self) {
        if self.current_page >= self.page_count() {
            self.current_page = 0;
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        if self.matches.is_empty() {
            0
        } else {
            (self.matches.len() - 1) / self.page_size + 1
        }
    }

    pub fn total_matches(&self) -> usize {
        self.matches.len()
    }

    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    /// The alignment indices on the current page.
    pub fn rows_for_current_page(&self) -> &[usize] {
        let total = self.matches.len();
        let start = (self.current_page * self.page_size).min(total);
        let end = start.saturating_add(self.page_size).min(total);
        &self.matches[start..end]
    }

    /// Map a row of the current page back to its alignment index
    pub fn alignment_index_for_row(&self, row: usize) -> Option<usize> {
        self.rows_for_current_page().get(row).copied()
    }

    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            current_page: self.current_page,
            page_count: self.page_count(),
            page_size: self.page_size,
            total_matches: self.total_matches(),
            rows: self.rows_for_current_page().to_vec(),
        }
    }
}

/// The state of a `PagedView` at one point in time, taken in a
/// single read.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde1", derive(Serialize, Deserialize))]
pub struct PageSnapshot {
    pub current_page: usize,
    pub page_count: usize,
    pub page_size: usize,
    pub total_matches: usize,
    pub rows: Vec<usize>,
}

impl PageSnapshot {
    #[cfg(feature = "serde1")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_counts() {
        let mut view = PagedView::new(Vec::new());
        assert_eq!(0, view.page_count());
        assert_eq!(0, view.current_page());
        assert!(view.rows_for_current_page().is_empty());

        view.set_matches((0..1000).collect());
        assert_eq!(DEFAULT_PAGE_SIZE, view.page_size());
        assert_eq!(2, view.page_count());

        view.set_page_size(300);
        assert_eq!(4, view.page_count());

        view.set_page_size(1000);
        assert_eq!(1, view.page_count());

        view.set_page_size(1);
        assert_eq!(1000, view.page_count());
    }

    #[test]
    fn page_size_zero_is_one() {
        let mut view = PagedView::new(vec![4, 8, 15]);
        view.set_page_size(0);
        assert_eq!(1, view.page_size());
        assert_eq!(3, view.page_count());

        let config = ViewConfig { page_size: 0 };
        let view = PagedView::with_config(vec![1], &config);
        assert_eq!(1, view.page_size());

        let mut view = PagedView::new(vec![1, 2]);
        view.set_page_size(usize::MAX);
        assert_eq!(1, view.page_count());
        assert_eq!(&[1, 2], view.rows_for_current_page());
    }

    #[test]
    fn current_page_is_clamped() {
        let mut view = PagedView::new((0..25).collect());
        view.set_page_size(10);

        view.set_current_page(99);
        assert_eq!(2, view.current_page());
        assert_eq!(&[20, 21, 22, 23, 24], view.rows_for_current_page());
        assert!(!view.has_next_page());

        view.next_page();
        assert_eq!(2, view.current_page());

        view.set_current_page(0);
        view.previous_page();
        assert_eq!(0, view.current_page());
        assert!(!view.has_previous_page());
        assert!(view.has_next_page());

        view.set_matches(Vec::new());
        view.set_current_page(5);
        assert_eq!(0, view.current_page());
    }

    #[test]
    fn shrinking_resets_the_page() {
        let mut view = PagedView::new((0..25).collect());
        view.set_page_size(5);
        view.set_current_page(4);

        // a single page of 25 leaves no page 4
        view.set_page_size(25);
        assert_eq!(0, view.current_page());

        view.set_page_size(5);
        view.set_current_page(1);
        view.set_matches((0..12).collect());
        assert_eq!(1, view.current_page());
        view.set_matches((0..3).collect());
        assert_eq!(0, view.current_page());
    }

    #[test]
    fn pages_cover_all_matches_in_order() {
        let matches: Vec<usize> = (0..97).map(|i| i * 3 + 1).collect();
        for size in 1..=100 {
            let mut view = PagedView::new(matches.clone());
            view.set_page_size(size);

            let mut seen = Vec::new();
            for page in 0..view.page_count() {
                view.set_current_page(page);
                assert_eq!(page, view.current_page());
                let rows = view.rows_for_current_page();
                assert!(!rows.is_empty() && rows.len() <= size);
                seen.extend_from_slice(rows);
            }
            assert_eq!(matches, seen);
        }
    }

    #[test]
    fn rows_map_back_to_alignments() {
        let mut view = PagedView::new(vec![3, 9, 27, 81]);
        view.set_page_size(3);
        view.next_page();
        assert_eq!(Some(81), view.alignment_index_for_row(0));
        assert_eq!(None, view.alignment_index_for_row(1));

        let snap = view.snapshot();
        assert_eq!(
            PageSnapshot {
                current_page: 1,
                page_count: 2,
                page_size: 3,
                total_matches: 4,
                rows: vec![81],
            },
            snap
        );
    }

    #[cfg(feature = "serde1")]
    #[test]
    fn snapshot_json() {
        let mut view = PagedView::new(vec![3, 9, 27, 81]);
        view.set_page_size(3);
        assert_eq!(
            r#"{"current_page":0,"page_count":2,"page_size":3,"total_matches":4,"rows":[3,9,27]}"#,
            view.snapshot().to_json().unwrap()
        );

        let empty = PagedView::default().snapshot().to_json().unwrap();
        let back: PageSnapshot = serde_json::from_str(&empty).unwrap();
        assert_eq!(PagedView::default().snapshot(), back);
    }
}
