use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::record::RecordId;

/// How the "select all on this page" toggle decides its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectAllMode {
    /// Clear when the number of selected ids equals the number of ids on the
    /// page, whichever ids those are. This is how the admin table behaved.
    #[default]
    ByCount,
    /// Clear only when every id on the page is already selected.
    ByIds,
}

/// Ids marked for bulk action
///
/// Lives independently of filtering and paging: an id stays selected when
/// its row is filtered out or scrolls off the page. Ids leave the set only
/// through `toggle`, `select_all_on_page`, `clear` or `prune`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    ids: BTreeSet<RecordId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `id` if absent, remove it if present. Returns the new state.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if self.ids.remove(&id) {
            debug!(target: "selection", "deselected {}", id);
            false
        } else {
            self.ids.insert(id);
            debug!(target: "selection", "selected {}", id);
            true
        }
    }

    /// Whether the header checkbox for this page reads as checked
    pub fn all_on_page(&self, page_ids: &[RecordId], mode: SelectAllMode) -> bool {
        if page_ids.is_empty() {
            return false;
        }
        match mode {
            SelectAllMode::ByCount => self.ids.len() == page_ids.len(),
            SelectAllMode::ByIds => page_ids.iter().all(|id| self.ids.contains(id)),
        }
    }

    /// Header checkbox toggle
    ///
    /// If the page already reads as fully selected, the whole set is
    /// cleared; otherwise the set becomes exactly `page_ids`, dropping any
    /// selection made on other pages.
    pub fn select_all_on_page(&mut self, page_ids: &[RecordId], mode: SelectAllMode) {
        if self.all_on_page(page_ids, mode) {
            debug!(target: "selection", "select-all toggled off, clearing {}", self.ids.len());
            self.ids.clear();
        } else {
            self.ids = page_ids.iter().copied().collect();
            debug!(target: "selection", "select-all toggled on, {} ids", self.ids.len());
        }
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.ids.contains(&id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Forget ids that were deleted. Returns how many were dropped.
    pub fn prune<'a>(&mut self, removed: impl IntoIterator<Item = &'a RecordId>) -> usize {
        let before = self.ids.len();
        for id in removed {
            self.ids.remove(id);
        }
        before - self.ids.len()
    }

    /// Keep only ids for which `present` holds
    pub fn retain(&mut self, present: impl Fn(RecordId) -> bool) {
        self.ids.retain(|id| present(*id));
    }

    pub fn ids(&self) -> &BTreeSet<RecordId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::RangeInclusive<u64>) -> Vec<RecordId> {
        range.map(RecordId).collect()
    }

    #[test]
    fn test_toggle() {
        let mut sel = SelectionSet::new();
        assert!(sel.toggle(RecordId(4)));
        assert!(sel.is_selected(RecordId(4)));
        assert!(!sel.toggle(RecordId(4)));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_select_all_replaces_then_clears() {
        let mut sel = SelectionSet::new();
        sel.toggle(RecordId(15));

        let page = ids(1..=10);
        sel.select_all_on_page(&page, SelectAllMode::ByCount);
        assert_eq!(sel.len(), 10);
        assert!(!sel.is_selected(RecordId(15)));

        sel.select_all_on_page(&page, SelectAllMode::ByCount);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_by_count_clears_foreign_selection_of_equal_size() {
        // ten ids selected on page 1, toggle pressed while on page 2
        let mut sel = SelectionSet::new();
        sel.select_all_on_page(&ids(1..=10), SelectAllMode::ByCount);
        sel.select_all_on_page(&ids(11..=20), SelectAllMode::ByCount);
        assert!(sel.is_empty());
    }

    #[test]
    fn test_by_ids_selects_new_page() {
        let mut sel = SelectionSet::new();
        sel.select_all_on_page(&ids(1..=10), SelectAllMode::ByIds);
        sel.select_all_on_page(&ids(11..=20), SelectAllMode::ByIds);
        assert_eq!(sel.ids().iter().map(|i| i.0).collect::<Vec<_>>(), (11..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_prune() {
        let mut sel = SelectionSet::new();
        sel.toggle(RecordId(1));
        sel.toggle(RecordId(2));
        assert_eq!(sel.prune(&[RecordId(2), RecordId(9)]), 1);
        assert!(sel.is_selected(RecordId(1)));
        assert!(!sel.is_selected(RecordId(2)));
    }
}
