//! The table's single state container
//!
//! `TableView` owns the record store, the search query, the pager, the
//! selection set and the edit session. Every user action is one method
//! (or one [`TableAction`] through [`TableView::dispatch`]) that runs to
//! completion and leaves the derived filtered view and page window fresh.

use tracing::{debug, info};

use crate::config::config::Config;
use crate::data::pager::{Pager, DEFAULT_PAGE_SIZE};
use crate::data::record::{Record, RecordId};
use crate::data::store::RecordStore;
use crate::data::view_filter;
use crate::state::edit_session::{CancelPolicy, EditSession};
use crate::state::events::{EventHistory, TableEvent};
use crate::state::row_actions::{bulk_delete_prompt, ConfirmPrompt, DeleteOutcome, PendingDelete};
use crate::state::selection::{SelectAllMode, SelectionSet};

/// Behavior switches for the table, usually taken from [`Config`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSettings {
    pub page_size: usize,
    pub cancel_policy: CancelPolicy,
    pub select_all_mode: SelectAllMode,
    pub confirm_bulk_delete: bool,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cancel_policy: CancelPolicy::KeepChanges,
            select_all_mode: SelectAllMode::ByCount,
            confirm_bulk_delete: false,
        }
    }
}

impl TableSettings {
    pub fn from_config(config: &Config) -> Self {
        let behavior = &config.behavior;
        Self {
            page_size: behavior.page_size.max(1),
            cancel_policy: if behavior.revert_on_cancel {
                CancelPolicy::Revert
            } else {
                CancelPolicy::KeepChanges
            },
            select_all_mode: behavior.select_all_mode,
            confirm_bulk_delete: behavior.confirm_bulk_delete,
        }
    }
}

/// Every state transition the table supports
#[derive(Debug, Clone, PartialEq)]
pub enum TableAction {
    Load(Vec<Record>),
    SetQuery(String),
    SetPage(usize),
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    ToggleSelection(RecordId),
    SelectAllOnPage,
    ClearSelection,
    BeginEdit(RecordId),
    FieldChange {
        id: RecordId,
        field: String,
        value: String,
    },
    SaveEdit(RecordId),
    CancelEdit,
    DeleteOne(RecordId),
    DeleteSelected,
}

/// What a dispatched action did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Changed,
    Unchanged,
    Delete(DeleteOutcome),
}

impl From<bool> for ActionOutcome {
    fn from(changed: bool) -> Self {
        if changed {
            ActionOutcome::Changed
        } else {
            ActionOutcome::Unchanged
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableView {
    store: RecordStore,
    query: String,
    /// Store positions of the filtered view, recomputed on every change
    visible: Vec<usize>,
    pager: Pager,
    selection: SelectionSet,
    edit: EditSession,
    settings: TableSettings,
    history: EventHistory,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new(TableSettings::default())
    }
}

impl TableView {
    pub fn new(settings: TableSettings) -> Self {
        Self {
            store: RecordStore::new(),
            query: String::new(),
            visible: Vec::new(),
            pager: Pager::new(settings.page_size),
            selection: SelectionSet::new(),
            edit: EditSession::new(settings.cancel_policy),
            settings,
            history: EventHistory::default(),
        }
    }

    /// Convenience for tests and the classic REPL
    pub fn with_records(settings: TableSettings, records: Vec<Record>) -> Self {
        let mut view = Self::new(settings);
        view.load(records);
        view
    }

    // ---- Data Store ----

    /// Replace the store content. Query, selection and edit session survive;
    /// selected ids and an edit target that vanished are dropped.
    pub fn load(&mut self, records: Vec<Record>) -> usize {
        let count = self.store.load(records);
        let store = &self.store;
        self.selection.retain(|id| store.contains(id));
        self.edit.forget_if(|id| !store.contains(id));
        self.refresh();
        self.history.push(TableEvent::Loaded { count });
        count
    }

    /// Direct field update, bypassing the edit session
    pub fn update(&mut self, id: RecordId, field: &str, value: &str) -> bool {
        let changed = self.store.update(id, field, value);
        if changed {
            self.refresh();
        }
        changed
    }

    // ---- View Filter ----

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.pager.first();
        self.refresh();
        self.history.push(TableEvent::QueryChanged {
            query: self.query.clone(),
            matches: self.visible.len(),
        });
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filtered(&self) -> Vec<&Record> {
        let records = self.store.records();
        self.visible.iter().map(|&idx| &records[idx]).collect()
    }

    pub fn filtered_len(&self) -> usize {
        self.visible.len()
    }

    // ---- Pager ----

    pub fn set_page(&mut self, n: usize) -> usize {
        let from = self.pager.current_page();
        let to = self.pager.set_page(n, self.visible.len());
        self.note_page_change(from);
        to
    }

    pub fn next_page(&mut self) -> bool {
        let from = self.pager.current_page();
        let moved = self.pager.next(self.visible.len());
        self.note_page_change(from);
        moved
    }

    pub fn prev_page(&mut self) -> bool {
        let from = self.pager.current_page();
        let moved = self.pager.prev();
        self.note_page_change(from);
        moved
    }

    pub fn first_page(&mut self) {
        let from = self.pager.current_page();
        self.pager.first();
        self.note_page_change(from);
    }

    pub fn last_page(&mut self) {
        let from = self.pager.current_page();
        self.pager.last(self.visible.len());
        self.note_page_change(from);
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    pub fn page_count(&self) -> usize {
        self.pager.page_count(self.visible.len())
    }

    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    /// Records in the current page window, in view order
    pub fn page_rows(&self) -> Vec<&Record> {
        let records = self.store.records();
        self.visible[self.pager.range(self.visible.len())]
            .iter()
            .map(|&idx| &records[idx])
            .collect()
    }

    pub fn page_ids(&self) -> Vec<RecordId> {
        self.page_rows().iter().map(|r| r.id).collect()
    }

    // ---- Selection Tracker ----

    /// Flip selection of `id`. Ids not in the store are ignored.
    pub fn toggle(&mut self, id: RecordId) -> bool {
        if !self.store.contains(id) {
            debug!(target: "selection", "toggle ignored, no record {}", id);
            return false;
        }
        let selected = self.selection.toggle(id);
        self.history
            .push(TableEvent::SelectionToggled { id, selected });
        true
    }

    pub fn select_all_on_page(&mut self) {
        let page_ids = self.page_ids();
        self.selection
            .select_all_on_page(&page_ids, self.settings.select_all_mode);
        self.history.push(TableEvent::PageSelectionToggled {
            selected: self.selection.len(),
        });
    }

    /// State of the header checkbox
    pub fn header_checked(&self) -> bool {
        self.selection
            .all_on_page(&self.page_ids(), self.settings.select_all_mode)
    }

    pub fn is_selected(&self, id: RecordId) -> bool {
        self.selection.is_selected(id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    // ---- Edit Session ----

    pub fn begin_edit(&mut self, id: RecordId) -> bool {
        let started = self.edit.begin(id, &mut self.store);
        if started {
            // an abandoned edit may have been reverted
            self.refresh();
            self.history.push(TableEvent::EditStarted { id });
        }
        started
    }

    pub fn field_change(&mut self, id: RecordId, field: &str, value: &str) -> bool {
        let changed = self.edit.field_change(id, field, value, &mut self.store);
        if changed {
            self.refresh();
            self.history.push(TableEvent::FieldChanged {
                id,
                field: field.to_string(),
            });
        }
        changed
    }

    pub fn save_edit(&mut self, id: RecordId) -> bool {
        let saved = self.edit.save(id);
        if saved {
            self.history.push(TableEvent::EditSaved { id });
        }
        saved
    }

    pub fn cancel_edit(&mut self) -> bool {
        let Some(id) = self.edit.target() else {
            return false;
        };
        self.edit.cancel(&mut self.store);
        self.refresh();
        self.history.push(TableEvent::EditCancelled { id });
        true
    }

    pub fn editing(&self) -> Option<RecordId> {
        self.edit.target()
    }

    // ---- Row Actions ----

    /// First half of a single-row delete: what to ask the user
    pub fn request_delete(&self, id: RecordId) -> Option<PendingDelete> {
        self.store
            .get(id)
            .map(|record| PendingDelete::new(id, record.name()))
    }

    /// Second half of a single-row delete, once the user has answered
    pub fn resolve_delete(&mut self, pending: &PendingDelete, confirmed: bool) -> DeleteOutcome {
        if !confirmed {
            info!(target: "actions", "delete of {} declined", pending.id);
            self.history
                .push(TableEvent::DeleteDeclined { id: Some(pending.id) });
            return DeleteOutcome::Declined;
        }

        if !self.store.remove(pending.id) {
            return DeleteOutcome::NothingToDelete;
        }
        self.selection.prune([&pending.id]);
        self.after_removal(vec![pending.id]);
        info!(target: "actions", "Deleted row with ID {}", pending.id);
        DeleteOutcome::Deleted(1)
    }

    /// Delete one row after asking `prompt`
    pub fn delete_one(&mut self, id: RecordId, prompt: &mut dyn ConfirmPrompt) -> DeleteOutcome {
        let Some(pending) = self.request_delete(id) else {
            debug!(target: "actions", "delete ignored, no record {}", id);
            return DeleteOutcome::NothingToDelete;
        };
        let confirmed = prompt.confirm(&pending.prompt());
        self.resolve_delete(&pending, confirmed)
    }

    /// Delete every selected row and empty the selection
    ///
    /// Asks `prompt` only when bulk confirmation is switched on.
    pub fn delete_selected(&mut self, prompt: &mut dyn ConfirmPrompt) -> DeleteOutcome {
        if self.selection.is_empty() {
            return DeleteOutcome::NothingToDelete;
        }

        if self.settings.confirm_bulk_delete
            && !prompt.confirm(&bulk_delete_prompt(self.selection.len()))
        {
            self.history.push(TableEvent::DeleteDeclined { id: None });
            return DeleteOutcome::Declined;
        }

        let ids = self.selection.ids().clone();
        let removed = self.store.remove_many(&ids);
        self.selection.clear();
        self.after_removal(ids.into_iter().collect());
        info!(target: "actions", "Bulk deleted {} rows", removed);
        DeleteOutcome::Deleted(removed)
    }

    // ---- Reducer entry point ----

    pub fn dispatch(&mut self, action: TableAction, prompt: &mut dyn ConfirmPrompt) -> ActionOutcome {
        debug!(target: "actions", "dispatch {:?}", action);
        match action {
            TableAction::Load(records) => {
                self.load(records);
                ActionOutcome::Changed
            }
            TableAction::SetQuery(query) => {
                let changed = query != self.query;
                self.set_query(query);
                changed.into()
            }
            TableAction::SetPage(n) => {
                let before = self.current_page();
                (self.set_page(n) != before).into()
            }
            TableAction::NextPage => self.next_page().into(),
            TableAction::PrevPage => self.prev_page().into(),
            TableAction::FirstPage => {
                let before = self.current_page();
                self.first_page();
                (self.current_page() != before).into()
            }
            TableAction::LastPage => {
                let before = self.current_page();
                self.last_page();
                (self.current_page() != before).into()
            }
            TableAction::ToggleSelection(id) => self.toggle(id).into(),
            TableAction::SelectAllOnPage => {
                self.select_all_on_page();
                ActionOutcome::Changed
            }
            TableAction::ClearSelection => {
                let had = !self.selection.is_empty();
                self.clear_selection();
                had.into()
            }
            TableAction::BeginEdit(id) => self.begin_edit(id).into(),
            TableAction::FieldChange { id, field, value } => {
                self.field_change(id, &field, &value).into()
            }
            TableAction::SaveEdit(id) => self.save_edit(id).into(),
            TableAction::CancelEdit => self.cancel_edit().into(),
            TableAction::DeleteOne(id) => ActionOutcome::Delete(self.delete_one(id, prompt)),
            TableAction::DeleteSelected => ActionOutcome::Delete(self.delete_selected(prompt)),
        }
    }

    // ---- Read access ----

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn total_count(&self) -> usize {
        self.store.len()
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    pub fn history(&self) -> &EventHistory {
        &self.history
    }

    /// Footer text, e.g. "Selected 3 of 25"
    pub fn selection_summary(&self) -> String {
        format!("Selected {} of {}", self.selected_count(), self.total_count())
    }

    /// Footer text, e.g. "Page 2 of 3"
    pub fn page_summary(&self) -> String {
        format!("Page {} of {}", self.current_page(), self.page_count())
    }

    // ---- internals ----

    fn after_removal(&mut self, ids: Vec<RecordId>) {
        self.edit.forget_if(|id| ids.contains(&id));
        self.refresh();
        self.history.push(TableEvent::Deleted { ids });
    }

    /// Recompute the filtered view and pull the page back into range
    fn refresh(&mut self) {
        self.visible = view_filter::filter_indices(self.store.records(), &self.query);
        self.pager.clamp(self.visible.len());
    }

    fn note_page_change(&mut self, from: usize) {
        let to = self.pager.current_page();
        if from != to {
            self.history.push(TableEvent::PageChanged { from, to });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::row_actions::AlwaysAnswer;

    fn members(n: u64) -> Vec<Record> {
        (1..=n)
            .map(|i| {
                Record::new(i)
                    .with_field("name", format!("Member {}", i))
                    .with_field("email", format!("member{}@mailinator.com", i))
                    .with_field("role", if i % 5 == 0 { "admin" } else { "member" })
            })
            .collect()
    }

    #[test]
    fn test_delete_clamps_current_page() {
        let mut view = TableView::with_records(TableSettings::default(), members(21));
        view.last_page();
        assert_eq!(view.current_page(), 3);

        let outcome = view.delete_one(RecordId(21), &mut AlwaysAnswer(true));
        assert_eq!(outcome, DeleteOutcome::Deleted(1));
        assert_eq!(view.page_count(), 2);
        assert_eq!(view.current_page(), 2);
    }

    #[test]
    fn test_deleting_edit_target_closes_session() {
        let mut view = TableView::with_records(TableSettings::default(), members(5));
        view.begin_edit(RecordId(3));
        view.delete_one(RecordId(3), &mut AlwaysAnswer(true));
        assert_eq!(view.editing(), None);
    }

    #[test]
    fn test_reload_prunes_vanished_ids() {
        let mut view = TableView::with_records(TableSettings::default(), members(5));
        view.toggle(RecordId(2));
        view.toggle(RecordId(5));
        view.begin_edit(RecordId(5));

        view.load(members(3));
        assert!(view.is_selected(RecordId(2)));
        assert!(!view.is_selected(RecordId(5)));
        assert_eq!(view.editing(), None);
    }

    #[test]
    fn test_dispatch_reports_outcomes() {
        let mut view = TableView::default();
        let mut no = AlwaysAnswer(false);
        assert_eq!(view.dispatch(TableAction::Load(members(12)), &mut no), ActionOutcome::Changed);
        assert_eq!(view.dispatch(TableAction::NextPage, &mut no), ActionOutcome::Changed);
        assert_eq!(view.dispatch(TableAction::NextPage, &mut no), ActionOutcome::Unchanged);
        assert_eq!(
            view.dispatch(TableAction::DeleteOne(RecordId(1)), &mut no),
            ActionOutcome::Delete(DeleteOutcome::Declined)
        );
        assert_eq!(view.total_count(), 12);
    }

    #[test]
    fn test_summaries() {
        let mut view = TableView::with_records(TableSettings::default(), members(25));
        view.toggle(RecordId(1));
        view.set_page(2);
        assert_eq!(view.selection_summary(), "Selected 1 of 25");
        assert_eq!(view.page_summary(), "Page 2 of 3");
    }
}
