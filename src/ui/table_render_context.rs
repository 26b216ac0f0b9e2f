// Everything the member table needs to draw one frame
// Built from the TableView so the renderer never touches app state.

use crate::config::config::{DisplayConfig, IconConfig};
use crate::data::record::{RecordId, EDITABLE_FIELDS};
use crate::table_view::TableView;
use crate::ui::actions::UiMode;

/// One visible row, already formatted
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRow {
    pub id: RecordId,
    /// name, email, role in column order
    pub cells: Vec<String>,
    pub selected: bool,
    pub editing: bool,
}

#[derive(Debug, Clone)]
pub struct TableRenderContext {
    // ========== Rows ==========
    pub rows: Vec<RenderRow>,

    /// Row under the cursor, relative to the page
    pub cursor: usize,

    /// Rows matching the search across all pages
    pub filtered_count: usize,

    // ========== Header ==========
    pub column_headers: Vec<String>,
    pub header_checked: bool,

    // ========== Edit ==========
    /// Focused field of the row being edited
    pub edit_field: Option<usize>,

    // ========== Footer ==========
    pub current_page: usize,
    pub page_count: usize,
    pub selection_summary: String,
    pub page_summary: String,

    // ========== Visual ==========
    pub show_row_numbers: bool,
    pub icons: IconConfig,
    pub mode: UiMode,
}

impl TableRenderContext {
    pub fn from_view(
        view: &TableView,
        cursor: usize,
        edit_field: Option<usize>,
        mode: UiMode,
        display: &DisplayConfig,
    ) -> Self {
        let editing = view.editing();
        let rows = view
            .page_rows()
            .into_iter()
            .map(|record| RenderRow {
                id: record.id,
                cells: EDITABLE_FIELDS
                    .iter()
                    .map(|field| record.display_field(field))
                    .collect(),
                selected: view.is_selected(record.id),
                editing: editing == Some(record.id),
            })
            .collect();

        Self {
            rows,
            cursor,
            filtered_count: view.filtered_len(),
            column_headers: vec!["Name".into(), "Email".into(), "Role".into()],
            header_checked: view.header_checked(),
            edit_field,
            current_page: view.current_page(),
            page_count: view.page_count(),
            selection_summary: view.selection_summary(),
            page_summary: view.page_summary(),
            show_row_numbers: display.show_row_numbers,
            icons: display.icons.clone(),
            mode,
        }
    }

    pub fn is_cursor_row(&self, row_idx: usize) -> bool {
        self.mode != UiMode::Search && row_idx == self.cursor
    }

    pub fn checkbox(&self, checked: bool) -> &str {
        if checked {
            &self.icons.checked
        } else {
            &self.icons.unchecked
        }
    }

    /// Label for the actions column of a row
    pub fn actions_label(&self, row: &RenderRow) -> String {
        if row.editing {
            "[Save] [Cancel]".to_string()
        } else {
            format!("[Edit] {}", self.icons.trash)
        }
    }

    /// Pagination strip entries: (label, is_current, enabled)
    pub fn pagination_items(&self) -> Vec<(String, bool, bool)> {
        let at_start = self.current_page <= 1;
        let at_end = self.current_page >= self.page_count;

        let mut items = vec![
            (self.icons.first.clone(), false, !at_start),
            (self.icons.prev.clone(), false, !at_start),
        ];
        items.extend(
            (1..=self.page_count).map(|n| (n.to_string(), n == self.current_page, true)),
        );
        items.push((self.icons.next.clone(), false, !at_end));
        items.push((self.icons.last.clone(), false, !at_end));
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Record;
    use crate::table_view::TableSettings;

    fn view(n: u64) -> TableView {
        TableView::with_records(
            TableSettings::default(),
            (1..=n)
                .map(|i| Record::new(i).with_field("name", format!("User {}", i)))
                .collect(),
        )
    }

    #[test]
    fn test_rows_follow_page() {
        let mut view = view(25);
        view.set_page(3);
        view.toggle(RecordId(22));
        let ctx =
            TableRenderContext::from_view(&view, 0, None, UiMode::Browse, &DisplayConfig::default());
        assert_eq!(ctx.rows.len(), 5);
        assert_eq!(ctx.rows[0].cells[0], "User 21");
        assert!(ctx.rows[1].selected);
        assert_eq!(ctx.page_summary, "Page 3 of 3");
    }

    #[test]
    fn test_pagination_items_disable_edges() {
        let view = view(25);
        let ctx =
            TableRenderContext::from_view(&view, 0, None, UiMode::Browse, &DisplayConfig::default());
        let items = ctx.pagination_items();
        // first, prev, 1, 2, 3, next, last
        assert_eq!(items.len(), 7);
        assert!(!items[0].2 && !items[1].2);
        assert!(items[2].1);
        assert!(items[5].2 && items[6].2);
    }

    #[test]
    fn test_editing_row_shows_save_cancel() {
        let mut view = view(3);
        view.begin_edit(RecordId(2));
        let ctx =
            TableRenderContext::from_view(&view, 1, Some(0), UiMode::Edit, &DisplayConfig::default());
        assert!(ctx.rows[1].editing);
        assert_eq!(ctx.actions_label(&ctx.rows[1]), "[Save] [Cancel]");
        assert!(ctx.actions_label(&ctx.rows[0]).starts_with("[Edit]"));
    }
}
