// Action system for the browse mode of the admin table
// Keys map to actions; actions are checked against the current context
// before the app applies them to the table view.

/// Which part of the screen owns the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiMode {
    /// Moving around the table
    Browse,
    /// Typing into the search box
    Search,
    /// Typing into the fields of the row being edited
    Edit,
    /// A yes/no delete prompt is open; nothing else may change state
    Confirm,
}

/// Everything a key can ask for in browse mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // Row cursor within the current page
    CursorUp,
    CursorDown,

    // Pagination strip
    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
    GoToPage(usize),

    // Search
    StartSearch,
    ClearSearch,

    // Selection
    ToggleSelection,
    SelectAllOnPage,

    // Row actions
    BeginEdit,
    DeleteRow,
    DeleteSelected,

    // Application
    ShowHelp,
    ShowLog,
    Quit,
    ForceQuit,
}

/// What the action checks need to know about the app
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub mode: UiMode,
    pub page_rows: usize,
    pub selected_count: usize,
    pub has_query: bool,
    pub current_page: usize,
    pub page_count: usize,
}

/// Whether `action` makes sense right now
///
/// Mirrors the disabled states of the web table: no "previous" on the
/// first page, no "next" on the last, no row actions on an empty page.
pub fn can_perform_action(action: &Action, context: &ActionContext) -> bool {
    if context.mode == UiMode::Confirm {
        return matches!(action, Action::ForceQuit);
    }

    match action {
        Action::CursorUp | Action::CursorDown => context.page_rows > 0,
        Action::FirstPage | Action::PrevPage => context.current_page > 1,
        Action::NextPage | Action::LastPage => context.current_page < context.page_count,
        Action::GoToPage(n) => *n >= 1 && *n <= context.page_count && *n != context.current_page,
        Action::ClearSearch => context.has_query,
        Action::ToggleSelection | Action::BeginEdit | Action::DeleteRow => context.page_rows > 0,
        Action::SelectAllOnPage => context.page_rows > 0,
        Action::DeleteSelected => context.selected_count > 0,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ActionContext {
        ActionContext {
            mode: UiMode::Browse,
            page_rows: 10,
            selected_count: 0,
            has_query: false,
            current_page: 1,
            page_count: 3,
        }
    }

    #[test]
    fn test_page_bounds() {
        let ctx = context();
        assert!(!can_perform_action(&Action::PrevPage, &ctx));
        assert!(!can_perform_action(&Action::FirstPage, &ctx));
        assert!(can_perform_action(&Action::NextPage, &ctx));
        assert!(can_perform_action(&Action::GoToPage(3), &ctx));
        assert!(!can_perform_action(&Action::GoToPage(4), &ctx));

        let last = ActionContext {
            current_page: 3,
            ..context()
        };
        assert!(!can_perform_action(&Action::NextPage, &last));
        assert!(!can_perform_action(&Action::LastPage, &last));
    }

    #[test]
    fn test_row_actions_need_rows() {
        let empty = ActionContext {
            page_rows: 0,
            page_count: 1,
            ..context()
        };
        assert!(!can_perform_action(&Action::DeleteRow, &empty));
        assert!(!can_perform_action(&Action::BeginEdit, &empty));
        assert!(!can_perform_action(&Action::DeleteSelected, &empty));
        assert!(can_perform_action(&Action::StartSearch, &empty));
    }

    #[test]
    fn test_confirm_blocks_everything_but_force_quit() {
        let ctx = ActionContext {
            mode: UiMode::Confirm,
            selected_count: 3,
            ..context()
        };
        assert!(!can_perform_action(&Action::DeleteSelected, &ctx));
        assert!(!can_perform_action(&Action::NextPage, &ctx));
        assert!(can_perform_action(&Action::ForceQuit, &ctx));
    }
}
