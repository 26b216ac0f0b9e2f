use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Duration;
use tracing::{debug, info};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::config::config::Config;
use crate::data::record::{RecordId, EDITABLE_FIELDS};
use crate::services::data_loader_service::{DataLoadResult, DataLoaderService, DataSource};
use crate::state::row_actions::{bulk_delete_prompt, AlwaysAnswer, DeleteOutcome, PendingDelete};
use crate::table_view::{TableSettings, TableView};
use crate::ui::actions::{can_perform_action, Action, ActionContext, UiMode};
use crate::ui::key_mapper::KeyMapper;
use crate::ui::table_render_context::TableRenderContext;
use crate::ui::table_renderer::{render_footer, render_table};
use crate::utils::logging::get_log_buffer;

/// How long to wait for a key before checking the loader again
const POLL_INTERVAL: Duration = Duration::from_millis(100);

const HELP_TEXT: &[&str] = &[
    "Browse",
    "  ↑/↓ (j/k)        move between rows",
    "  ←/→ (h/l)        previous / next page",
    "  Home/End (g/G)   first / last page",
    "  1-9              jump to page",
    "  /                search name, email or role",
    "  x                clear search",
    "  Space            select row",
    "  a                select / clear all rows on page",
    "  e or Enter       edit row",
    "  d or Del         delete row (asks first)",
    "  D                delete selected rows",
    "  q or Esc         quit",
    "",
    "Edit",
    "  Tab / Shift+Tab  next / previous field",
    "  Enter            save",
    "  Esc              cancel",
    "",
    "F1 help   F5 log   Ctrl+C quit",
];

/// A delete waiting for a yes/no answer
#[derive(Debug, Clone)]
enum PendingConfirm {
    Row(PendingDelete),
    Bulk(usize),
}

impl PendingConfirm {
    fn prompt(&self) -> String {
        match self {
            PendingConfirm::Row(pending) => pending.prompt(),
            PendingConfirm::Bulk(count) => bulk_delete_prompt(*count),
        }
    }
}

pub struct TuiApp {
    view: TableView,
    config: Config,
    key_mapper: KeyMapper,
    mode: UiMode,
    search_input: Input,
    /// One input per editable field, filled when an edit begins
    edit_inputs: Vec<Input>,
    edit_field: usize,
    /// Row under the cursor, relative to the current page
    cursor: usize,
    pending: Option<PendingConfirm>,
    loader: Option<Receiver<Result<DataLoadResult>>>,
    status_message: String,
    show_help: bool,
    show_log: bool,
    should_quit: bool,
}

impl TuiApp {
    pub fn new(config: Config, view: TableView) -> Self {
        let key_mapper = KeyMapper::new(config.keybindings.vim_mode);
        Self {
            view,
            config,
            key_mapper,
            mode: UiMode::Browse,
            search_input: Input::default(),
            edit_inputs: Vec::new(),
            edit_field: 0,
            cursor: 0,
            pending: None,
            loader: None,
            status_message: "Ready - press F1 for help".to_string(),
            show_help: false,
            show_log: false,
            should_quit: false,
        }
    }

    /// Attach the channel the background fetch will answer on
    pub fn with_loader(mut self, loader: Receiver<Result<DataLoadResult>>) -> Self {
        self.loader = Some(loader);
        self.status_message = "Loading members...".to_string();
        self
    }

    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Question currently shown in the confirm dialog
    pub fn pending_prompt(&self) -> Option<String> {
        self.pending.as_ref().map(PendingConfirm::prompt)
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.poll_loader();
            terminal.draw(|f| self.draw(f))?;

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    /// Pick up the fetch result if it has arrived
    pub fn poll_loader(&mut self) {
        let Some(rx) = &self.loader else {
            return;
        };

        match rx.try_recv() {
            Ok(Ok(result)) => {
                let count = self.view.load(result.records);
                self.status_message = format!(
                    "Loaded {} members from {} in {:.1?}",
                    count, result.source, result.load_time
                );
                self.loader = None;
                self.clamp_cursor();
            }
            Ok(Err(e)) => {
                self.status_message = format!("Failed to load members: {:#}", e);
                self.loader = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.status_message = "Loader stopped without a result".to_string();
                self.loader = None;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctx = self.action_context();
        let action = self.key_mapper.map_key(key, &ctx);

        // Overlays swallow everything but the global keys
        if self.show_help || self.show_log {
            match action {
                Some(Action::ShowHelp | Action::ShowLog | Action::ForceQuit) => {}
                _ => {
                    if matches!(key.code, KeyCode::Esc | KeyCode::Char('q')) {
                        self.show_help = false;
                        self.show_log = false;
                    }
                    return;
                }
            }
        }

        if let Some(action) = action {
            if can_perform_action(&action, &ctx) {
                self.perform(action);
            } else {
                debug!(target: "ui", "{:?} not available in {:?}", action, ctx.mode);
            }
            return;
        }

        match self.mode {
            UiMode::Confirm => self.handle_confirm_key(key),
            UiMode::Search => self.handle_search_key(key),
            UiMode::Edit => self.handle_edit_key(key),
            UiMode::Browse => {}
        }
    }

    fn action_context(&self) -> ActionContext {
        ActionContext {
            mode: self.mode,
            page_rows: self.view.page_rows().len(),
            selected_count: self.view.selected_count(),
            has_query: !self.view.query().is_empty(),
            current_page: self.view.current_page(),
            page_count: self.view.page_count(),
        }
    }

    fn current_id(&self) -> Option<RecordId> {
        self.view.page_ids().get(self.cursor).copied()
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::CursorUp => self.cursor = self.cursor.saturating_sub(1),
            Action::CursorDown => self.cursor += 1,
            Action::FirstPage => {
                self.view.first_page();
                self.cursor = 0;
            }
            Action::PrevPage => {
                self.view.prev_page();
                self.cursor = 0;
            }
            Action::NextPage => {
                self.view.next_page();
                self.cursor = 0;
            }
            Action::LastPage => {
                self.view.last_page();
                self.cursor = 0;
            }
            Action::GoToPage(n) => {
                self.view.set_page(n);
                self.cursor = 0;
            }
            Action::StartSearch => self.mode = UiMode::Search,
            Action::ClearSearch => {
                self.search_input.reset();
                self.view.set_query("");
                self.cursor = 0;
            }
            Action::ToggleSelection => {
                if let Some(id) = self.current_id() {
                    self.view.toggle(id);
                }
            }
            Action::SelectAllOnPage => self.view.select_all_on_page(),
            Action::BeginEdit => {
                if let Some(id) = self.current_id() {
                    self.begin_edit(id);
                }
            }
            Action::DeleteRow => {
                if let Some(pending) = self.current_id().and_then(|id| self.view.request_delete(id)) {
                    self.pending = Some(PendingConfirm::Row(pending));
                    self.mode = UiMode::Confirm;
                }
            }
            Action::DeleteSelected => {
                if self.view.settings().confirm_bulk_delete {
                    self.pending = Some(PendingConfirm::Bulk(self.view.selected_count()));
                    self.mode = UiMode::Confirm;
                } else {
                    let outcome = self.view.delete_selected(&mut AlwaysAnswer(true));
                    self.report_delete(outcome);
                }
            }
            Action::ShowHelp => {
                self.show_help = !self.show_help;
                self.show_log = false;
            }
            Action::ShowLog => {
                self.show_log = !self.show_log;
                self.show_help = false;
            }
            Action::Quit | Action::ForceQuit => {
                info!(target: "ui", "Quit requested");
                self.should_quit = true;
            }
        }
        self.clamp_cursor();
    }

    fn begin_edit(&mut self, id: RecordId) {
        if !self.view.begin_edit(id) {
            return;
        }
        self.edit_inputs = match self.view.store().get(id) {
            Some(record) => EDITABLE_FIELDS
                .iter()
                .map(|field| Input::new(record.text(field).to_string()))
                .collect(),
            None => return,
        };
        self.edit_field = 0;
        self.mode = UiMode::Edit;
        self.status_message = format!("Editing row {}", id);
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let confirmed = match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
            _ => return,
        };

        let outcome = match self.pending.take() {
            Some(PendingConfirm::Row(pending)) => self.view.resolve_delete(&pending, confirmed),
            Some(PendingConfirm::Bulk(_)) => {
                self.view.delete_selected(&mut AlwaysAnswer(confirmed))
            }
            None => DeleteOutcome::NothingToDelete,
        };
        self.mode = UiMode::Browse;
        self.report_delete(outcome);
        self.clamp_cursor();
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.mode = UiMode::Browse,
            _ => {
                self.search_input.handle_event(&Event::Key(key));
                if self.search_input.value() != self.view.query() {
                    self.view.set_query(self.search_input.value().to_string());
                    self.cursor = 0;
                }
            }
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(id) = self.view.editing() else {
            self.mode = UiMode::Browse;
            return;
        };

        match key.code {
            KeyCode::Esc => {
                self.view.cancel_edit();
                self.mode = UiMode::Browse;
                self.status_message = format!("Edit of row {} cancelled", id);
            }
            KeyCode::Enter => {
                self.view.save_edit(id);
                self.mode = UiMode::Browse;
                self.status_message = format!("Saved row {}", id);
            }
            KeyCode::Tab => {
                self.edit_field = (self.edit_field + 1) % EDITABLE_FIELDS.len();
            }
            KeyCode::BackTab => {
                self.edit_field = (self.edit_field + EDITABLE_FIELDS.len() - 1) % EDITABLE_FIELDS.len();
            }
            _ => {
                let Some(input) = self.edit_inputs.get_mut(self.edit_field) else {
                    return;
                };
                let before = input.value().to_string();
                input.handle_event(&Event::Key(key));
                if input.value() != before {
                    let value = input.value().to_string();
                    self.view
                        .field_change(id, EDITABLE_FIELDS[self.edit_field], &value);
                }
            }
        }
    }

    fn report_delete(&mut self, outcome: DeleteOutcome) {
        self.status_message = match outcome {
            DeleteOutcome::Deleted(1) => "Deleted 1 member".to_string(),
            DeleteOutcome::Deleted(n) => format!("Deleted {} members", n),
            DeleteOutcome::Declined => "Delete cancelled".to_string(),
            DeleteOutcome::NothingToDelete => "Nothing to delete".to_string(),
        };
    }

    fn clamp_cursor(&mut self) {
        let rows = self.view.page_rows().len();
        self.cursor = self.cursor.min(rows.saturating_sub(1));
    }

    pub fn draw(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(3), // Search
                Constraint::Min(5),    // Table
                Constraint::Length(1), // Footer
                Constraint::Length(1), // Status
            ])
            .split(f.area());

        self.render_title(f, chunks[0]);
        self.render_search(f, chunks[1]);

        let edit_field = (self.mode == UiMode::Edit).then_some(self.edit_field);
        let ctx = TableRenderContext::from_view(
            &self.view,
            self.cursor,
            edit_field,
            self.mode,
            &self.config.display,
        );
        render_table(f, chunks[2], &ctx);
        render_footer(f, chunks[3], &ctx);
        self.render_status(f, chunks[4]);

        if let Some(pending) = &self.pending {
            render_confirm(f, &pending.prompt());
        }
        if self.show_help {
            render_help(f);
        }
        if self.show_log {
            self.render_log(f);
        }
    }

    fn render_title(&self, f: &mut Frame, area: Rect) {
        let mode = match self.mode {
            UiMode::Browse => "BROWSE",
            UiMode::Search => "SEARCH",
            UiMode::Edit => "EDIT",
            UiMode::Confirm => "CONFIRM",
        };
        let title = Line::from(vec![
            Span::styled(
                "Member Admin",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format!("[{}]", mode), Style::default().fg(Color::Yellow)),
        ]);
        f.render_widget(Paragraph::new(title), area);
    }

    fn render_search(&self, f: &mut Frame, area: Rect) {
        let active = self.mode == UiMode::Search;
        let style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let search = Paragraph::new(self.search_input.value())
            .style(style)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Search by name, email or role (/)"),
            );
        f.render_widget(search, area);

        if active {
            let x = area.x + 1 + self.search_input.visual_cursor() as u16;
            f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }
    }

    fn render_status(&self, f: &mut Frame, area: Rect) {
        let hints = match self.mode {
            UiMode::Browse => "Space select | e edit | d delete | / search | F1 help",
            UiMode::Search => "Type to filter | Enter/Esc done",
            UiMode::Edit => "Tab next field | Enter save | Esc cancel",
            UiMode::Confirm => "y confirm | n cancel",
        };
        let line = Line::from(vec![
            Span::raw(self.status_message.clone()),
            Span::styled(format!("  ({})", hints), Style::default().fg(Color::DarkGray)),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }

    fn render_log(&self, f: &mut Frame) {
        let area = centered_rect(80, 70, f.area());
        let height = area.height.saturating_sub(2) as usize;

        let mut lines: Vec<Line> = self
            .view
            .history()
            .recent(5)
            .into_iter()
            .map(|entry| Line::styled(entry, Style::default().fg(Color::Green)))
            .collect();
        if let Some(buffer) = get_log_buffer() {
            let room = height.saturating_sub(lines.len());
            lines.extend(
                buffer
                    .get_recent(room)
                    .iter()
                    .map(|entry| Line::raw(entry.format_for_display())),
            );
        }

        let log = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Log (Esc to close)"))
            .wrap(Wrap { trim: false });
        f.render_widget(Clear, area);
        f.render_widget(log, area);
    }
}

fn render_confirm(f: &mut Frame, prompt: &str) {
    let area = centered_rect(50, 20, f.area());
    let text = vec![
        Line::raw(prompt.to_string()),
        Line::raw(""),
        Line::styled("[y] Yes    [n] No", Style::default().fg(Color::Yellow)),
    ];
    let dialog = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Confirm"))
        .wrap(Wrap { trim: true });
    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    let lines: Vec<Line> = HELP_TEXT.iter().map(|line| Line::raw(*line)).collect();
    let help = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Help (Esc to close)"));
    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Fetch in the background and run the interactive table until quit
pub fn run_tui_app(config: Config, source: DataSource) -> Result<()> {
    let settings = TableSettings::from_config(&config);
    let loader = DataLoaderService::from_config(&config).spawn_load(source);
    let mut app = TuiApp::new(config, TableView::new(settings)).with_loader(loader);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::record::Record;
    use crossterm::event::KeyModifiers;

    fn app(n: u64) -> TuiApp {
        let records = (1..=n)
            .map(|i| {
                Record::new(i)
                    .with_field("name", format!("User {}", i))
                    .with_field("email", format!("user{}@example.com", i))
                    .with_field("role", if i % 5 == 0 { "admin" } else { "member" })
            })
            .collect();
        TuiApp::new(
            Config::default(),
            TableView::with_records(TableSettings::default(), records),
        )
    }

    fn press(app: &mut TuiApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut TuiApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_delete_asks_and_decline_keeps_row() {
        let mut app = app(3);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode(), UiMode::Confirm);
        assert_eq!(
            app.pending_prompt().as_deref(),
            Some("Are you sure you want to delete the row with name User 1?")
        );

        // navigation is blocked while the prompt is open
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.cursor(), 0);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.mode(), UiMode::Browse);
        assert_eq!(app.view().total_count(), 3);
    }

    #[test]
    fn test_delete_confirmed() {
        let mut app = app(3);
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.view().total_count(), 2);
        assert!(app.view().store().get(RecordId(2)).is_none());
        assert_eq!(app.status_message(), "Deleted 1 member");
    }

    #[test]
    fn test_search_filters_and_resets_page() {
        let mut app = app(25);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.view().current_page(), 2);

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "admin");
        assert_eq!(app.view().query(), "admin");
        assert_eq!(app.view().filtered_len(), 5);
        assert_eq!(app.view().current_page(), 1);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode(), UiMode::Browse);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.view().filtered_len(), 25);
    }

    #[test]
    fn test_edit_typing_updates_store() {
        let mut app = app(3);
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.mode(), UiMode::Edit);

        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "X");
        assert_eq!(app.view().store().get(RecordId(1)).unwrap().name(), "User X");

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "!");
        assert_eq!(app.view().store().get(RecordId(1)).unwrap().role(), "member!");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode(), UiMode::Browse);
        assert_eq!(app.view().editing(), None);
    }

    #[test]
    fn test_select_all_then_bulk_delete() {
        let mut app = app(12);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.view().selected_count(), 10);
        press(&mut app, KeyCode::Char('D'));
        assert_eq!(app.view().total_count(), 2);
        assert_eq!(app.view().selected_count(), 0);
        assert_eq!(app.view().page_count(), 1);
    }

    #[test]
    fn test_help_overlay_closes_without_quitting() {
        let mut app = app(3);
        press(&mut app, KeyCode::F(1));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode(), UiMode::Browse);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn test_quit() {
        let mut app = app(1);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }
}
