//! Line-oriented admin console
//!
//! The same table operations as the TUI, driven by typed commands and
//! printed with comfy-table after each change.

use anyhow::{anyhow, bail, Result};
use crossterm::style::Stylize;
use reedline::{
    default_emacs_keybindings, ColumnarMenu, Completer, Emacs, FileBackedHistory, KeyCode,
    KeyModifiers, MenuBuilder, Prompt, PromptEditMode, PromptHistorySearch,
    PromptHistorySearchStatus, Reedline, ReedlineEvent, ReedlineMenu, Signal, Span, Suggestion,
};
use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::config::{Config, IconConfig};
use crate::data::record::{RecordId, EDITABLE_FIELDS};
use crate::services::data_loader_service::{DataLoaderService, DataSource};
use crate::state::row_actions::{ConfirmPrompt, DeleteOutcome};
use crate::table_display::{display_page, export_to_csv};
use crate::table_view::{TableSettings, TableView};
use crate::utils::app_paths::AppPaths;
use crate::utils::logging::get_log_buffer;

const COMMANDS: &[(&str, &str)] = &[
    ("show", "print the current page"),
    ("search", "search <text> - filter by name, email or role"),
    ("clear", "clear the search"),
    ("page", "page <n> - go to page n"),
    ("next", "next page"),
    ("prev", "previous page"),
    ("first", "first page"),
    ("last", "last page"),
    ("select", "select <id> - toggle a row"),
    ("select-all", "select or clear every row on the page"),
    ("edit", "edit <id> - start editing a row"),
    ("set", "set <name|email|role> <value> - change the row being edited"),
    ("save", "finish the edit"),
    ("cancel", "abandon the edit"),
    ("delete", "delete <id> - delete a row (asks first)"),
    ("delete-selected", "delete every selected row"),
    ("export", "export <file.csv> - write the filtered rows"),
    ("log", "show recent log lines"),
    ("help", "show this help"),
    ("quit", "exit"),
];

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Show,
    Search(String),
    Clear,
    Page(usize),
    Next,
    Prev,
    First,
    Last,
    Select(RecordId),
    SelectAll,
    Edit(RecordId),
    Set { field: String, value: String },
    Save,
    Cancel,
    Delete(RecordId),
    DeleteSelected,
    Export(PathBuf),
    Log,
    Help,
    Quit,
}

impl ReplCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "show" | "ls" => ReplCommand::Show,
            "search" | "/" => ReplCommand::Search(rest.to_string()),
            "clear" => ReplCommand::Clear,
            "page" => ReplCommand::Page(
                rest.parse()
                    .map_err(|_| anyhow!("usage: page <n>"))?,
            ),
            "next" | "n" => ReplCommand::Next,
            "prev" | "p" => ReplCommand::Prev,
            "first" => ReplCommand::First,
            "last" => ReplCommand::Last,
            "select" => ReplCommand::Select(parse_id(rest, "select <id>")?),
            "select-all" => ReplCommand::SelectAll,
            "edit" => ReplCommand::Edit(parse_id(rest, "edit <id>")?),
            "set" => {
                let (field, value) = rest
                    .split_once(char::is_whitespace)
                    .map(|(f, v)| (f, v.trim()))
                    .unwrap_or((rest, ""));
                if !EDITABLE_FIELDS.contains(&field) {
                    bail!("usage: set <name|email|role> <value>");
                }
                ReplCommand::Set {
                    field: field.to_string(),
                    value: value.to_string(),
                }
            }
            "save" => ReplCommand::Save,
            "cancel" => ReplCommand::Cancel,
            "delete" | "rm" => ReplCommand::Delete(parse_id(rest, "delete <id>")?),
            "delete-selected" => ReplCommand::DeleteSelected,
            "export" => {
                if rest.is_empty() {
                    bail!("usage: export <file.csv>");
                }
                ReplCommand::Export(PathBuf::from(rest))
            }
            "log" => ReplCommand::Log,
            "help" | "?" => ReplCommand::Help,
            "quit" | "exit" | "q" => ReplCommand::Quit,
            other => bail!("unknown command '{}', try 'help'", other),
        };
        Ok(command)
    }

    /// Whether the page should be reprinted afterwards
    pub fn changes_view(&self) -> bool {
        !matches!(
            self,
            ReplCommand::Export(_) | ReplCommand::Log | ReplCommand::Help | ReplCommand::Quit
        )
    }
}

fn parse_id(arg: &str, usage: &str) -> Result<RecordId> {
    arg.parse::<u64>()
        .map(RecordId)
        .map_err(|_| anyhow!("usage: {}", usage))
}

/// Apply one command to the table; returns a message for the user, if any
pub fn execute(
    view: &mut TableView,
    command: &ReplCommand,
    prompt: &mut dyn ConfirmPrompt,
) -> Result<Option<String>> {
    let message = match command {
        ReplCommand::Show | ReplCommand::Help | ReplCommand::Log | ReplCommand::Quit => None,
        ReplCommand::Search(text) => {
            view.set_query(text.clone());
            Some(format!("{} matching", view.filtered_len()))
        }
        ReplCommand::Clear => {
            view.set_query("");
            None
        }
        ReplCommand::Page(n) => {
            let page = view.set_page(*n);
            (page != *n).then(|| format!("showing page {}", page))
        }
        ReplCommand::Next => (!view.next_page()).then(|| "already on the last page".to_string()),
        ReplCommand::Prev => (!view.prev_page()).then(|| "already on the first page".to_string()),
        ReplCommand::First => {
            view.first_page();
            None
        }
        ReplCommand::Last => {
            view.last_page();
            None
        }
        ReplCommand::Select(id) => {
            if !view.toggle(*id) {
                bail!("no member with id {}", id);
            }
            None
        }
        ReplCommand::SelectAll => {
            view.select_all_on_page();
            None
        }
        ReplCommand::Edit(id) => {
            if !view.begin_edit(*id) {
                bail!("no member with id {}", id);
            }
            Some(format!("editing {}; use set/save/cancel", id))
        }
        ReplCommand::Set { field, value } => {
            let Some(id) = view.editing() else {
                bail!("nothing is being edited, use 'edit <id>' first");
            };
            view.field_change(id, field, value);
            None
        }
        ReplCommand::Save => {
            let Some(id) = view.editing() else {
                bail!("nothing is being edited");
            };
            view.save_edit(id);
            Some(format!("saved {}", id))
        }
        ReplCommand::Cancel => {
            if !view.cancel_edit() {
                bail!("nothing is being edited");
            }
            None
        }
        ReplCommand::Delete(id) => Some(describe_delete(view.delete_one(*id, prompt))),
        ReplCommand::DeleteSelected => Some(describe_delete(view.delete_selected(prompt))),
        ReplCommand::Export(path) => {
            let rows = view.filtered();
            let count = export_to_csv(&rows, path)?;
            Some(format!("exported {} rows to {}", count, path.display()))
        }
    };
    Ok(message)
}

fn describe_delete(outcome: DeleteOutcome) -> String {
    match outcome {
        DeleteOutcome::Deleted(n) => format!("deleted {}", n),
        DeleteOutcome::Declined => "delete cancelled".to_string(),
        DeleteOutcome::NothingToDelete => "nothing to delete".to_string(),
    }
}

/// Asks yes/no questions on the terminal
pub struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

struct CommandCompleter;

impl Completer for CommandCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let prefix = &line[..pos.min(line.len())];
        if prefix.contains(char::is_whitespace) {
            return Vec::new();
        }
        COMMANDS
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, description)| Suggestion {
                value: name.to_string(),
                description: Some(description.to_string()),
                extra: None,
                span: Span { start: 0, end: pos },
                style: None,
                append_whitespace: true,
            })
            .collect()
    }
}

struct AdminPrompt;

impl Prompt for AdminPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        Cow::Borrowed("members> ")
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, edit_mode: PromptEditMode) -> Cow<'_, str> {
        match edit_mode {
            PromptEditMode::Custom(str) => format!("{str}> ").into(),
            _ => "".into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!(
            "({}reverse search: {})",
            prefix, history_search.term
        ))
    }
}

fn print_help() {
    println!("{}", "Commands:".yellow());
    for (name, description) in COMMANDS {
        println!("  {:<16} {}", name.green(), description);
    }
    println!();
}

fn print_log() {
    let Some(buffer) = get_log_buffer() else {
        return;
    };
    for entry in buffer.get_recent(20) {
        println!("{}", entry.format_for_display().dark_grey());
    }
}

fn build_line_editor() -> Reedline {
    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("command_completion")
            .with_columns(1)
            .with_column_width(None)
            .with_column_padding(2),
    );

    let mut keybindings = default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::Menu("command_completion".to_string()),
    );

    let line_editor = Reedline::create()
        .with_completer(Box::new(CommandCompleter))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_edit_mode(Box::new(Emacs::new(keybindings)));

    let history = AppPaths::history_file().and_then(|path| FileBackedHistory::with_file(100, path).map_err(|e| anyhow!("{}", e)));
    match history {
        Ok(history) => line_editor.with_history(Box::new(history)),
        Err(e) => {
            error!(target: "ui", "History disabled: {}", e);
            line_editor
        }
    }
}

/// Load the members once, then read commands until quit or Ctrl+D
pub fn run_classic(config: Config, source: DataSource) -> Result<()> {
    let icons: IconConfig = config.display.icons.clone();
    let mut view = TableView::new(TableSettings::from_config(&config));

    println!("{}", format!("Loading members from {}", source).cyan());
    match DataLoaderService::from_config(&config).load(&source) {
        Ok(result) => {
            view.load(result.records);
        }
        Err(e) => {
            error!(target: "fetch", "Error fetching data from {}: {:#}", source, e);
            eprintln!("{}", format!("Error: {:#}", e).red());
        }
    }

    print_help();
    display_page(&view, &icons);

    let mut line_editor = build_line_editor();
    let prompt = AdminPrompt;
    let mut confirm = StdinConfirm;

    loop {
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(buffer) => {
                if buffer.trim().is_empty() {
                    continue;
                }

                let command = match ReplCommand::parse(&buffer) {
                    Ok(command) => command,
                    Err(e) => {
                        eprintln!("{}", e.to_string().red());
                        continue;
                    }
                };

                match command {
                    ReplCommand::Quit => break,
                    ReplCommand::Help => print_help(),
                    ReplCommand::Log => print_log(),
                    _ => {}
                }

                match execute(&mut view, &command, &mut confirm) {
                    Ok(message) => {
                        if let Some(message) = message {
                            println!("{}", message.green());
                        }
                        if command.changes_view() {
                            display_page(&view, &icons);
                        }
                    }
                    Err(e) => eprintln!("{}", format!("Error: {:#}", e).red()),
                }
            }
            Signal::CtrlD | Signal::CtrlC => break,
        }
    }

    info!(target: "ui", "Classic session ended");
    println!("\nGoodbye!");
    Ok(())
}
