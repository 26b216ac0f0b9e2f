// Maps keyboard input in browse mode to actions

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::ui::actions::{Action, ActionContext, UiMode};

/// Maps keyboard input to actions based on context
pub struct KeyMapper {
    /// Work in every mode, including prompts
    global_mappings: HashMap<(KeyCode, KeyModifiers), Action>,

    /// Browse-mode table navigation and row actions
    browse_mappings: HashMap<(KeyCode, KeyModifiers), Action>,
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new(true)
    }
}

impl KeyMapper {
    pub fn new(vim_mode: bool) -> Self {
        let mut mapper = Self {
            global_mappings: HashMap::new(),
            browse_mappings: HashMap::new(),
        };

        mapper.init_global_mappings();
        mapper.init_browse_mappings(vim_mode);
        mapper
    }

    fn init_global_mappings(&mut self) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        self.global_mappings
            .insert((F(1), Mod::NONE), Action::ShowHelp);
        self.global_mappings
            .insert((F(5), Mod::NONE), Action::ShowLog);
        self.global_mappings
            .insert((Char('c'), Mod::CONTROL), Action::ForceQuit);
    }

    fn init_browse_mappings(&mut self, vim_mode: bool) {
        use KeyCode::*;
        use KeyModifiers as Mod;

        let mappings = &mut self.browse_mappings;

        mappings.insert((Up, Mod::NONE), Action::CursorUp);
        mappings.insert((Down, Mod::NONE), Action::CursorDown);
        mappings.insert((Left, Mod::NONE), Action::PrevPage);
        mappings.insert((Right, Mod::NONE), Action::NextPage);
        mappings.insert((PageUp, Mod::NONE), Action::PrevPage);
        mappings.insert((PageDown, Mod::NONE), Action::NextPage);
        mappings.insert((Home, Mod::NONE), Action::FirstPage);
        mappings.insert((End, Mod::NONE), Action::LastPage);

        if vim_mode {
            mappings.insert((Char('k'), Mod::NONE), Action::CursorUp);
            mappings.insert((Char('j'), Mod::NONE), Action::CursorDown);
            mappings.insert((Char('h'), Mod::NONE), Action::PrevPage);
            mappings.insert((Char('l'), Mod::NONE), Action::NextPage);
            mappings.insert((Char('g'), Mod::NONE), Action::FirstPage);
            mappings.insert((Char('G'), Mod::NONE), Action::LastPage);
        }

        for digit in 1..=9u8 {
            mappings.insert(
                (Char((b'0' + digit) as char), Mod::NONE),
                Action::GoToPage(digit as usize),
            );
        }

        mappings.insert((Char('/'), Mod::NONE), Action::StartSearch);
        mappings.insert((Char('x'), Mod::NONE), Action::ClearSearch);
        mappings.insert((Char(' '), Mod::NONE), Action::ToggleSelection);
        mappings.insert((Char('a'), Mod::NONE), Action::SelectAllOnPage);
        mappings.insert((Char('e'), Mod::NONE), Action::BeginEdit);
        mappings.insert((Enter, Mod::NONE), Action::BeginEdit);
        mappings.insert((Char('d'), Mod::NONE), Action::DeleteRow);
        mappings.insert((Delete, Mod::NONE), Action::DeleteRow);
        mappings.insert((Char('D'), Mod::NONE), Action::DeleteSelected);
        mappings.insert((Char('q'), Mod::NONE), Action::Quit);
        mappings.insert((Esc, Mod::NONE), Action::Quit);
    }

    /// Map a key event to an action based on current context
    pub fn map_key(&self, key: KeyEvent, context: &ActionContext) -> Option<Action> {
        let key_combo = Self::normalize(key);

        if let Some(action) = self.global_mappings.get(&key_combo) {
            return Some(action.clone());
        }

        if context.mode == UiMode::Browse {
            return self.browse_mappings.get(&key_combo).cloned();
        }

        None
    }

    // Terminals disagree on whether 'D' carries SHIFT; the char already says it
    fn normalize(key: KeyEvent) -> (KeyCode, KeyModifiers) {
        match key.code {
            KeyCode::Char(c) => {
                let mut modifiers = key.modifiers;
                modifiers.remove(KeyModifiers::SHIFT);
                (KeyCode::Char(c), modifiers)
            }
            code => (code, key.modifiers),
        }
    }
}
