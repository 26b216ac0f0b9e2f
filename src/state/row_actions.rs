use crate::data::record::RecordId;

/// Blocking yes/no question asked before a destructive action
///
/// The TUI answers through its confirm modal, the classic REPL reads a line
/// from stdin, tests script the answer.
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> ConfirmPrompt for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Answers every prompt the same way
#[derive(Debug, Clone, Copy)]
pub struct AlwaysAnswer(pub bool);

impl ConfirmPrompt for AlwaysAnswer {
    fn confirm(&mut self, _message: &str) -> bool {
        self.0
    }
}

/// A single-row delete waiting for the user's answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub id: RecordId,
    pub name: String,
}

impl PendingDelete {
    pub fn new(id: RecordId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete the row with name {}?",
            self.name
        )
    }
}

/// Prompt for a bulk delete when bulk confirmation is switched on
pub fn bulk_delete_prompt(count: usize) -> String {
    format!("Are you sure you want to delete {} selected rows?", count)
}

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Rows were removed from the store
    Deleted(usize),
    /// The user said no; nothing changed
    Declined,
    /// Nothing matched; nothing changed
    NothingToDelete,
}

impl DeleteOutcome {
    pub fn removed(&self) -> usize {
        match self {
            DeleteOutcome::Deleted(n) => *n,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_the_row() {
        let pending = PendingDelete::new(RecordId(4), "Aaron Miles");
        assert_eq!(
            pending.prompt(),
            "Are you sure you want to delete the row with name Aaron Miles?"
        );
    }

    #[test]
    fn test_closure_as_prompt() {
        let mut asked = Vec::new();
        let mut prompt = |msg: &str| {
            asked.push(msg.to_string());
            false
        };
        assert!(!prompt.confirm("delete?"));
        assert_eq!(asked, vec!["delete?".to_string()]);
    }
}
