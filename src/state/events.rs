//! State transitions recorded by the table view

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};

use crate::data::record::RecordId;

/// Something that changed table state
#[derive(Debug, Clone, PartialEq)]
pub enum TableEvent {
    Loaded { count: usize },
    QueryChanged { query: String, matches: usize },
    PageChanged { from: usize, to: usize },
    SelectionToggled { id: RecordId, selected: bool },
    PageSelectionToggled { selected: usize },
    EditStarted { id: RecordId },
    FieldChanged { id: RecordId, field: String },
    EditSaved { id: RecordId },
    EditCancelled { id: RecordId },
    Deleted { ids: Vec<RecordId> },
    DeleteDeclined { id: Option<RecordId> },
}

impl fmt::Display for TableEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableEvent::Loaded { count } => write!(f, "loaded {} records", count),
            TableEvent::QueryChanged { query, matches } => {
                write!(f, "search {:?} -> {} matches", query, matches)
            }
            TableEvent::PageChanged { from, to } => write!(f, "page {} -> {}", from, to),
            TableEvent::SelectionToggled { id, selected } => {
                write!(f, "{} {}", if *selected { "selected" } else { "deselected" }, id)
            }
            TableEvent::PageSelectionToggled { selected } => {
                write!(f, "select-all -> {} selected", selected)
            }
            TableEvent::EditStarted { id } => write!(f, "editing {}", id),
            TableEvent::FieldChanged { id, field } => write!(f, "{}.{} changed", id, field),
            TableEvent::EditSaved { id } => write!(f, "saved {}", id),
            TableEvent::EditCancelled { id } => write!(f, "cancelled edit of {}", id),
            TableEvent::Deleted { ids } => write!(f, "deleted {} rows", ids.len()),
            TableEvent::DeleteDeclined { id: Some(id) } => write!(f, "delete of {} declined", id),
            TableEvent::DeleteDeclined { id: None } => write!(f, "bulk delete declined"),
        }
    }
}

/// Bounded history of events for the debug overlay
#[derive(Debug, Clone)]
pub struct EventHistory {
    entries: VecDeque<(DateTime<Local>, TableEvent)>,
    max_size: usize,
}

impl Default for EventHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

impl EventHistory {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_size),
            max_size: max_size.max(1),
        }
    }

    pub fn push(&mut self, event: TableEvent) {
        // keystroke edits on the same field collapse into one entry
        if let (TableEvent::FieldChanged { .. }, Some((ts, last))) =
            (&event, self.entries.back_mut())
        {
            if *last == event {
                *ts = Local::now();
                return;
            }
        }

        if self.entries.len() >= self.max_size {
            self.entries.pop_front();
        }
        self.entries.push_back((Local::now(), event));
    }

    pub fn last(&self) -> Option<&TableEvent> {
        self.entries.back().map(|(_, e)| e)
    }

    /// Most recent `count` entries, oldest first, formatted for display
    pub fn recent(&self, count: usize) -> Vec<String> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries
            .iter()
            .skip(skip)
            .map(|(ts, event)| format!("[{}] {}", ts.format("%H:%M:%S%.3f"), event))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_bounded() {
        let mut history = EventHistory::new(3);
        for count in 0..5 {
            history.push(TableEvent::Loaded { count });
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.last(), Some(&TableEvent::Loaded { count: 4 }));
    }

    #[test]
    fn test_field_changes_coalesce() {
        let mut history = EventHistory::default();
        for _ in 0..4 {
            history.push(TableEvent::FieldChanged {
                id: RecordId(1),
                field: "name".to_string(),
            });
        }
        assert_eq!(history.len(), 1);
        assert!(history.recent(1)[0].ends_with("1.name changed"));
    }
}
