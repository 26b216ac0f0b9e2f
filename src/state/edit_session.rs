use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::record::{Record, RecordId};
use crate::data::store::RecordStore;

/// What `cancel` does with keystrokes already written to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelPolicy {
    /// Edits land in the store as typed and stay there on cancel
    #[default]
    KeepChanges,
    /// Snapshot on begin, restore the snapshot on cancel
    Revert,
}

/// The at-most-one row in inline-edit mode
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    target: Option<RecordId>,
    snapshot: Option<Record>,
    policy: CancelPolicy,
}

impl EditSession {
    pub fn new(policy: CancelPolicy) -> Self {
        Self {
            target: None,
            snapshot: None,
            policy,
        }
    }

    pub fn policy(&self) -> CancelPolicy {
        self.policy
    }

    pub fn target(&self) -> Option<RecordId> {
        self.target
    }

    pub fn is_editing(&self, id: RecordId) -> bool {
        self.target == Some(id)
    }

    /// Start editing `id`. An edit already open on another row is abandoned
    /// without saving. Ids not in the store are ignored.
    pub fn begin(&mut self, id: RecordId, store: &mut RecordStore) -> bool {
        let Some(record) = store.get(id).cloned() else {
            debug!(target: "edit", "begin ignored, no record {}", id);
            return false;
        };

        if let Some(previous) = self.target.filter(|prev| *prev != id) {
            info!(target: "edit", "abandoning edit of {} to edit {}", previous, id);
            self.discard(store);
        }

        if self.policy == CancelPolicy::Revert && self.target != Some(id) {
            self.snapshot = Some(record);
        }
        self.target = Some(id);
        true
    }

    /// Apply one keystroke's worth of change straight into the store
    pub fn field_change(
        &mut self,
        id: RecordId,
        field: &str,
        value: &str,
        store: &mut RecordStore,
    ) -> bool {
        store.update(id, field, value)
    }

    /// Close the session keeping whatever is in the store
    pub fn save(&mut self, id: RecordId) -> bool {
        if self.target != Some(id) {
            debug!(target: "edit", "save for {} but editing {:?}", id, self.target);
        }
        let was_editing = self.target.take().is_some();
        self.snapshot = None;
        if was_editing {
            info!(target: "edit", "saved record {}", id);
        }
        was_editing
    }

    /// Close the session. Under `Revert` the snapshot is written back.
    pub fn cancel(&mut self, store: &mut RecordStore) -> bool {
        if self.target.is_none() {
            return false;
        }
        self.discard(store);
        true
    }

    /// Drop the session because its record left the store
    pub fn forget_if(&mut self, gone: impl Fn(RecordId) -> bool) -> bool {
        match self.target {
            Some(id) if gone(id) => {
                debug!(target: "edit", "record {} removed while editing", id);
                self.target = None;
                self.snapshot = None;
                true
            }
            _ => false,
        }
    }

    fn discard(&mut self, store: &mut RecordStore) {
        if let Some(snapshot) = self.snapshot.take() {
            debug!(target: "edit", "reverting record {}", snapshot.id);
            store.replace(snapshot);
        }
        self.target = None;
    }
}
