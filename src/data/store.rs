use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::data::record::{Record, RecordId};

/// The authoritative, ordered collection of member records
///
/// Order is the order the source delivered. Ids are unique at all times;
/// `load` drops later duplicates and `update` refuses to touch `id`.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire content. Returns the number of records kept.
    pub fn load(&mut self, records: Vec<Record>) -> usize {
        let incoming = records.len();
        let mut seen = HashSet::with_capacity(incoming);
        let mut kept = Vec::with_capacity(incoming);

        for record in records {
            if seen.insert(record.id) {
                kept.push(record);
            } else {
                warn!(target: "store", "Dropping duplicate record id {}", record.id);
            }
        }

        info!(target: "store", "Loaded {} records ({} received)", kept.len(), incoming);
        self.records = kept;
        self.records.len()
    }

    /// Set `field` on the record with `id`. Missing ids are a silent no-op.
    pub fn update(&mut self, id: RecordId, field: &str, value: &str) -> bool {
        if field == "id" {
            warn!(target: "store", "Refusing to rewrite id of record {}", id);
            return false;
        }

        match self.get_mut(id) {
            Some(record) => record.set_field(field, value),
            None => {
                debug!(target: "store", "update ignored, no record {}", id);
                false
            }
        }
    }

    /// Put a whole record back in place (used when an edit is reverted)
    pub fn replace(&mut self, record: Record) -> bool {
        match self.get_mut(record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: RecordId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() != before;
        if !removed {
            debug!(target: "store", "remove ignored, no record {}", id);
        }
        removed
    }

    /// Delete every record whose id is in `ids`. Returns how many went away.
    pub fn remove_many(&mut self, ids: &BTreeSet<RecordId>) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !ids.contains(&r.id));
        before - self.records.len()
    }

    pub fn get(&self, id: RecordId) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    fn get_mut(&mut self, id: RecordId) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
