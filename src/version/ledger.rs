//! Ledger of already reported updates
//!
//! Holds one version per `(component_id, source)` pair. It is a dedup gate
//! only: whether a version is newer is decided before it reaches the ledger.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::version::types::NotifiedEntry;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationLedger {
    entries: IndexMap<(String, String), String>,
}

impl NotificationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from persisted entries; a repeated key keeps its last version
    pub fn from_entries(entries: impl IntoIterator<Item = NotifiedEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| ((entry.component_id, entry.source), entry.version))
            .collect();
        Self { entries }
    }

    /// Returns true if `version` was already reported for this app and source.
    ///
    /// Otherwise records `version` (inserting or overwriting) and returns false,
    /// so a changed version is reported again even if it went down.
    pub fn should_suppress(&mut self, component_id: &str, source: &str, version: &str) -> bool {
        match self
            .entries
            .entry((component_id.to_string(), source.to_string()))
        {
            Entry::Occupied(entry) if entry.get() == version => true,
            Entry::Occupied(mut entry) => {
                entry.insert(version.to_string());
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(version.to_string());
                false
            }
        }
    }

    pub fn version_for(&self, component_id: &str, source: &str) -> Option<&str> {
        self.entries
            .get(&(component_id.to_string(), source.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-insertion order
    pub fn entries(&self) -> Vec<NotifiedEntry> {
        self.entries
            .iter()
            .map(|((component_id, source), version)| NotifiedEntry {
                component_id: component_id.clone(),
                source: source.clone(),
                version: version.clone(),
            })
            .collect()
    }
}
