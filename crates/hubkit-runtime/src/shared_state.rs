//! Versioned shared-state store
//!
//! Each extension owns one manager per state type. Versions are event
//! numbers; the store is a sparse sorted map where a version holds either a
//! resolved value or a PENDING placeholder awaiting resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use hubkit_core::internal::LoggerWrapper;
use hubkit_core::{EventData, EventNumber};

// ----------------------------------------------------------------------------
// Entries and Statuses
// ----------------------------------------------------------------------------

/// Outcome of a shared-state write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedStateStatus {
    /// A value is now resolved at the version.
    Set,
    /// The version is reserved, awaiting resolution.
    Pending,
    /// The write was rejected: stale version, overwrite of a resolved value,
    /// or a null resolution.
    NotSet,
}

#[derive(Clone)]
enum StateEntry {
    Set(Arc<EventData>),
    Pending,
}

// ----------------------------------------------------------------------------
// Shared State Manager
// ----------------------------------------------------------------------------

/// Sorted map from version to state entry for one `(extension, state-type)`.
pub struct SharedStateManager {
    name: String,
    entries: BTreeMap<EventNumber, StateEntry>,
    logger: LoggerWrapper,
}

impl SharedStateManager {
    pub fn new(name: impl Into<String>, logger: LoggerWrapper) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
            logger,
        }
    }

    /// Write state at `version`. `None` data reserves the version as PENDING.
    /// A later write with data at a PENDING version resolves it. Writes below
    /// the highest stored version are rejected.
    pub fn set(&mut self, version: EventNumber, data: Option<Arc<EventData>>) -> SharedStateStatus {
        match self.entries.get(&version) {
            Some(StateEntry::Pending) => match data {
                Some(data) => {
                    self.entries.insert(version, StateEntry::Set(data));
                    self.logger
                        .verbose(&self.name, &format!("resolved pending state at v{version}"));
                    SharedStateStatus::Set
                }
                None => SharedStateStatus::NotSet,
            },
            Some(StateEntry::Set(_)) => {
                self.logger.debug(
                    &self.name,
                    &format!("rejected overwrite of resolved state at v{version}"),
                );
                SharedStateStatus::NotSet
            }
            None => {
                let highest = self.entries.keys().next_back().copied();
                if highest.is_some_and(|max| version < max) {
                    self.logger.debug(
                        &self.name,
                        &format!("rejected stale state at v{version}"),
                    );
                    return SharedStateStatus::NotSet;
                }
                match data {
                    Some(data) => {
                        self.entries.insert(version, StateEntry::Set(data));
                        SharedStateStatus::Set
                    }
                    None => {
                        self.entries.insert(version, StateEntry::Pending);
                        SharedStateStatus::Pending
                    }
                }
            }
        }
    }

    /// Greatest resolved value at-or-before `version`. PENDING holes between
    /// the requested version and the answer are skipped, never surfaced.
    pub fn get(&self, version: EventNumber) -> Option<Arc<EventData>> {
        self.entries
            .range(..=version)
            .rev()
            .find_map(|(_, entry)| match entry {
                StateEntry::Set(data) => Some(data.clone()),
                StateEntry::Pending => None,
            })
    }

    /// True when `version` itself holds a PENDING placeholder.
    pub fn is_pending(&self, version: EventNumber) -> bool {
        matches!(self.entries.get(&version), Some(StateEntry::Pending))
    }

    /// Remove every entry and forget the version high-water mark.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
