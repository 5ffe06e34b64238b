//! In-memory candidate store - fragments indexed by 4-byte identifier

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::abi::{CandidateFragment, CandidateStore, InterfaceDefinition, LookupError};

/// Fragments indexed by identifier, in insertion order
///
/// Colliding identifiers keep every fragment; only exact duplicates are
/// dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryCandidateStore {
    fragments: HashMap<[u8; 4], Vec<CandidateFragment>>,
}

impl MemoryCandidateStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fragment behind any already stored under its identifier
    pub fn insert(&mut self, fragment: CandidateFragment) {
        let slot = self.fragments.entry(fragment.identifier).or_default();
        if !slot.contains(&fragment) {
            slot.push(fragment);
        }
    }

    /// Split a definition into one fragment per descriptor and insert each
    ///
    /// Anonymous events have no identifier word to look up, so they are skipped.
    pub fn insert_definition(&mut self, definition: &InterfaceDefinition) {
        for descriptor in definition.iter().filter(|d| !d.is_anonymous()) {
            if let Some(fragment) = CandidateFragment::from_descriptor(descriptor.clone()) {
                self.insert(fragment);
            }
        }
    }

    /// Get the number of stored fragments
    pub fn len(&self) -> usize {
        self.fragments.values().map(Vec::len).sum()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

impl FromIterator<CandidateFragment> for MemoryCandidateStore {
    fn from_iter<I: IntoIterator<Item = CandidateFragment>>(iter: I) -> Self {
        let mut store = Self::new();
        for fragment in iter {
            store.insert(fragment);
        }
        store
    }
}

#[async_trait]
impl CandidateStore for MemoryCandidateStore {
    async fn lookup_by_identifier(
        &self,
        identifier: [u8; 4],
        limit: usize,
    ) -> Result<Vec<CandidateFragment>, LookupError> {
        Ok(self
            .fragments
            .get(&identifier)
            .map(|fragments| fragments.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
