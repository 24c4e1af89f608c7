//! Module registry for tracking discovered modules during bundling
//!
//! The registry is the single owner of every [`ModuleRecord`] for one
//! bundling request. It is keyed by canonical path and keeps insertion
//! order, which doubles as the embedding order of the final bundle. A path
//! that is already present is never inserted or processed again, which is
//! what breaks import cycles.

use indexmap::{IndexMap, map::Entry};
use rustc_hash::FxHasher;

use crate::types::ModuleRecord;

/// Type alias for FxHasher-based IndexMap
type FxIndexMap<K, V> = IndexMap<K, V, std::hash::BuildHasherDefault<FxHasher>>;

/// Index of a module in discovery order.
pub type ModuleIndex = usize;

#[derive(Debug, Default)]
pub struct ModuleRegistry {
    modules: FxIndexMap<String, ModuleRecord>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly discovered module.
    ///
    /// Returns its index, or `None` when a module with the same canonical
    /// path is already registered, in which case `record` is dropped.
    pub fn insert(&mut self, record: ModuleRecord) -> Option<ModuleIndex> {
        match self.modules.entry(record.canonical_path.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                let index = slot.index();
                slot.insert(record);
                Some(index)
            }
        }
    }

    pub fn contains(&self, canonical_path: &str) -> bool {
        self.modules.contains_key(canonical_path)
    }

    pub fn get_index(&self, index: ModuleIndex) -> Option<&ModuleRecord> {
        self.modules.get_index(index).map(|(_, record)| record)
    }

    pub(crate) fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn canonical_paths(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    pub fn into_modules(self) -> Vec<ModuleRecord> {
        self.modules.into_values().collect()
    }
}
