//! Keyed entity store.
//!
//! The store is the single source of truth for professor entities. The map
//! is append-only: an entry is never removed and never replaced by a
//! different entity instance for the same key. Check-or-create is atomic
//! under the map lock, which is what guarantees at most one pipeline run per
//! key for the lifetime of the store.
//!
//! The store is an explicitly constructed object handed to its users; there
//! is deliberately no global instance.

use crate::professor::{Professor, ProfessorKey, SharedProfessor};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Result of a check-or-create lookup.
pub enum StoreOutcome {
    /// An entity already existed for the key; no pipeline may be started.
    Existing(SharedProfessor),

    /// The entity was created by this call; the caller owns starting its
    /// pipeline (or publishing it, for entities born terminal).
    Created(SharedProfessor),
}

impl StoreOutcome {
    /// The entity handle, regardless of which branch was taken.
    pub fn entity(&self) -> &SharedProfessor {
        match self {
            StoreOutcome::Existing(entity) | StoreOutcome::Created(entity) => entity,
        }
    }

    /// Returns true if this call created the entity.
    pub fn is_created(&self) -> bool {
        matches!(self, StoreOutcome::Created(_))
    }
}

/// Map from normalized instructor identity to entity.
pub struct ProfessorStore {
    entries: Mutex<HashMap<ProfessorKey, SharedProfessor>>,
}

impl ProfessorStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the entity for `key`, if one exists.
    pub fn get(&self, key: &ProfessorKey) -> Option<SharedProfessor> {
        let entries = self.entries.lock().expect("store map poisoned");
        entries.get(key).cloned()
    }

    /// Atomically returns the existing entity for `key` or inserts the one
    /// produced by `create`.
    ///
    /// `create` runs under the map lock, so exactly one caller ever observes
    /// `Created` for a given key.
    pub fn get_or_insert_with<C>(&self, key: ProfessorKey, create: C) -> StoreOutcome
    where
        C: FnOnce() -> Professor,
    {
        let mut entries = self.entries.lock().expect("store map poisoned");

        if let Some(existing) = entries.get(&key) {
            return StoreOutcome::Existing(Arc::clone(existing));
        }

        let entity: SharedProfessor = Arc::new(RwLock::new(create()));
        entries.insert(key, Arc::clone(&entity));
        StoreOutcome::Created(entity)
    }

    /// Number of entities in the store.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("store map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProfessorStore {
    fn default() -> Self {
        Self::new()
    }
}
