use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{StoreError, StoreResult};
use crate::traits::UrlStore;

#[derive(Default)]
struct Tables {
    by_origin: HashMap<String, u64>,
    by_id: BTreeMap<u64, String>,
    next_id: u64,
}

/// In-memory URL store.
///
/// Intended for tests and embedding. Follows the same allocation rules as
/// [`crate::SqliteStore`]: ids start at the starting index (or 1), increase
/// by one per new origin, and are never reused. Contents are lost on drop.
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    starting_index: u64,
}

impl InMemoryStore {
    /// Create an empty store whose first id is `starting_index` (or 1 if zero).
    pub fn new(starting_index: u64) -> Self {
        Self {
            tables: Mutex::new(Tables {
                next_id: starting_index.max(1),
                ..Tables::default()
            }),
            starting_index,
        }
    }

    /// The floor configured at construction.
    pub fn starting_index(&self) -> u64 {
        self.starting_index
    }

    /// Number of origins stored.
    ///
    /// Still answers after a writer panicked: rows are inserted only after
    /// the counter has advanced, so the tables stay consistent.
    pub fn len(&self) -> usize {
        self.tables
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    /// Returns `true` if no origin has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Storage("store lock poisoned".into()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_STARTING_INDEX)
    }
}

impl UrlStore for InMemoryStore {
    fn encode(&self, origin: &str) -> StoreResult<String> {
        let mut tables = self.lock()?;
        if let Some(&id) = tables.by_origin.get(origin) {
            return Ok(shorturl_codec::encode(id));
        }

        let id = tables.next_id;
        tables.next_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::Storage("id space exhausted".into()))?;
        tables.by_origin.insert(origin.to_string(), id);
        tables.by_id.insert(id, origin.to_string());
        Ok(shorturl_codec::encode(id))
    }

    fn decode(&self, code: &str) -> StoreResult<String> {
        let id = crate::code_to_id(code)?;
        let tables = self.lock()?;
        tables
            .by_id
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("origin_count", &self.len())
            .field("starting_index", &self.starting_index)
            .finish()
    }
}
