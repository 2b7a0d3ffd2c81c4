use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Starting index used when none is configured.
pub const DEFAULT_STARTING_INDEX: u64 = 10_000;

/// Settings fixed when a store is opened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Floor for newly allocated ids. `0` disables the floor.
    pub starting_index: u64,
    /// Location of the SQLite database file.
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            starting_index: DEFAULT_STARTING_INDEX,
            path: PathBuf::from("shorturl.db"),
        }
    }
}
