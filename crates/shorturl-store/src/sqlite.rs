use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::traits::UrlStore;

/// Name of the mapping table (also its key in `sqlite_sequence`).
const TABLE: &str = "shorturl";

const CREATE_TABLE: &str = "
CREATE TABLE IF NOT EXISTS shorturl (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    origin TEXT UNIQUE
);";

const SELECT_ID: &str = "SELECT id FROM shorturl WHERE origin = ?1";
const SELECT_ORIGIN: &str = "SELECT origin FROM shorturl WHERE id = ?1";
const INSERT_ORIGIN: &str = "INSERT OR IGNORE INTO shorturl (origin) VALUES (?1)";

/// SQLite-backed URL store.
///
/// Holds exactly one connection behind a `Mutex`. Every statement, and in
/// particular every lookup-then-insert sequence in [`UrlStore::encode`], runs
/// while holding it, so all reads and writes against the file form a single
/// total order. This is only sound with one writer process per file.
///
/// Ids come from SQLite's `AUTOINCREMENT` counter, which never reuses a
/// value. The starting index is enforced by seeding that counter when the
/// store is opened.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    starting_index: u64,
}

impl SqliteStore {
    /// Open (or create) a store at `path`.
    ///
    /// Safe to call on an existing file: the table is only created if absent
    /// and the id counter is only ever raised, never lowered.
    pub fn open(starting_index: u64, path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Init(format!("open {}: {e}", path.display())))?;
        Self::with_connection(conn, starting_index, Some(path.to_path_buf()))
    }

    /// Open a store that lives only as long as this value.
    pub fn open_in_memory(starting_index: u64) -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Init(format!("open in-memory database: {e}")))?;
        Self::with_connection(conn, starting_index, None)
    }

    /// Open the store described by `config`.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        Self::open(config.starting_index, &config.path)
    }

    fn with_connection(
        mut conn: Connection,
        starting_index: u64,
        path: Option<PathBuf>,
    ) -> StoreResult<Self> {
        init_table(&mut conn, starting_index)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
            starting_index,
        })
    }

    /// The floor configured when this store was opened.
    pub fn starting_index(&self) -> u64 {
        self.starting_index
    }

    /// Database file path, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of origins stored.
    pub fn len(&self) -> StoreResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM shorturl", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Returns `true` if no origin has been stored yet.
    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Close the underlying connection.
    ///
    /// Dropping the store also closes it; this variant reports failures.
    pub fn close(self) -> StoreResult<()> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| StoreError::Storage("connection lock poisoned".into()))?;
        conn.close()
            .map_err(|(_conn, e)| StoreError::Storage(format!("close: {e}")))
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Storage("connection lock poisoned".into()))
    }
}

/// Create the mapping table and raise the id counter to the floor.
///
/// `AUTOINCREMENT` hands out `seq + 1`, so a floor of `n` means `seq` must be
/// at least `n - 1`. Both steps commit together.
fn init_table(conn: &mut Connection, starting_index: u64) -> StoreResult<()> {
    let tx = conn
        .transaction()
        .map_err(|e| StoreError::Init(format!("begin: {e}")))?;

    tx.execute_batch(CREATE_TABLE)
        .map_err(|e| StoreError::Init(format!("create table: {e}")))?;

    if starting_index != 0 {
        let floor = i64::try_from(starting_index - 1).map_err(|_| {
            StoreError::Init(format!("starting index {starting_index} out of range"))
        })?;

        let seq: Option<i64> = tx
            .query_row(
                "SELECT seq FROM sqlite_sequence WHERE name = ?1",
                [TABLE],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| StoreError::Init(format!("get sqlite_sequence: {e}")))?;

        match seq {
            None => {
                tx.execute(
                    "INSERT INTO sqlite_sequence (name, seq) VALUES (?1, ?2)",
                    rusqlite::params![TABLE, floor],
                )
                .map_err(|e| StoreError::Init(format!("insert sqlite_sequence: {e}")))?;
                debug!(floor, "seeded id counter");
            }
            Some(seq) if seq < floor => {
                tx.execute(
                    "UPDATE sqlite_sequence SET seq = ?2 WHERE name = ?1",
                    rusqlite::params![TABLE, floor],
                )
                .map_err(|e| StoreError::Init(format!("update sqlite_sequence: {e}")))?;
                debug!(from = seq, to = floor, "raised id counter");
            }
            Some(_) => {}
        }
    }

    tx.commit()
        .map_err(|e| StoreError::Init(format!("commit: {e}")))
}

fn lookup_id(conn: &Connection, origin: &str) -> StoreResult<Option<u64>> {
    let id: Option<i64> = conn
        .prepare_cached(SELECT_ID)?
        .query_row([origin], |row| row.get(0))
        .optional()?;
    id.map(|id| {
        u64::try_from(id).map_err(|_| StoreError::Storage(format!("negative id {id} in table")))
    })
    .transpose()
}

impl UrlStore for SqliteStore {
    fn encode(&self, origin: &str) -> StoreResult<String> {
        let conn = self.lock()?;

        // Look up first: a bare INSERT OR IGNORE would still burn a counter
        // value on every duplicate.
        if let Some(id) = lookup_id(&conn, origin)? {
            return Ok(shorturl_codec::encode(id));
        }

        let inserted = conn.prepare_cached(INSERT_ORIGIN)?.execute([origin])?;

        // Re-read rather than trust last_insert_rowid: if the insert was
        // ignored, the id belongs to whoever inserted the origin first.
        let id = lookup_id(&conn, origin)?
            .ok_or_else(|| StoreError::Storage("origin missing after insert".into()))?;
        debug!(id, inserted = inserted == 1, "allocated id");
        Ok(shorturl_codec::encode(id))
    }

    fn decode(&self, code: &str) -> StoreResult<String> {
        let id = crate::code_to_id(code)?;
        let Ok(id) = i64::try_from(id) else {
            return Err(StoreError::NotFound(code.to_string()));
        };

        let conn = self.lock()?;
        let origin: Option<String> = conn
            .prepare_cached(SELECT_ORIGIN)?
            .query_row([id], |row| row.get(0))
            .optional()?;
        origin.ok_or_else(|| StoreError::NotFound(code.to_string()))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .field("starting_index", &self.starting_index)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn id_of(code: &str) -> u64 {
        shorturl_codec::decode(code).unwrap()
    }

    // -----------------------------------------------------------------------
    // Encode / decode
    // -----------------------------------------------------------------------

    #[test]
    fn encode_then_decode() {
        let store = SqliteStore::open_in_memory(1).unwrap();
        let code = store.encode("https://a.example/").unwrap();
        assert_eq!(store.decode(&code).unwrap(), "https://a.example/");
    }

    #[test]
    fn encode_is_idempotent() {
        let store = SqliteStore::open_in_memory(10_000).unwrap();
        let first = store.encode("https://a.example").unwrap();
        let second = store.encode("https://a.example").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn duplicates_do_not_burn_ids() {
        let store = SqliteStore::open_in_memory(1).unwrap();
        let a = store.encode("https://a.example").unwrap();
        store.encode("https://a.example").unwrap();
        store.encode("https://a.example").unwrap();
        let b = store.encode("https://b.example").unwrap();
        assert_eq!(id_of(&b), id_of(&a) + 1);
    }

    #[test]
    fn new_origins_get_consecutive_ids() {
        let store = SqliteStore::open_in_memory(10_000).unwrap();
        let a = store.encode("https://a.example").unwrap();
        let b = store.encode("https://b.example").unwrap();
        assert_ne!(a, b);
        assert_eq!(id_of(&b) - id_of(&a), 1);
    }

    #[test]
    fn origins_compare_byte_exact() {
        let store = SqliteStore::open_in_memory(1).unwrap();
        let lower = store.encode("https://a.example/x").unwrap();
        let upper = store.encode("https://A.example/x").unwrap();
        let slash = store.encode("https://a.example/x/").unwrap();
        assert_ne!(lower, upper);
        assert_ne!(lower, slash);
        assert_eq!(store.len().unwrap(), 3);
    }

    // -----------------------------------------------------------------------
    // Starting index
    // -----------------------------------------------------------------------

    #[test]
    fn starting_index_sets_first_id() {
        let store = SqliteStore::open_in_memory(10_000).unwrap();
        let code = store.encode("https://a.example").unwrap();
        assert_eq!(id_of(&code), 10_000);
    }

    #[test]
    fn zero_starting_index_starts_at_one() {
        let store = SqliteStore::open_in_memory(0).unwrap();
        let code = store.encode("https://a.example").unwrap();
        assert_eq!(id_of(&code), 1);
        assert_eq!(code, "3");
    }

    #[test]
    fn starting_index_out_of_range_fails_init() {
        let err = SqliteStore::open_in_memory(u64::MAX).unwrap_err();
        assert!(matches!(err, StoreError::Init(_)));
    }

    #[test]
    fn reopen_keeps_ids_and_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.db");

        let store = SqliteStore::open(10_000, &path).unwrap();
        let a = store.encode("https://a.example").unwrap();
        store.close().unwrap();

        let store = SqliteStore::open(10_000, &path).unwrap();
        assert_eq!(store.decode(&a).unwrap(), "https://a.example");
        assert_eq!(store.encode("https://a.example").unwrap(), a);
        let b = store.encode("https://b.example").unwrap();
        assert_eq!(id_of(&b), 10_001);
    }

    #[test]
    fn reopen_with_lower_floor_never_moves_counter_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.db");

        let store = SqliteStore::open(10_000, &path).unwrap();
        store.encode("https://a.example").unwrap();
        drop(store);

        let store = SqliteStore::open(5, &path).unwrap();
        let b = store.encode("https://b.example").unwrap();
        assert_eq!(id_of(&b), 10_001);
    }

    #[test]
    fn reopen_with_higher_floor_raises_counter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("urls.db");

        let store = SqliteStore::open(100, &path).unwrap();
        let a = store.encode("https://a.example").unwrap();
        drop(store);

        let store = SqliteStore::open(20_000, &path).unwrap();
        let b = store.encode("https://b.example").unwrap();
        assert_eq!(id_of(&b), 20_000);
        // Rows below the new floor are left as they were.
        assert_eq!(id_of(&a), 100);
        assert_eq!(store.decode(&a).unwrap(), "https://a.example");
    }

    #[test]
    fn from_config_uses_path_and_floor() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            starting_index: 42,
            path: dir.path().join("cfg.db"),
        };
        let store = SqliteStore::from_config(&config).unwrap();
        assert_eq!(store.starting_index(), 42);
        assert_eq!(store.path(), Some(config.path.as_path()));
        assert_eq!(id_of(&store.encode("https://a.example").unwrap()), 42);
    }

    #[test]
    fn open_in_missing_directory_fails_init() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("urls.db");
        let err = SqliteStore::open(1, &path).unwrap_err();
        assert!(matches!(err, StoreError::Init(_)));
    }

    // -----------------------------------------------------------------------
    // Decode errors
    // -----------------------------------------------------------------------

    #[test]
    fn decode_unknown_code_is_not_found() {
        let store = SqliteStore::open_in_memory(10_000).unwrap();
        store.encode("https://a.example").unwrap();
        assert!(matches!(store.decode("ZZZZZZ"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn decode_invalid_code() {
        let store = SqliteStore::open_in_memory(10_000).unwrap();
        assert!(matches!(store.decode("!!!"), Err(StoreError::InvalidCode(_))));
    }

    #[test]
    fn decode_code_beyond_id_range_is_not_found() {
        let store = SqliteStore::open_in_memory(1).unwrap();
        let beyond_i64 = shorturl_codec::encode(u64::MAX);
        assert!(matches!(store.decode(&beyond_i64), Err(StoreError::NotFound(_))));
        let beyond_u64 = "z".repeat(13);
        assert!(matches!(store.decode(&beyond_u64), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn decode_empty_code_is_not_found() {
        let store = SqliteStore::open_in_memory(1).unwrap();
        store.encode("https://a.example").unwrap();
        assert!(matches!(store.decode(""), Err(StoreError::NotFound(_))));
    }

    // -----------------------------------------------------------------------
    // Storage errors
    // -----------------------------------------------------------------------

    #[test]
    fn encode_with_exhausted_counter_is_storage_error() {
        // The counter starts at the largest rowid SQLite can hand out.
        let store = SqliteStore::open_in_memory(i64::MAX as u64 + 1).unwrap();
        let err = store.encode("https://a.example").unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn storage_error_leaves_existing_rows_readable() {
        let store = SqliteStore::open_in_memory(i64::MAX as u64).unwrap();
        let a = store.encode("https://a.example").unwrap();
        assert_eq!(id_of(&a), i64::MAX as u64);
        assert!(matches!(store.encode("https://b.example"), Err(StoreError::Storage(_))));
        assert_eq!(store.decode(&a).unwrap(), "https://a.example");
    }

    // -----------------------------------------------------------------------
    // Concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_first_encodes_agree() {
        let store = Arc::new(SqliteStore::open_in_memory(10_000).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.encode("https://race.example").unwrap())
            })
            .collect();

        let codes: Vec<String> = handles
            .into_iter()
            .map(|h| h.join().expect("thread should not panic"))
            .collect();
        assert!(codes.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(id_of(&codes[0]), 10_000);
    }

    #[test]
    fn concurrent_distinct_encodes_are_gapless() {
        let store = Arc::new(SqliteStore::open_in_memory(1).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.encode(&format!("https://{i}.example")).unwrap())
            })
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .map(|h| id_of(&h.join().expect("thread should not panic")))
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }

    // -----------------------------------------------------------------------
    // Misc
    // -----------------------------------------------------------------------

    #[test]
    fn len_and_is_empty() {
        let store = SqliteStore::open_in_memory(1).unwrap();
        assert!(store.is_empty().unwrap());
        store.encode("https://a.example").unwrap();
        assert!(!store.is_empty().unwrap());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn usable_as_trait_object() {
        let store: Arc<dyn UrlStore> = Arc::new(SqliteStore::open_in_memory(1).unwrap());
        let code = store.encode("https://a.example").unwrap();
        assert_eq!(store.decode(&code).unwrap(), "https://a.example");
    }

    #[test]
    fn debug_format() {
        let store = SqliteStore::open_in_memory(7).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("SqliteStore"));
        assert!(debug.contains("starting_index"));
    }
}
