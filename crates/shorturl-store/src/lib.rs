//! Durable `origin -> id` mapping behind the shorturl service.
//!
//! Every distinct origin (a long URL, compared byte for byte) is assigned
//! one id the first time it is seen. Ids come from a monotonic counter that
//! never goes below the configured starting index, and are exposed to
//! callers only as short codes produced by [`shorturl_codec`].
//!
//! # Storage Backends
//!
//! All backends implement the [`UrlStore`] trait:
//!
//! - [`SqliteStore`] -- single-connection SQLite file, the production backend
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Rows are written once and never updated or deleted.
//! 2. Encoding an origin that is already stored never allocates an id.
//! 3. Ids are never reused and never allocated below the starting index.
//! 4. Lookup-then-insert is serialized, so concurrent first submissions of
//!    the same origin all receive the same code.
//! 5. All I/O errors are propagated to the caller, never retried.

pub mod config;
pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
pub use traits::UrlStore;

use shorturl_codec::CodecError;

/// Resolve a code to the id it names.
///
/// A code that is well-formed but too large for any id cannot have been
/// issued, so it is reported as [`StoreError::NotFound`].
pub(crate) fn code_to_id(code: &str) -> StoreResult<u64> {
    match shorturl_codec::decode(code) {
        Ok(id) => Ok(id),
        Err(CodecError::Overflow) => Err(StoreError::NotFound(code.to_string())),
        Err(e @ CodecError::InvalidCode { .. }) => Err(StoreError::InvalidCode(e.to_string())),
    }
}
