use crate::error::StoreResult;

/// Two-way mapping between origins and short codes.
///
/// All implementations must satisfy these invariants:
/// - `encode` is idempotent: the same origin always yields the same code and
///   only the first call for an origin allocates an id.
/// - Ids are allocated in strictly increasing order, never below the
///   store's starting index, and are never reused.
/// - `decode(encode(origin)) == origin`.
/// - Calls block until the backing storage has answered; failures are
///   returned immediately and not retried.
pub trait UrlStore: Send + Sync {
    /// Return the code for `origin`, allocating a new id if it is unseen.
    fn encode(&self, origin: &str) -> StoreResult<String>;

    /// Return the origin stored under `code`.
    ///
    /// Returns `Err(InvalidCode)` if `code` is not alphabet-valid and
    /// `Err(NotFound)` if no origin was ever stored under it.
    fn decode(&self, code: &str) -> StoreResult<String>;
}

impl<S: UrlStore + ?Sized> UrlStore for std::sync::Arc<S> {
    fn encode(&self, origin: &str) -> StoreResult<String> {
        (**self).encode(origin)
    }

    fn decode(&self, code: &str) -> StoreResult<String> {
        (**self).decode(code)
    }
}
