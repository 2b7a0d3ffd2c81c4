use url::Url;

use crate::error::{ServerError, ServerResult};

/// Canonical form of a submitted URL, used as the store's origin key.
///
/// Requires an absolute URL with a non-empty host. The host is converted to
/// ASCII (IDNA) by the parser, an empty query (`?` with nothing after it) is
/// dropped and an empty path becomes `/`.
pub fn normalize_url(raw: &str) -> ServerResult<String> {
    let mut url = Url::parse(raw).map_err(|_| ServerError::InvalidUrl)?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ServerError::InvalidUrl);
    }
    if url.query() == Some("") {
        url.set_query(None);
    }
    if url.path().is_empty() {
        url.set_path("/");
    }
    Ok(url.into())
}
