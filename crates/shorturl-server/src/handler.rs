use std::sync::Arc;

use askama::Template;
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use shorturl_store::UrlStore;

use crate::error::{ServerError, ServerResult};
use crate::normalize::normalize_url;

/// Usage page served at `/`. Fields are HTML-escaped on render.
#[derive(Template)]
#[template(path = "page.html")]
struct LandingPage<'a> {
    base: &'a str,
}

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn UrlStore>,
    base_url: Option<String>,
    max_url_len: usize,
}

impl AppState {
    pub fn new(store: Arc<dyn UrlStore>, base_url: Option<String>, max_url_len: usize) -> Self {
        Self { store, base_url, max_url_len }
    }

    /// Prefix prepended to codes in returned links.
    fn base_prefix(&self, headers: &HeaderMap) -> ServerResult<String> {
        if let Some(base) = &self.base_url {
            return Ok(base.clone());
        }
        let host = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .filter(|h| !h.is_empty())
            .ok_or(ServerError::InvalidDomain)?;
        Ok(format!("http://{host}/"))
    }

    /// Run a blocking store call off the async executor.
    async fn with_store<T, F>(&self, f: F) -> ServerResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn UrlStore) -> ServerResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || f(store.as_ref()))
            .await
            .map_err(|e| ServerError::Internal(format!("store task: {e}")))?
    }
}

#[derive(Debug, Deserialize)]
pub struct ShortenForm {
    #[serde(default)]
    pub url: String,
}

/// `GET /`: usage page.
pub async fn landing_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ServerResult<Html<String>> {
    let base = state.base_prefix(&headers)?;
    let page = LandingPage { base: &base }
        .render()
        .map_err(|e| ServerError::Internal(format!("render landing page: {e}")))?;
    Ok(Html(page))
}

/// `POST /`: store a URL and return its short link.
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ShortenForm>,
) -> ServerResult<String> {
    if form.url.is_empty() {
        return Err(ServerError::EmptyUrl);
    }
    if form.url.len() > state.max_url_len {
        return Err(ServerError::UrlTooLong);
    }
    let origin = normalize_url(&form.url)?;

    let code = state
        .with_store(move |store| store.encode(&origin).map_err(ServerError::from))
        .await?;

    let base = state
        .base_prefix(&headers)
        .map_err(|_| ServerError::Internal("no host for short link".into()))?;
    Ok(format!("{base}{code}"))
}

/// `GET /{code}`: redirect to the stored origin.
pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ServerResult<Response> {
    if !shorturl_codec::validate(&code) {
        return Err(ServerError::InvalidCode);
    }
    let origin = state
        .with_store(move |store| store.decode(&code).map_err(ServerError::from))
        .await?;
    let location = HeaderValue::try_from(origin)
        .map_err(|e| ServerError::Internal(format!("stored origin is not a header value: {e}")))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
