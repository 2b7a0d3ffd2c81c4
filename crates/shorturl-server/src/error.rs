use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shorturl_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("empty url")]
    EmptyUrl,

    #[error("url too long")]
    UrlTooLong,

    #[error("invalid url")]
    InvalidUrl,

    #[error("invalid code")]
    InvalidCode,

    #[error("invalid domain")]
    InvalidDomain,

    #[error("not found")]
    NotFound,

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::InvalidCode(_) => Self::InvalidCode,
            StoreError::NotFound(_) => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

impl ServerError {
    /// HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyUrl | Self::InvalidUrl | Self::InvalidCode | Self::InvalidDomain => {
                StatusCode::BAD_REQUEST
            }
            Self::UrlTooLong => StatusCode::URI_TOO_LONG,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Plain-text body sent to the client. Server-side details stay in the log.
    fn public_message(&self) -> String {
        match self {
            Self::Store(_) => "storage error".into(),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => "internal server error".into(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!(error = %self, "request failed");
        }
        (status, self.public_message()).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
