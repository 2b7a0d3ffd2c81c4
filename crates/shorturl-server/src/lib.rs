//! HTTP front end for the shorturl service.
//!
//! Serves a landing page, accepts long URLs on `POST /` and redirects
//! `GET /{code}` to the stored origin. All storage goes through a
//! [`shorturl_store::UrlStore`].

pub mod config;
pub mod error;
pub mod handler;
pub mod normalize;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use normalize::normalize_url;
pub use server::ShortUrlServer;
