//! sleek Networking
//!
//! Request model, the network primitive seam and the TTL/quota-bounded API
//! response cache that can be composed in front of it.

pub mod cache;
pub mod clock;
pub mod fetch;
pub mod intercept;
pub mod policy;
pub mod request;
pub mod storage;

pub use cache::{CacheConfig, CacheEntry, CacheStats, CacheStore, WriteOutcome};
pub use clock::{Clock, ManualClock, SystemClock};
pub use fetch::{Fetcher, LocalFuture};
pub use intercept::CachingFetcher;
pub use policy::CachePolicy;
pub use request::{CacheMode, Method, Request, RequestMode};
pub use storage::{KeyValueStore, MemoryStorage, StorageError};

/// HTTP Response
#[derive(Debug, Clone, Default)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// Served by the response cache
    pub from_cache: bool,
}

impl Response {
    /// 200 response with a content type
    pub fn ok_with(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: body.into(),
            from_cache: false,
        }
    }

    /// Bare response with a status code
    pub fn status(status: u16) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    /// Check if response is OK (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Get header value (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Get body as text
    pub fn text(&self) -> Result<&str, NetError> {
        std::str::from_utf8(&self.body).map_err(|e| NetError::Network(format!("body is not UTF-8: {e}")))
    }
}

/// Network error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetError {
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
