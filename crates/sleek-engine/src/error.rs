//! Engine error type

use sleek_dom::DomError;
use sleek_media::MediaError;
use sleek_net::{NetError, StorageError};

/// Any failure surfaced by the engine crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Document error: {0}")]
    Dom(#[from] DomError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Network error: {0}")]
    Net(#[from] NetError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
