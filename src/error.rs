//! Error types for quire operations.

use thiserror::Error;

/// Errors that can occur while planning or applying a WXR import.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid WXR: {0}")]
    InvalidWxr(String),

    #[error("No pending import manifest")]
    MissingManifest,

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
