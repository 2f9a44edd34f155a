//! Error types.

use thiserror::Error;
use trellis_dom::DomError;

/// Errors surfaced by the widget core and the table adapter.
///
/// Missing codecs and operations on a detached table are not errors: they are
/// absorbed as logged no-ops returning a documented default.
#[derive(Debug, Error)]
pub enum Error {
    /// A record could not be converted to or from its native representation.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Native data did not have the expected shape.
    #[error("malformed native data: {0}")]
    Malformed(String),

    /// Something the operation requires is absent (mount point, host element).
    #[error("missing required context: {0}")]
    MissingContext(String),

    /// The document rejected a mutation.
    #[error("document error: {0}")]
    Dom(#[from] DomError),
}

impl Error {
    /// Creates a new missing-context error.
    pub fn missing(what: impl Into<String>) -> Self {
        Self::MissingContext(what.into())
    }

    /// Creates a new malformed-data error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
