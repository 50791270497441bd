//! Error taxonomy shared by every GoodBoy component.
//!
//! Only storage and validation problems ever reach a caller of the chat
//! pipeline. Backend failures are turned into visible text by the persona and
//! synthesis layers, so a missing model degrades a reply instead of failing it.

use std::error::Error;
use std::fmt;
use std::io;

/// Errors produced by GoodBoy stores, backends and request validation.
#[derive(Debug)]
pub enum GoodBoyError {
    /// No model or endpoint could produce text (unreachable, timed out, bad status).
    BackendUnavailable(String),
    /// Reading or writing one of the JSON/JSONL stores failed.
    StorageIo(io::Error),
    /// Input was rejected before entering the pipeline.
    Validation(String),
    /// A looked-up entity does not exist.
    NotFound(String),
}

impl fmt::Display for GoodBoyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoodBoyError::BackendUnavailable(msg) => write!(f, "Backend unavailable: {}", msg),
            GoodBoyError::StorageIo(err) => write!(f, "Storage I/O error: {}", err),
            GoodBoyError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            GoodBoyError::NotFound(what) => write!(f, "Not found: {}", what),
        }
    }
}

impl Error for GoodBoyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GoodBoyError::StorageIo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GoodBoyError {
    fn from(err: io::Error) -> Self {
        GoodBoyError::StorageIo(err)
    }
}

impl From<serde_json::Error> for GoodBoyError {
    fn from(err: serde_json::Error) -> Self {
        GoodBoyError::StorageIo(io::Error::new(io::ErrorKind::InvalidData, err))
    }
}

impl GoodBoyError {
    /// True for failures that should degrade to text rather than abort.
    pub fn is_backend(&self) -> bool {
        matches!(self, GoodBoyError::BackendUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_source() {
        let err: GoodBoyError = io::Error::new(io::ErrorKind::PermissionDenied, "locked").into();
        assert!(matches!(err, GoodBoyError::StorageIo(_)));
        assert!(err.source().is_some());
        assert!(err.to_string().contains("locked"));
    }

    #[test]
    fn serde_errors_map_to_storage() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: GoodBoyError = parse.unwrap_err().into();
        assert!(matches!(err, GoodBoyError::StorageIo(_)));
        assert!(!err.is_backend());
    }
}
