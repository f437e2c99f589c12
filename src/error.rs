use std::fmt::{self, Display};
use std::io;

/// Provides `LineProfError` and maps other errors to
/// convert to a `LineProfError`
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum LineProfError {
    IoError(io::Error),
    JsonError(serde_json::Error),
    LineProfError(String),
}

impl From<io::Error> for LineProfError {
    fn from(error: io::Error) -> Self {
        LineProfError::IoError(error)
    }
}

impl From<serde_json::Error> for LineProfError {
    fn from(error: serde_json::Error) -> Self {
        LineProfError::JsonError(error)
    }
}

impl From<String> for LineProfError {
    fn from(error: String) -> Self {
        LineProfError::LineProfError(error)
    }
}

impl From<&str> for LineProfError {
    fn from(error: &str) -> Self {
        LineProfError::LineProfError(error.to_string())
    }
}

impl std::error::Error for LineProfError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LineProfError::IoError(error) => Some(error),
            LineProfError::JsonError(error) => Some(error),
            LineProfError::LineProfError(_) => None,
        }
    }
}

impl Display for LineProfError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LineProfError::IoError(error) => write!(f, "I/O error: {error}"),
            LineProfError::JsonError(error) => write!(f, "malformed stats file: {error}"),
            LineProfError::LineProfError(message) => write!(f, "{message}"),
        }
    }
}
