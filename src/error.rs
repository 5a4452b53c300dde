//! Error types shared by the store, the line protocol and configuration

use std::io;

use thiserror::Error;

/// Coarse classification of [`Error`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File open/read/write failures and line scanning failures
    Io,
    /// Invalid configuration, including an unknown store kind
    Config,
    /// A malformed map-mode line
    Parse,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unknown store kind '{0}'")]
    UnknownStoreKind(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A map-mode line that does not carry both a key and a value
    #[error("malformed line {line_no}: {content:?} (expected \"<key> <value>\")")]
    Parse { line_no: usize, content: String },

    #[error("line {line_no} exceeds the maximum length of {max} bytes")]
    LineTooLong { line_no: usize, max: usize },

    #[error("line {line_no} is not valid UTF-8")]
    InvalidUtf8 { line_no: usize },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) | Error::LineTooLong { .. } | Error::InvalidUtf8 { .. } => ErrorKind::Io,
            Error::UnknownStoreKind(_) | Error::InvalidConfig(_) => ErrorKind::Config,
            Error::Parse { .. } => ErrorKind::Parse,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let io_err = Error::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert_eq!(io_err.kind(), ErrorKind::Io);
        assert_eq!(Error::LineTooLong { line_no: 1, max: 8 }.kind(), ErrorKind::Io);
        assert_eq!(Error::InvalidUtf8 { line_no: 3 }.kind(), ErrorKind::Io);
        assert_eq!(Error::UnknownStoreKind("tree".into()).kind(), ErrorKind::Config);
        assert_eq!(
            Error::Parse {
                line_no: 2,
                content: "lonely".into()
            }
            .kind(),
            ErrorKind::Parse
        );
    }

    #[test]
    fn test_parse_error_names_line() {
        let err = Error::Parse {
            line_no: 4,
            content: "lonely".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 4"));
        assert!(msg.contains("lonely"));
    }
}
