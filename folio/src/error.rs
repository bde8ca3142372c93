//! The error type of this crate.

use folio_syntax::{FilterError, ParseError};
use thiserror::Error;

/// A result with this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can be returned by the operations of this crate.
///
/// Problems with the input itself are usually not errors: they are recorded as issues
/// on the document instead, and only surface in validation reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No object graph could be recovered from the input.
    #[error("malformed document: {0}")]
    MalformedDocument(String),
    /// A recursion or size guard was tripped.
    #[error("structural limit of {limit} exceeded")]
    StructuralLimit {
        /// The limit that was exceeded.
        limit: usize,
    },
    /// Stream data uses a filter that is unknown or not implemented.
    #[error("unsupported filter /{0}")]
    UnsupportedFilter(String),
    /// Stream data could not be decoded.
    #[error("stream could not be decoded: {0}")]
    Decode(FilterError),
    /// No schema is registered under the name.
    #[error("unknown schema {0:?}")]
    UnknownSchema(String),
    /// A schema with the name is already registered.
    #[error("a schema named {0:?} is already registered")]
    DuplicateSchema(String),
}

impl From<FilterError> for Error {
    fn from(e: FilterError) -> Self {
        match e {
            FilterError::UnsupportedFilter(name) => Self::UnsupportedFilter(name),
            FilterError::LimitExceeded { limit } => Self::StructuralLimit { limit },
            other => Self::Decode(other),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::StructuralLimit { limit } => Self::StructuralLimit { limit },
            other => Self::MalformedDocument(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use folio_syntax::FilterError;

    #[test]
    fn filter_errors() {
        assert_eq!(
            Error::from(FilterError::UnsupportedFilter("JBIG2Decode".to_string())),
            Error::UnsupportedFilter("JBIG2Decode".to_string())
        );
        assert_eq!(
            Error::from(FilterError::LimitExceeded { limit: 10 }),
            Error::StructuralLimit { limit: 10 }
        );
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::UnknownSchema("PDF-9".to_string()).to_string(),
            "unknown schema \"PDF-9\""
        );
    }
}
