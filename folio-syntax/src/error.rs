//! Error types of the syntax layer.

use thiserror::Error;

/// An error that occurred while parsing a single object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input ended in the middle of an object.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A token appeared where it cannot start or continue an object.
    #[error("unexpected token at offset {offset}")]
    UnexpectedToken {
        /// Byte offset of the offending token.
        offset: usize,
    },
    /// Arrays and dictionaries were nested deeper than allowed.
    #[error("nesting depth exceeds the limit of {limit}")]
    StructuralLimit {
        /// The configured maximum nesting depth.
        limit: usize,
    },
    /// An indirect object header did not name the expected object.
    #[error("expected object {expected}, found {found}")]
    ObjectMismatch {
        /// The object number that was requested.
        expected: u32,
        /// The object number found in the file.
        found: u32,
    },
}

/// An error that occurred while decoding stream data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The filter is unknown or not implemented.
    #[error("unsupported filter /{0}")]
    UnsupportedFilter(String),
    /// The encoded data is invalid for the filter.
    #[error("malformed {filter} data")]
    Malformed {
        /// Name of the filter that rejected the data.
        filter: &'static str,
    },
    /// Decoding would produce more output than allowed.
    #[error("decoded output exceeds the limit of {limit} bytes")]
    LimitExceeded {
        /// The configured output limit.
        limit: usize,
    },
    /// The stream data range lies outside of the underlying buffer.
    #[error("stream data is out of bounds")]
    OutOfBounds,
}

/// An error that occurred while reading the cross-reference data of a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XRefError {
    /// No `startxref` keyword could be found.
    #[error("startxref keyword not found")]
    MissingStartXRef,
    /// The data at the given offset is neither an xref table nor an xref stream.
    #[error("no cross-reference section at offset {0}")]
    InvalidSection(usize),
    /// An xref stream could not be decoded.
    #[error("cross-reference stream could not be decoded: {0}")]
    Stream(#[from] FilterError),
    /// Neither the xref chain nor a brute-force scan yielded any objects.
    #[error("no objects could be recovered")]
    Unrecoverable,
}
