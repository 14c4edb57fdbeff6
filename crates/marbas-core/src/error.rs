//! Error types for streaming bzip2 operations.

use thiserror::Error;

/// Result type alias for streaming operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Streaming bzip2 error types.
#[derive(Debug, Error)]
pub enum Error {
    /// Operation attempted on a handle that has been closed.
    #[error("handle is closed")]
    Closed,

    /// A tuning parameter was outside its allowed range.
    #[error("{param} {value} out of range [{min}, {max}]")]
    OutOfRange {
        param: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// The codec was driven out of protocol order.
    #[error("codec called out of sequence")]
    Sequence,

    /// The codec rejected one of its internal parameters.
    #[error("codec parameter out of range")]
    Param,

    /// The codec could not allocate the memory it needs.
    #[error("codec allocation failed")]
    Mem,

    /// Integrity check failed in the compressed input.
    #[error("compressed data failed integrity check")]
    Data,

    /// Input does not begin with the bzip2 stream signature.
    #[error("missing bzip2 stream signature")]
    DataMagic,

    /// The source ended before the compressed stream was complete.
    #[error("unexpected end of input after {bytes_read} compressed bytes")]
    UnexpectedEof { bytes_read: u64 },

    /// The codec reported a status that is impossible for the call made.
    #[error("unexpected codec status: {status}")]
    Unexpected { status: &'static str },

    /// I/O error from the underlying source or sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an out-of-range parameter error.
    pub fn out_of_range(param: &'static str, value: u32, min: u32, max: u32) -> Self {
        Error::OutOfRange {
            param,
            value,
            min,
            max,
        }
    }

    /// Create an unexpected-status error.
    pub fn unexpected(status: &'static str) -> Self {
        Error::Unexpected { status }
    }

    /// Check whether this is a data-integrity error.
    ///
    /// A missing stream signature ([`Error::DataMagic`]) is a specialized
    /// data error, so both variants report true here.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Error::Data | Error::DataMagic)
    }

    /// Get error category for diagnostics.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Closed => "closed",
            Error::OutOfRange { .. } => "out_of_range",
            Error::Sequence => "sequence",
            Error::Param => "param",
            Error::Mem => "mem",
            Error::Data => "data",
            Error::DataMagic => "data_magic",
            Error::UnexpectedEof { .. } => "unexpected_eof",
            Error::Unexpected { .. } => "unexpected",
            Error::Io(_) => "io",
        }
    }

    /// Recover a typed error that crossed the `std::io` trait boundary.
    ///
    /// The `Read`/`Write` implementations wrap their typed errors inside
    /// `std::io::Error`; this restores the original value. An `io::Error`
    /// that did not originate here comes back as [`Error::Io`].
    pub fn from_io(err: std::io::Error) -> Error {
        if err.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            if let Some(Ok(typed)) = err.into_inner().map(|boxed| boxed.downcast::<Error>()) {
                return *typed;
            }
            return Error::Io(std::io::Error::other("typed error payload lost"));
        }
        Error::Io(err)
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        use std::io::ErrorKind;

        match err {
            Error::Io(inner) => inner,
            err => {
                let kind = match &err {
                    Error::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
                    Error::Data | Error::DataMagic => ErrorKind::InvalidData,
                    _ => ErrorKind::Other,
                };
                std::io::Error::new(kind, err)
            }
        }
    }
}
