use cookie_factory::GenError;
use nom::error::{ErrorKind, ParseError};
use std::io;
use thiserror::Error;

/// Errors raised while reading or writing capture files
#[derive(Debug, Error)]
pub enum PcapError {
    /// The first 4 bytes of the stream are not a known pcap magic number
    #[error("unrecognized pcap magic number {0:02x?}")]
    UnrecognizedMagic([u8; 4]),
    /// The stream ended inside the file header or a record header
    #[error("truncated header: expected {expected} bytes, got {actual}")]
    TruncatedHeader { expected: usize, actual: usize },
    /// The stream ended before `caplen` payload bytes could be read
    #[error("truncated payload: expected {expected} bytes, got {actual}")]
    TruncatedPayload { expected: usize, actual: usize },
    /// A packet payload does not match its declared captured length
    #[error("payload length {payload_len} does not match captured length {caplen}")]
    PreconditionViolation { caplen: u32, payload_len: usize },
    /// Captures cannot be merged because a header field differs
    #[error("incompatible captures: {0} differs")]
    IncompatibleCaptures(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization failed: {0}")]
    Serialize(String),
    #[error("parser error: {0:?}")]
    NomError(ErrorKind),
}

impl PcapError {
    /// Returns true if the error was caused by a record or header cut short
    pub fn is_truncated(&self) -> bool {
        matches!(
            self,
            PcapError::TruncatedHeader { .. } | PcapError::TruncatedPayload { .. }
        )
    }
}

impl<I> ParseError<I> for PcapError {
    fn from_error_kind(_input: I, kind: ErrorKind) -> Self {
        PcapError::NomError(kind)
    }
    fn append(_input: I, kind: ErrorKind, _other: Self) -> Self {
        PcapError::NomError(kind)
    }
}

impl From<GenError> for PcapError {
    fn from(e: GenError) -> Self {
        match e {
            GenError::IoError(e) => PcapError::Io(e),
            e => PcapError::Serialize(format!("{:?}", e)),
        }
    }
}

impl From<nom::Err<PcapError>> for PcapError {
    fn from(err: nom::Err<PcapError>) -> Self {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(_) => PcapError::NomError(ErrorKind::Eof),
        }
    }
}
