use thiserror::Error;

/// General decoding errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input: a bad length table, a broken canonical code, an
    /// out-of-order slice offset, or a bitstream that ran out of symbols.
    #[error("invalid data: {0}")]
    InvalidData(String),
    /// A table allocation could not be satisfied.
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    /// A subtable self-reference was inconsistent while building.
    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// A specialised `Result` type for decoding operations.
pub type Result<T> = ::std::result::Result<T, Error>;
