//! Error types for the range coder core.
//!
//! Every fallible operation in this crate returns one of the three kinds
//! below instead of panicking; see `spec.md` section 7 for the rationale.

use thiserror::Error;

/// Errors produced by the range coder core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Fewer than two symbols are used, more than 256 symbols were given,
    /// the total frequency is zero, or the model builder's second pass
    /// could not make the cumulative total reach `PROB_SCALE`.
    #[error("bad alphabet: {0}")]
    BadAlphabet(&'static str),

    /// The decoder consumed more bytes than declared, the scalar-tail bound
    /// check failed, or a declared size is inconsistent with the buffer
    /// actually supplied.
    #[error("corrupt input: {0}")]
    CorruptInput(&'static str),

    /// A declared size exceeds `u32::MAX`.
    #[error("size overflow: {0}")]
    SizeOverflow(&'static str),
}

/// Primary result type for this crate.
pub type CodecResult<T> = Result<T, CodecError>;
