//! Error type for ULC compress/decompress calls.
//!
//! One variant per fatal condition. Variant U's dominant-family-is-raw
//! warning is not a variant here: it's non-fatal, so it surfaces as a
//! `log::warn!` call at the point it's detected rather than an `Err`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UlcError {
    #[error("cannot open input: {0}")]
    InputOpenFailed(#[source] std::io::Error),

    #[error("cannot open output: {0}")]
    OutputOpenFailed(#[source] std::io::Error),

    #[error("invalid magic header")]
    BadMagic,

    #[error("codec init failed: {0}")]
    CodecInitFailed(String),

    #[error("codec stream error: {0}")]
    CodecStreamError(String),

    #[error(
        "format consistency check failed: fewer than 100 lines, or dominant format family below 80%"
    )]
    FormatConsistencyFailed,

    #[error("varint decode overflow")]
    VarintOverflow,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UlcError>;
