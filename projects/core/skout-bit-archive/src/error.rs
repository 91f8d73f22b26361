//! Error types for archive reading and payload decompression.

use thiserror::Error;

/// Errors that can occur while reading a BIT archive.
///
/// All errors are terminal: the whole-archive read is aborted and no partial
/// archive is returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
    /// The input does not start with the `b"BITP"` magic.
    #[error("invalid magic: expected \"BITP\", found {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// Structural inconsistency: out-of-range offset, prefix longer than
    /// the declared length, file-type mismatch between directory and entry
    /// header, or a compressed stream that does not decode cleanly.
    #[error("malformed archive")]
    MalformedFile,

    /// An entry declares a compression mode outside `{0, 1, 2}`.
    #[error("unsupported compression mode {0}")]
    UnsupportedCompression(u8),
}

/// Errors raised while decoding a compressed entry stream.
///
/// The container reader surfaces all of these as [`ReadError::MalformedFile`];
/// the distinct variants exist for direct users of [`crate::codec`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// The instruction stream ended before the output was full.
    #[error("compressed stream is truncated")]
    TruncatedInput,

    /// An op would write past the declared decompressed length.
    #[error("op output of {requested} bytes overruns the declared length (space left: {remaining})")]
    OutputOverrun {
        /// Bytes the op wanted to produce.
        requested: usize,
        /// Bytes of declared output still unfilled.
        remaining: usize,
    },

    /// A back-reference op points before the start of the produced output.
    #[error("back-reference distance {distance} exceeds the {produced} bytes produced so far")]
    BackReferenceOutOfRange {
        /// The op's distance field.
        distance: usize,
        /// Bytes the instruction stream had produced when the op was read.
        produced: usize,
    },

    /// The declared uncompressed prefix is longer than the declared total.
    #[error("uncompressed prefix of {prefix} bytes exceeds the declared length of {length}")]
    PrefixExceedsLength {
        /// Declared uncompressed prefix length.
        prefix: usize,
        /// Declared total decompressed length.
        length: usize,
    },
}
