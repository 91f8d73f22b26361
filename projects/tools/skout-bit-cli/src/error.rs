//! CLI-level error type and exit-code mapping.

use skout_bit_archive::{ReadError, WriteError};
use thiserror::Error;

/// Errors surfaced by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad arguments or an unusable input/output path.
    #[error("{0}")]
    Usage(String),

    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input archive did not parse.
    #[error("{0}")]
    Read(#[from] ReadError),

    /// The output archive could not be written.
    #[error("{0}")]
    Write(#[from] WriteError),

    /// PNG encoding of a decoded texture failed.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Archive read failures keep the historical codes: 2 for a bad magic,
    /// 3 for a malformed file, 4 for an unsupported compression mode.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) | CliError::Io(_) | CliError::Image(_) => 1,
            CliError::Read(ReadError::InvalidMagic(_)) => 2,
            CliError::Read(ReadError::MalformedFile) => 3,
            CliError::Read(ReadError::UnsupportedCompression(_)) => 4,
            CliError::Write(_) => 2,
        }
    }
}
