//! CLI subcommands.

pub mod extract;
pub mod list;
pub mod repack;

use crate::error::CliError;
use std::fs;
use std::path::Path;

/// Reads a whole BIT archive file, turning path problems into usage errors.
pub fn read_input_file(path: &Path) -> Result<Vec<u8>, CliError> {
    if path.is_dir() {
        return Err(CliError::Usage(format!(
            "the specified input path is a directory: {}",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(CliError::Usage(format!(
            "the specified input path does not exist: {}",
            path.display()
        )));
    }

    Ok(fs::read(path)?)
}
