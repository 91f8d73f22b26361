//! `repack-raw`: rebuild an archive from a raw-extract folder tree.
//!
//! The input layout is the one `extract --raw` produces: one `AA-BB-CC`
//! directory per ident, holding `IIIIIIII.bin` payload files. Anything that
//! does not match those name patterns is ignored.

use crate::error::CliError;
use argh::FromArgs;
use skout_bit_archive::{write_archive, Archive, CompressionKind, Entry, Ident};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(FromArgs, Debug)]
/// Repack a raw-extracted folder into a BIT archive
#[argh(subcommand, name = "repack-raw")]
pub struct RepackRawCmd {
    /// the input folder to repack
    #[argh(positional)]
    pub input_directory: PathBuf,

    /// the output .bit file
    #[argh(positional)]
    pub output_file: Option<PathBuf>,

    /// revision number to use for the archive
    #[argh(option, default = "258")]
    pub revision: u16,

    /// compression method: copy, rle or lzrle
    #[argh(
        option,
        default = "CompressionKind::Rle",
        from_str_fn(parse_compression)
    )]
    pub compression: CompressionKind,
}

fn parse_compression(value: &str) -> Result<CompressionKind, String> {
    match value.to_ascii_lowercase().as_str() {
        "copy" => Ok(CompressionKind::Copy),
        "rle" => Ok(CompressionKind::Rle),
        "lzrle" => Ok(CompressionKind::LzRle),
        other => Err(format!("unknown compression method \"{other}\"")),
    }
}

pub fn handle_repack_command(cmd: &RepackRawCmd) -> Result<(), CliError> {
    if !cmd.input_directory.is_dir() {
        return Err(CliError::Usage(format!(
            "the specified input path is not a directory: {}",
            cmd.input_directory.display()
        )));
    }

    let output = match &cmd.output_file {
        Some(path) => path.clone(),
        None => cmd.input_directory.with_extension("bit"),
    };
    if output.exists() {
        return Err(CliError::Usage(format!(
            "the specified output path already exists: {}",
            output.display()
        )));
    }

    let archive = collect_entries(&cmd.input_directory, cmd.revision, cmd.compression)?;

    let mut file = fs::File::create_new(&output)?;
    write_archive(&archive, &mut file)?;
    Ok(())
}

fn collect_entries(
    input: &Path,
    revision: u16,
    compression: CompressionKind,
) -> Result<Archive, CliError> {
    let mut archive = Archive::new(revision);

    let mut folders: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(|dir_entry| Some(dir_entry.ok()?.path()))
        .filter(|path| path.is_dir())
        .collect();
    folders.sort();

    for folder in folders {
        let Some(ident) = folder
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_ident)
        else {
            continue;
        };

        let mut files: Vec<PathBuf> = fs::read_dir(&folder)?
            .filter_map(|dir_entry| Some(dir_entry.ok()?.path()))
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        for file in files {
            let Some(id) = parse_entry_id(&file) else {
                continue;
            };

            archive.entries.push(Entry {
                id,
                hash: 0,
                ident,
                compression,
                uncompressed_prefix: 0,
                bytes: fs::read(&file)?,
            });
        }
    }

    Ok(archive)
}

/// Parses an ident directory name of the form `AA-BB-CC`.
fn parse_ident(name: &str) -> Option<Ident> {
    let mut parts = name.split('-');
    let a = parse_hex_byte(parts.next()?)?;
    let b = parse_hex_byte(parts.next()?)?;
    let c = parse_hex_byte(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(Ident([a, b, c]))
}

fn parse_hex_byte(part: &str) -> Option<u8> {
    if part.len() != 2 {
        return None;
    }
    u8::from_str_radix(part, 16).ok()
}

/// Parses an `IIIIIIII.bin` payload file name into its entry id.
fn parse_entry_id(path: &Path) -> Option<u32> {
    if !path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"))
    {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    if stem.len() != 8 {
        return None;
    }
    u32::from_str_radix(stem, 16).ok()
}
