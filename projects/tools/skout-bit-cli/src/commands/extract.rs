//! `extract`: unpack an archive, raw or converted to editable formats.

use crate::commands::read_input_file;
use crate::error::CliError;
use crate::palettes::PaletteCache;
use crate::sink::ImageSink;
use argh::FromArgs;
use skout_bit_archive::{read_archive, Archive, Entry, Ident, TexturePalette};
use skout_bit_texture::{palette_number_from_id, Texture};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(FromArgs, Debug)]
/// Extract a BIT archive
#[argh(subcommand, name = "extract")]
pub struct ExtractCmd {
    /// the BIT archive to extract
    #[argh(positional)]
    pub input_file: PathBuf,

    /// directory to extract the archive to
    #[argh(option, short = 'o')]
    pub output_directory: Option<PathBuf>,

    /// extract the files inside the archive as-is
    #[argh(switch, short = 'r')]
    pub raw: bool,

    /// abort on unknown file types
    #[argh(switch)]
    pub abort_on_unknown: bool,
}

pub fn handle_extract_command(cmd: &ExtractCmd) -> Result<(), CliError> {
    let output = match &cmd.output_directory {
        Some(dir) => dir.clone(),
        None => default_output_dir(&cmd.input_file),
    };
    if output.exists() {
        return Err(CliError::Usage(format!(
            "the specified output path already exists: {}",
            output.display()
        )));
    }

    let bytes = read_input_file(&cmd.input_file)?;
    let archive = read_archive(&bytes)?;

    fs::create_dir_all(&output)?;
    if cmd.raw {
        extract_raw(&archive, &output)
    } else {
        extract_converted(&archive, &output, cmd.abort_on_unknown)
    }
}

/// `file.bit` extracts next to itself as `file_extracted/` by default.
fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".into());
    input.with_file_name(format!("{stem}_extracted"))
}

fn extract_raw(archive: &Archive, output: &Path) -> Result<(), CliError> {
    for entry in &archive.entries {
        let folder = output.join(entry.ident.to_string());
        fs::create_dir_all(&folder)?;
        fs::write(folder.join(format!("{:08X}.bin", entry.id)), &entry.bytes)?;
    }
    Ok(())
}

fn extract_converted(archive: &Archive, output: &Path, abort_on_unknown: bool) -> Result<(), CliError> {
    let palettes = PaletteCache::harvest(archive);

    for entry in &archive.entries {
        if extract_palette(entry, output)? || extract_texture(entry, &palettes, output)? {
            continue;
        }

        println!(
            "Unrecognized file: Id {:08X} | {:08X} | {}",
            entry.id, entry.hash, entry.ident
        );
        if abort_on_unknown {
            return Err(CliError::Usage("aborting on unknown file type".into()));
        }
    }

    Ok(())
}

fn extract_palette(entry: &Entry, output: &Path) -> Result<bool, CliError> {
    if entry.ident != Ident::PALETTE
        || entry.bytes.len() != 768
        || palette_number_from_id(entry.id).is_none()
    {
        return Ok(false);
    }

    let folder = output.join("palettes");
    fs::create_dir_all(&folder)?;
    fs::write(folder.join(format!("{:08X}.rawpal", entry.id)), &entry.bytes)?;
    Ok(true)
}

fn extract_texture(entry: &Entry, palettes: &PaletteCache, output: &Path) -> Result<bool, CliError> {
    let Some(texture_palette) = entry.ident.as_texture() else {
        return Ok(false);
    };

    let palette = match texture_palette {
        TexturePalette::Unpaletted => None,
        TexturePalette::Palette(number) => match palettes.get(number) {
            Some(palette) => Some(palette),
            None => {
                println!("Texture id {:08X} has an unknown palette.", entry.id);
                return Ok(false);
            }
        },
    };

    let texture = match Texture::parse(&entry.bytes, palette) {
        Ok(texture) => texture,
        Err(err) => {
            eprintln!("Error decoding image with id {:08X}: {err}", entry.id);
            return Ok(true);
        }
    };

    let mut sink = ImageSink::default();
    if let Err(err) = texture.decode(0, &mut sink) {
        eprintln!("Error decoding image with id {:08X}: {err}", entry.id);
        return Ok(true);
    }

    if let Some(image) = sink.into_image() {
        let folder = output.join("textures");
        fs::create_dir_all(&folder)?;
        image.save(folder.join(format!("{:08X}.png", entry.id)))?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skout_bit_archive::{write_archive, CompressionKind};
    use std::io::Cursor;

    fn entry(id: u32, ident: Ident, bytes: Vec<u8>) -> Entry {
        Entry {
            id,
            hash: 0,
            ident,
            compression: CompressionKind::Rle,
            uncompressed_prefix: 0,
            bytes,
        }
    }

    /// A grayscale ramp palette blob.
    fn palette_blob() -> Vec<u8> {
        let mut bytes = Vec::with_capacity(768);
        for i in 0..=255u8 {
            bytes.extend_from_slice(&[i, i, i]);
        }
        bytes
    }

    /// A 2x2 single-mip indexed texture blob.
    fn indexed_texture_blob() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u16.to_le_bytes()); // width
        bytes.extend_from_slice(&2u16.to_le_bytes()); // height
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mip count
        bytes.extend_from_slice(&0u16.to_le_bytes()); // data1
        bytes.extend_from_slice(&0u16.to_le_bytes()); // data2
        bytes.extend_from_slice(&14u32.to_le_bytes()); // mip 0 offset
        bytes.extend_from_slice(&[0, 64, 128, 255]);
        bytes
    }

    fn test_archive() -> Archive {
        let mut archive = Archive::new(258);
        archive
            .entries
            .push(entry(0xFFFF0400, Ident::PALETTE, palette_blob()));
        archive.entries.push(entry(
            0x00000010,
            Ident([0x04, 0x0C, 0x00]),
            indexed_texture_blob(),
        ));
        archive
    }

    fn write_to_disk(archive: &Archive, path: &Path) {
        let mut cursor = Cursor::new(Vec::new());
        write_archive(archive, &mut cursor).unwrap();
        fs::write(path, cursor.into_inner()).unwrap();
    }

    #[test]
    fn raw_extract_dumps_entries_by_ident() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.bit");
        write_to_disk(&test_archive(), &input);

        let cmd = ExtractCmd {
            input_file: input,
            output_directory: Some(dir.path().join("out")),
            raw: true,
            abort_on_unknown: false,
        };
        handle_extract_command(&cmd).unwrap();

        let palette = dir.path().join("out/01-00-FF/FFFF0400.bin");
        assert_eq!(fs::read(palette).unwrap(), palette_blob());
        let texture = dir.path().join("out/04-0C-00/00000010.bin");
        assert_eq!(fs::read(texture).unwrap(), indexed_texture_blob());
    }

    #[test]
    fn converted_extract_writes_rawpal_and_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.bit");
        write_to_disk(&test_archive(), &input);

        let cmd = ExtractCmd {
            input_file: input,
            output_directory: Some(dir.path().join("out")),
            raw: false,
            abort_on_unknown: true,
        };
        handle_extract_command(&cmd).unwrap();

        let palette = dir.path().join("out/palettes/FFFF0400.rawpal");
        assert_eq!(fs::read(palette).unwrap(), palette_blob());

        let png = image::open(dir.path().join("out/textures/00000010.png")).unwrap();
        let rgba = png.to_rgba8();
        assert_eq!(rgba.dimensions(), (2, 2));
        // Grayscale ramp palette: index 255 is white, fully opaque.
        assert_eq!(rgba.get_pixel(1, 1).0, [255, 255, 255, 255]);
        assert_eq!(rgba.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn refuses_existing_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.bit");
        write_to_disk(&test_archive(), &input);

        let cmd = ExtractCmd {
            input_file: input,
            output_directory: Some(dir.path().to_path_buf()),
            raw: true,
            abort_on_unknown: false,
        };
        let err = handle_extract_command(&cmd).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
