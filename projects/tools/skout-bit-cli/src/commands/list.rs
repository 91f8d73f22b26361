//! `list`: print an archive's directory, optionally with blob classification.

use crate::commands::read_input_file;
use crate::error::CliError;
use crate::palettes::PaletteCache;
use argh::FromArgs;
use skout_bit_archive::{read_archive, Entry, Ident, TexturePalette};
use skout_bit_texture::{palette_number_from_id, Kind, Texture};
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// List the contents of a BIT archive
#[argh(subcommand, name = "list")]
pub struct ListCmd {
    /// the BIT archive to list
    #[argh(positional)]
    pub input_file: PathBuf,

    /// print detailed info about the files in the archive
    #[argh(switch, short = 'i')]
    pub file_info: bool,
}

pub fn handle_list_command(cmd: &ListCmd) -> Result<(), CliError> {
    let bytes = read_input_file(&cmd.input_file)?;
    let archive = read_archive(&bytes)?;

    println!("Revision: {}", archive.revision);
    println!("Entries count: {}", archive.entries.len());

    let palettes = cmd.file_info.then(|| PaletteCache::harvest(&archive));
    for entry in &archive.entries {
        print!(
            "Id {:08X} | Hash {:08X} | File type {}",
            entry.id, entry.hash, entry.ident
        );
        if let Some(palettes) = &palettes {
            print_entry_info(entry, palettes);
        }
        println!();
    }

    Ok(())
}

fn print_entry_info(entry: &Entry, palettes: &PaletteCache) {
    if let Some(texture_palette) = entry.ident.as_texture() {
        print_texture_info(entry, texture_palette, palettes);
    } else if entry.ident == Ident::PALETTE {
        match palette_number_from_id(entry.id) {
            Some(number) => print!(" (Palette #{number:02X})"),
            None => print!(" (Unrecognized file type)"),
        }
    } else {
        print!(" (Unrecognized file type)");
    }
}

fn print_texture_info(entry: &Entry, texture_palette: TexturePalette, palettes: &PaletteCache) {
    let palette = match texture_palette {
        TexturePalette::Unpaletted => None,
        TexturePalette::Palette(number) => match palettes.get(number) {
            Some(palette) => Some(palette),
            None => {
                print!(" [Error: unknown palette #{number:02X}]");
                return;
            }
        },
    };

    match Texture::parse(&entry.bytes, palette) {
        Ok(texture) => {
            print!(" (Texture, ");
            match (texture.kind(), texture_palette) {
                (Kind::Indexed, TexturePalette::Palette(n)) => print!("Palette #{n:02X}"),
                (Kind::IndexedId0Trans, TexturePalette::Palette(n)) => {
                    print!("Palette #{n:02X} + Index 0 binary transparency")
                }
                (Kind::IndexedAlpha, TexturePalette::Palette(n)) => {
                    print!("Palette #{n:02X} + Alpha")
                }
                (Kind::Argb1555, _) => print!("16-bit (ARGB1555)"),
                (Kind::Argb4444, _) => print!("16-bit (ARGB4444)"),
                (Kind::Argb8888, _) => print!("32-bit (ARGB8888)"),
                _ => print!("[UNRECOGNIZED TEXTURE KIND]"),
            }
            print!(")");
        }
        Err(err) => print!(" [Error: {err}]"),
    }
}
