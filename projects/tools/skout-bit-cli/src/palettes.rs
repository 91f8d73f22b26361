//! Palette resolution for the archive currently being processed.
//!
//! Archives carry their own palettes as ordinary entries; any texture in the
//! same archive refers to them by number. The cache harvests those entries
//! up front so texture handling can resolve palettes without re-scanning.

use skout_bit_archive::{Archive, Ident};
use skout_bit_texture::palette::{
    palette_number_from_id, read_palette, PaletteColor, PALETTE_BYTE_LEN,
};
use skout_bit_texture::PALETTE_COLOR_COUNT;
use std::collections::HashMap;

/// Palettes collected from one archive, keyed by palette number.
#[derive(Debug, Default)]
pub struct PaletteCache {
    palettes: HashMap<u8, [PaletteColor; PALETTE_COLOR_COUNT]>,
}

impl PaletteCache {
    /// Collects every well-formed palette entry of the archive.
    ///
    /// Entries with the palette ident but a wrong payload size or an id that
    /// carries no palette number are skipped, not errors.
    pub fn harvest(archive: &Archive) -> Self {
        let mut cache = Self::default();

        for entry in &archive.entries {
            if entry.ident != Ident::PALETTE {
                continue;
            }
            let Ok(bytes) = <&[u8; PALETTE_BYTE_LEN]>::try_from(entry.bytes.as_slice()) else {
                continue;
            };
            let Some(number) = palette_number_from_id(entry.id) else {
                continue;
            };

            cache.palettes.insert(number, read_palette(bytes));
        }

        cache
    }

    /// Looks up a palette by number.
    pub fn get(&self, number: u8) -> Option<&[PaletteColor; PALETTE_COLOR_COUNT]> {
        self.palettes.get(&number)
    }
}
