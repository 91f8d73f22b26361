//! 256-entry RGB palettes used by the indexed pixel formats.

/// Colors in a full palette.
pub const PALETTE_COLOR_COUNT: usize = 256;

/// Byte length of a raw palette blob: 256 R,G,B triplets.
pub const PALETTE_BYTE_LEN: usize = PALETTE_COLOR_COUNT * 3;

/// One palette color: 3 raw bytes, no stored alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaletteColor {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl PaletteColor {
    /// Packs this color and the given alpha into a 32-bit ARGB value.
    #[inline]
    pub fn to_argb(self, alpha: u8) -> u32 {
        (u32::from(alpha) << 24)
            | (u32::from(self.r) << 16)
            | (u32::from(self.g) << 8)
            | u32::from(self.b)
    }

    /// Packs this color fully opaque.
    #[inline]
    pub fn to_argb_opaque(self) -> u32 {
        self.to_argb(u8::MAX)
    }
}

/// Decodes a raw 768-byte palette blob into its 256 colors.
pub fn read_palette(bytes: &[u8; PALETTE_BYTE_LEN]) -> [PaletteColor; PALETTE_COLOR_COUNT] {
    let mut colors = [PaletteColor::default(); PALETTE_COLOR_COUNT];
    for (color, rgb) in colors.iter_mut().zip(bytes.chunks_exact(3)) {
        *color = PaletteColor {
            r: rgb[0],
            g: rgb[1],
            b: rgb[2],
        };
    }
    colors
}

/// Extracts the palette number from a palette entry's id.
///
/// Palette blobs carry ids of the form `0xFFFF04nn`; `nn` is the palette
/// number that texture idents refer to. Other ids return [`None`].
#[inline]
pub fn palette_number_from_id(id: u32) -> Option<u8> {
    const PAL_ID_BASE: u32 = 0xFFFF_0400;
    const PAL_ID_MASK: u32 = 0xFFFF_FF00;

    if id & PAL_ID_MASK != PAL_ID_BASE {
        return None;
    }

    Some((id & !PAL_ID_MASK) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_palette_triplets_in_order() {
        let mut bytes = [0u8; PALETTE_BYTE_LEN];
        bytes[0..3].copy_from_slice(&[10, 20, 30]);
        bytes[765..768].copy_from_slice(&[1, 2, 3]);

        let palette = read_palette(&bytes);
        assert_eq!(palette[0], PaletteColor { r: 10, g: 20, b: 30 });
        assert_eq!(palette[255], PaletteColor { r: 1, g: 2, b: 3 });
    }

    #[test]
    fn argb_packing() {
        let color = PaletteColor {
            r: 0x12,
            g: 0x34,
            b: 0x56,
        };
        assert_eq!(color.to_argb_opaque(), 0xFF123456);
        assert_eq!(color.to_argb(0x80), 0x80123456);
        assert_eq!(color.to_argb(0), 0x00123456);
    }

    #[test]
    fn palette_ids_carry_their_number() {
        assert_eq!(palette_number_from_id(0xFFFF0400), Some(0));
        assert_eq!(palette_number_from_id(0xFFFF04FE), Some(0xFE));
        assert_eq!(palette_number_from_id(0xFFFF0500), None);
        assert_eq!(palette_number_from_id(0x0000_0001), None);
    }
}
