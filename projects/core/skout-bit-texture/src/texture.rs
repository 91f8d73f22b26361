//! Texture blob parsing and pixel decoding.

use crate::palette::{PaletteColor, PALETTE_COLOR_COUNT};
use thiserror::Error;

/// Fixed texture header: width, height, mip count, data1, data2.
const HEADER_LEN: usize = 10;

/// Length of one mip offset table slot.
const MIP_OFFSET_LEN: usize = 4;

/// Pixel encoding of a texture, resolved from palette presence and the two
/// header discriminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// 1 byte per pixel: palette index, always opaque.
    Indexed,
    /// 1 byte per pixel: palette index; index 0 is fully transparent.
    IndexedId0Trans,
    /// 2 bytes per pixel: palette index + alpha byte.
    IndexedAlpha,
    /// 2 bytes per pixel: 1-bit alpha, 5-bit channels.
    Argb1555,
    /// 2 bytes per pixel: 4-bit channels.
    Argb4444,
    /// 4 bytes per pixel: raw little-endian ARGB.
    Argb8888,
}

impl Kind {
    /// Bytes per raw pixel for this encoding.
    pub fn raw_pixel_size(self) -> usize {
        match self {
            Kind::Indexed | Kind::IndexedId0Trans => 1,
            Kind::IndexedAlpha | Kind::Argb1555 | Kind::Argb4444 => 2,
            Kind::Argb8888 => 4,
        }
    }

    fn resolve(paletted: bool, data1: u16, data2: u16) -> Option<Self> {
        match (paletted, data1, data2) {
            (true, 0, 0) => Some(Kind::Indexed),
            (true, 1, 0) => Some(Kind::IndexedId0Trans),
            (true, 2, 0) => Some(Kind::IndexedAlpha),
            (false, 0, 2) => Some(Kind::Argb1555),
            (false, 0, 4) => Some(Kind::Argb4444),
            (false, 0, 8) => Some(Kind::Argb8888),
            _ => None,
        }
    }
}

/// Errors raised while parsing or decoding a texture blob.
///
/// Everything here is detected eagerly by [`Texture::parse`] except
/// [`TextureError::MipLevelOutOfRange`], which guards the decode call's
/// level argument.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TextureError {
    /// The blob is shorter than its fixed header plus mip offset table.
    #[error("texture blob of {len} bytes is too short")]
    TooShort {
        /// Blob length.
        len: usize,
    },

    /// Width, height, or mip count is zero.
    #[error("invalid texture dimensions {width}x{height} with {mip_count} mips")]
    BadDimensions {
        /// Declared width.
        width: u16,
        /// Declared height.
        height: u16,
        /// Declared mip count.
        mip_count: u16,
    },

    /// The discriminators do not name a known pixel encoding.
    #[error("unknown pixel format: data1={data1}, data2={data2}, paletted={paletted}")]
    UnknownPixelFormat {
        /// The header's first discriminator.
        data1: u16,
        /// The header's second discriminator.
        data2: u16,
        /// Whether a palette was supplied.
        paletted: bool,
    },

    /// Repeated halving drove a mip dimension to zero before the last level.
    #[error("mip level {level} has a zero dimension")]
    ZeroMipDimension {
        /// The offending mip level.
        level: usize,
    },

    /// A mip's pixel region extends past the end of the blob.
    #[error("mip level {level} extends past the end of the texture blob")]
    MipRegionOutOfBounds {
        /// The offending mip level.
        level: usize,
    },

    /// The requested decode level does not exist.
    #[error("mip level {level} requested, texture has {mip_count}")]
    MipLevelOutOfRange {
        /// The requested level.
        level: usize,
        /// Levels the texture actually has.
        mip_count: u16,
    },
}

/// Receiver for decoded pixels.
///
/// For one decode call the contract is: [`begin`](Self::begin) once before
/// any pixel, [`set_pixel`](Self::set_pixel) once per pixel in row-major
/// order, [`end`](Self::end) once afterwards. Sinks may allocate their
/// backing eagerly or lazily inside `begin`.
pub trait PixelSink {
    /// Announces the decode target's dimensions and pixel encoding.
    fn begin(&mut self, width: u32, height: u32, kind: Kind);

    /// Delivers one pixel as a packed 32-bit ARGB value.
    fn set_pixel(&mut self, x: u32, y: u32, argb: u32);

    /// Marks the end of the decode.
    fn end(&mut self);
}

/// A validated, read-only view over a texture blob.
///
/// Borrows the blob and the optional palette; construction validates every
/// mip level's bounds so decoding cannot fail on the pixel data.
#[derive(Debug, Clone, Copy)]
pub struct Texture<'a> {
    width: u16,
    height: u16,
    mip_count: u16,
    kind: Kind,
    bytes: &'a [u8],
    palette: Option<&'a [PaletteColor; PALETTE_COLOR_COUNT]>,
}

impl<'a> Texture<'a> {
    /// Parses and validates a texture blob.
    ///
    /// `palette` must be supplied for indexed encodings and omitted for
    /// direct-color ones; the combination picks the [`Kind`] and anything
    /// unresolvable fails with [`TextureError::UnknownPixelFormat`].
    ///
    /// Every mip level's offset and pixel region is bounds-checked here,
    /// including the floor-halved level dimensions (a dimension that halves
    /// to zero is rejected; the format provides no clamping rule).
    pub fn parse(
        bytes: &'a [u8],
        palette: Option<&'a [PaletteColor; PALETTE_COLOR_COUNT]>,
    ) -> Result<Self, TextureError> {
        let header = bytes
            .get(..HEADER_LEN)
            .ok_or(TextureError::TooShort { len: bytes.len() })?;

        let width = u16::from_le_bytes([header[0], header[1]]);
        let height = u16::from_le_bytes([header[2], header[3]]);
        let mip_count = u16::from_le_bytes([header[4], header[5]]);
        let data1 = u16::from_le_bytes([header[6], header[7]]);
        let data2 = u16::from_le_bytes([header[8], header[9]]);

        if width < 1 || height < 1 || mip_count < 1 {
            return Err(TextureError::BadDimensions {
                width,
                height,
                mip_count,
            });
        }

        let table_end = HEADER_LEN + usize::from(mip_count) * MIP_OFFSET_LEN;
        if bytes.len() < table_end {
            return Err(TextureError::TooShort { len: bytes.len() });
        }

        let kind = Kind::resolve(palette.is_some(), data1, data2).ok_or(
            TextureError::UnknownPixelFormat {
                data1,
                data2,
                paletted: palette.is_some(),
            },
        )?;

        let tex = Self {
            width,
            height,
            mip_count,
            kind,
            bytes,
            palette,
        };

        for level in 0..usize::from(mip_count) {
            let (w, h) = tex.mip_size_unchecked(level);
            if w == 0 || h == 0 {
                return Err(TextureError::ZeroMipDimension { level });
            }

            let len = w as usize * h as usize * kind.raw_pixel_size();
            let offset = tex.mip_offset(level) as usize;
            match offset.checked_add(len) {
                Some(end) if end <= bytes.len() => {}
                _ => return Err(TextureError::MipRegionOutOfBounds { level }),
            }
        }

        Ok(tex)
    }

    /// Declared width of mip 0.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Declared height of mip 0.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Number of mip levels.
    pub fn mip_count(&self) -> u16 {
        self.mip_count
    }

    /// Resolved pixel encoding.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Dimensions of a mip level: each level floor-halves both axes.
    pub fn mip_size(&self, level: usize) -> Result<(u32, u32), TextureError> {
        if level >= usize::from(self.mip_count) {
            return Err(TextureError::MipLevelOutOfRange {
                level,
                mip_count: self.mip_count,
            });
        }
        Ok(self.mip_size_unchecked(level))
    }

    fn mip_size_unchecked(&self, level: usize) -> (u32, u32) {
        (
            u32::from(self.width) >> level,
            u32::from(self.height) >> level,
        )
    }

    fn mip_offset(&self, level: usize) -> u32 {
        let start = HEADER_LEN + level * MIP_OFFSET_LEN;
        u32::from_le_bytes([
            self.bytes[start],
            self.bytes[start + 1],
            self.bytes[start + 2],
            self.bytes[start + 3],
        ])
    }

    /// Decodes one mip level into `sink`, row-major.
    ///
    /// `sink.end()` is called even if delivery stops early; with the bounds
    /// checked at parse time, pixel production itself cannot fail.
    pub fn decode<S: PixelSink>(&self, mip_level: usize, sink: &mut S) -> Result<(), TextureError> {
        let (width, height) = self.mip_size(mip_level)?;

        let pixel_size = self.kind.raw_pixel_size();
        let offset = self.mip_offset(mip_level) as usize;
        let mip = &self.bytes[offset..offset + width as usize * height as usize * pixel_size];

        sink.begin(width, height, self.kind);
        for y in 0..height {
            let row_start = y as usize * width as usize * pixel_size;
            for x in 0..width {
                let raw = &mip[row_start + x as usize * pixel_size..];
                sink.set_pixel(x, y, self.decode_pixel(raw));
            }
        }
        sink.end();

        Ok(())
    }

    #[inline]
    fn decode_pixel(&self, raw: &[u8]) -> u32 {
        match (self.kind, self.palette) {
            (Kind::Indexed, Some(pal)) => pal[usize::from(raw[0])].to_argb_opaque(),
            (Kind::IndexedAlpha, Some(pal)) => pal[usize::from(raw[0])].to_argb(raw[1]),
            (Kind::IndexedId0Trans, Some(pal)) => {
                let alpha = if raw[0] != 0 { u8::MAX } else { 0 };
                pal[usize::from(raw[0])].to_argb(alpha)
            }
            (Kind::Argb1555, _) => decode_argb1555(u16::from_le_bytes([raw[0], raw[1]])),
            (Kind::Argb4444, _) => decode_argb4444(u16::from_le_bytes([raw[0], raw[1]])),
            (Kind::Argb8888, _) => u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]),
            // Indexed kinds only resolve when a palette is present.
            (_, None) => unreachable!("indexed kind without a palette"),
        }
    }
}

/// Expands a 5-bit channel to 8 bits, `round(v / 31 * 255)`.
#[inline]
fn expand5(v: u16) -> u32 {
    (u32::from(v) * 255 + 15) / 31
}

/// Expands a 4-bit channel to 8 bits; `round(v / 15 * 255)` is exactly
/// `v * 17`.
#[inline]
fn expand4(v: u16) -> u32 {
    u32::from(v) * 17
}

fn decode_argb1555(pixel: u16) -> u32 {
    let alpha = if pixel & 0x8000 != 0 { 0xFF00_0000 } else { 0 };
    alpha
        | (expand5((pixel & 0x7C00) >> 10) << 16)
        | (expand5((pixel & 0x03E0) >> 5) << 8)
        | expand5(pixel & 0x001F)
}

fn decode_argb4444(pixel: u16) -> u32 {
    (expand4((pixel & 0xF000) >> 12) << 24)
        | (expand4((pixel & 0x0F00) >> 8) << 16)
        | (expand4((pixel & 0x00F0) >> 4) << 8)
        | expand4(pixel & 0x000F)
}
