//! On-disk layout of the BIT container and the in-memory archive model.
//!
//! All multi-byte fields are little-endian. The container is:
//!
//! | Offset | Field                          | Size |
//! |--------|--------------------------------|------|
//! | 0      | magic (`b"BITP"`)              | 4    |
//! | 4      | revision                       | 2    |
//! | 6      | entry count                    | 4    |
//! | 10     | directory (count × 17 bytes)   | var  |
//!
//! Each directory record points at a 10-byte per-entry compression header,
//! followed by that entry's uncompressed prefix and compressed stream.

use alloc::vec::Vec;
use core::fmt;

/// BIT archive header magic.
pub const MAGIC: [u8; 4] = *b"BITP";

/// Fixed archive header length: magic + revision + entry count.
pub const HEADER_LEN: usize = 10;

/// Length of one directory record: id + offset + length + hash + file type.
pub const DIRECTORY_RECORD_LEN: usize = 17;

/// Length of the per-entry compression header.
pub const CMP_HEADER_LEN: usize = 10;

/// Compression codec applied to an entry's payload tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionKind {
    /// Stored verbatim, no framing.
    Copy = 0,
    /// Run-length encoding: runs of 3..=130, literals of 1..=128.
    Rle = 1,
    /// RLE plus back-reference ops (runs 3..=66, back-refs 4..=67).
    LzRle = 2,
}

impl CompressionKind {
    /// Resolves a mode byte, or [`None`] for modes outside `{0, 1, 2}`.
    pub fn from_u8(mode: u8) -> Option<Self> {
        match mode {
            0 => Some(Self::Copy),
            1 => Some(Self::Rle),
            2 => Some(Self::LzRle),
            _ => None,
        }
    }
}

/// Palette association of a texture entry, derived from its ident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexturePalette {
    /// Direct-color texture (ARGB1555/4444/8888).
    Unpaletted,
    /// Indexed-color texture using the numbered palette.
    Palette(u8),
}

/// 3-byte blob type tag: file type, subtype, variant.
///
/// The first byte doubles as the directory record's file-type byte; the
/// container stores it redundantly in both the directory and the per-entry
/// compression header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident(pub [u8; 3]);

impl Ident {
    /// Ident of a 768-byte raw palette blob.
    pub const PALETTE: Ident = Ident([0x01, 0x00, 0xFF]);

    /// The file-type byte (stored in the directory record).
    #[inline]
    pub fn file_type(&self) -> u8 {
        self.0[0]
    }

    /// Classifies this ident as a texture.
    ///
    /// Texture idents are `(0x04, 0x0C, c)` where `c` selects the palette;
    /// `0xFF` marks a direct-color texture.
    pub fn as_texture(&self) -> Option<TexturePalette> {
        let Ident([a, b, c]) = *self;
        if a != 0x04 || b != 0x0C {
            return None;
        }

        Some(match c {
            0xFF => TexturePalette::Unpaletted,
            num => TexturePalette::Palette(num),
        })
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}-{:02X}-{:02X}", self.0[0], self.0[1], self.0[2])
    }
}

/// One archive record: directory metadata plus the decompressed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 32-bit entry id, unique within an archive by convention.
    pub id: u32,
    /// Content hash. Opaque; never recomputed or verified.
    pub hash: u32,
    /// 3-byte blob type tag.
    pub ident: Ident,
    /// Codec used for this entry's compressed tail.
    pub compression: CompressionKind,
    /// Count of leading payload bytes stored raw before the compressed tail.
    pub uncompressed_prefix: u16,
    /// The fully decompressed payload.
    pub bytes: Vec<u8>,
}

/// A parsed BIT archive: revision plus its entries.
///
/// Entry order determines on-disk offsets when writing; it carries no
/// meaning on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// 16-bit container revision, passed through unchanged.
    pub revision: u16,
    /// Entries in directory order.
    pub entries: Vec<Entry>,
}

impl Archive {
    /// Creates an empty archive with the given revision.
    pub fn new(revision: u16) -> Self {
        Self {
            revision,
            entries: Vec::new(),
        }
    }
}

/// Fixed-size directory record, as stored on disk.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DirectoryRecord {
    pub id: u32,
    pub offset: u32,
    pub length: u32,
    pub hash: u32,
    pub file_type: u8,
}

impl DirectoryRecord {
    pub(crate) fn parse(b: &[u8; DIRECTORY_RECORD_LEN]) -> Self {
        Self {
            id: u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            offset: u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
            length: u32::from_le_bytes([b[8], b[9], b[10], b[11]]),
            hash: u32::from_le_bytes([b[12], b[13], b[14], b[15]]),
            file_type: b[16],
        }
    }

    #[cfg(feature = "std")]
    pub(crate) fn to_bytes(self) -> [u8; DIRECTORY_RECORD_LEN] {
        let mut b = [0u8; DIRECTORY_RECORD_LEN];
        b[0..4].copy_from_slice(&self.id.to_le_bytes());
        b[4..8].copy_from_slice(&self.offset.to_le_bytes());
        b[8..12].copy_from_slice(&self.length.to_le_bytes());
        b[12..16].copy_from_slice(&self.hash.to_le_bytes());
        b[16] = self.file_type;
        b
    }
}

/// Per-entry compression header, as stored on disk at the record's offset.
///
/// `mode` is kept as the raw byte so the reader can distinguish an
/// unsupported mode from a malformed header.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CmpHeader {
    pub mode: u8,
    pub file_type: u8,
    pub ident: [u8; 2],
    pub length: u32,
    pub uncompressed_prefix: u16,
}

impl CmpHeader {
    pub(crate) fn parse(b: &[u8; CMP_HEADER_LEN]) -> Self {
        Self {
            mode: b[0],
            file_type: b[1],
            ident: [b[2], b[3]],
            length: u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
            uncompressed_prefix: u16::from_le_bytes([b[8], b[9]]),
        }
    }

    #[cfg(feature = "std")]
    pub(crate) fn to_bytes(self) -> [u8; CMP_HEADER_LEN] {
        let mut b = [0u8; CMP_HEADER_LEN];
        b[0] = self.mode;
        b[1] = self.file_type;
        b[2] = self.ident[0];
        b[3] = self.ident[1];
        b[4..8].copy_from_slice(&self.length.to_le_bytes());
        b[8..10].copy_from_slice(&self.uncompressed_prefix.to_le_bytes());
        b
    }
}
