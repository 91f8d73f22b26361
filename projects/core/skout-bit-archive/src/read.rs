//! Whole-buffer BIT archive reader.

use crate::codec;
use crate::error::ReadError;
use crate::format::{
    Archive, CmpHeader, CompressionKind, DirectoryRecord, Entry, Ident, CMP_HEADER_LEN,
    DIRECTORY_RECORD_LEN, HEADER_LEN, MAGIC,
};
use alloc::vec::Vec;

/// Parses a complete BIT archive from an in-memory buffer.
///
/// The buffer must hold the entire archive; every entry's payload is
/// decompressed eagerly into its own allocation, so the returned [`Archive`]
/// does not borrow `input`.
///
/// # Errors
///
/// - [`ReadError::InvalidMagic`] when the first 4 bytes are not `b"BITP"`,
///   carrying the observed bytes
/// - [`ReadError::UnsupportedCompression`] when an entry's mode byte is
///   outside `{0, 1, 2}`
/// - [`ReadError::MalformedFile`] for any other structural inconsistency
pub fn read_archive(input: &[u8]) -> Result<Archive, ReadError> {
    let magic: &[u8; 4] = input
        .get(..4)
        .and_then(|m| m.try_into().ok())
        .ok_or(ReadError::MalformedFile)?;
    if *magic != MAGIC {
        return Err(ReadError::InvalidMagic(*magic));
    }

    let header: &[u8; HEADER_LEN] = input
        .get(..HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or(ReadError::MalformedFile)?;

    let revision = u16::from_le_bytes([header[4], header[5]]);
    let entry_count = u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;

    let directory_len = entry_count
        .checked_mul(DIRECTORY_RECORD_LEN)
        .ok_or(ReadError::MalformedFile)?;
    let directory = input
        .get(HEADER_LEN..HEADER_LEN + directory_len)
        .ok_or(ReadError::MalformedFile)?;

    let mut entries = Vec::with_capacity(entry_count);
    for record_bytes in directory.chunks_exact(DIRECTORY_RECORD_LEN) {
        let record = DirectoryRecord::parse(record_bytes.try_into().unwrap());
        entries.push(read_entry(input, record)?);
    }

    Ok(Archive { revision, entries })
}

fn read_entry(input: &[u8], record: DirectoryRecord) -> Result<Entry, ReadError> {
    let offset = record.offset as usize;
    if offset >= input.len() {
        return Err(ReadError::MalformedFile);
    }

    let header_bytes: &[u8; CMP_HEADER_LEN] = input
        .get(offset..offset + CMP_HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or(ReadError::MalformedFile)?;
    let header = CmpHeader::parse(header_bytes);

    if u32::from(header.uncompressed_prefix) > header.length {
        return Err(ReadError::MalformedFile);
    }
    if header.file_type != record.file_type {
        return Err(ReadError::MalformedFile);
    }

    let kind = CompressionKind::from_u8(header.mode)
        .ok_or(ReadError::UnsupportedCompression(header.mode))?;

    let stream = &input[offset + CMP_HEADER_LEN..];
    let bytes = codec::decompress(
        kind,
        stream,
        header.length as usize,
        header.uncompressed_prefix as usize,
    )
    .map_err(|_| ReadError::MalformedFile)?;

    Ok(Entry {
        id: record.id,
        hash: record.hash,
        ident: Ident([header.file_type, header.ident[0], header.ident[1]]),
        compression: kind,
        uncompressed_prefix: header.uncompressed_prefix,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    /// Builds a minimal single-entry archive by hand.
    fn single_entry_archive(mode: u8, payload: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&258u16.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());

        let offset = (HEADER_LEN + DIRECTORY_RECORD_LEN) as u32;
        out.extend_from_slice(&0xFFFF0400u32.to_le_bytes()); // id
        out.extend_from_slice(&offset.to_le_bytes());
        let disk_len = (CMP_HEADER_LEN + payload.len()) as u32;
        out.extend_from_slice(&disk_len.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes()); // hash
        out.push(0x01); // file type

        out.push(mode);
        out.push(0x01); // file type, redundant copy
        out.extend_from_slice(&[0x00, 0xFF]); // ident tail
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // no uncompressed prefix
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn reads_a_copy_compressed_palette_entry() {
        let payload = vec![0x5A; 768];
        let archive = read_archive(&single_entry_archive(0, &payload)).unwrap();

        assert_eq!(archive.revision, 258);
        assert_eq!(archive.entries.len(), 1);

        let entry = &archive.entries[0];
        assert_eq!(entry.ident, Ident::PALETTE);
        assert_eq!(entry.compression, CompressionKind::Copy);
        assert_eq!(entry.bytes, payload);
    }

    #[test]
    fn rejects_bad_magic_with_observed_bytes() {
        let mut bytes = single_entry_archive(0, &[0; 4]);
        bytes[..4].copy_from_slice(b"BITX");
        assert_eq!(
            read_archive(&bytes),
            Err(ReadError::InvalidMagic(*b"BITX"))
        );
    }

    #[test]
    fn rejects_truncated_header() {
        assert_eq!(read_archive(b"BIT"), Err(ReadError::MalformedFile));
        assert_eq!(read_archive(b"BITP\x00\x01"), Err(ReadError::MalformedFile));
    }

    #[test]
    fn substituted_magic_wins_over_truncation() {
        assert_eq!(
            read_archive(b"PAKv\x01"),
            Err(ReadError::InvalidMagic(*b"PAKv"))
        );
    }

    #[test]
    fn rejects_out_of_range_entry_offset() {
        let mut bytes = single_entry_archive(0, &[1, 2, 3]);
        let len = bytes.len() as u32;
        bytes[14..18].copy_from_slice(&len.to_le_bytes());
        assert_eq!(read_archive(&bytes), Err(ReadError::MalformedFile));
    }

    #[test]
    fn rejects_unknown_compression_mode() {
        let bytes = single_entry_archive(7, &[1, 2, 3]);
        assert_eq!(read_archive(&bytes), Err(ReadError::UnsupportedCompression(7)));
    }

    #[test]
    fn rejects_file_type_mismatch() {
        let mut bytes = single_entry_archive(0, &[1, 2, 3]);
        let cmp_header = HEADER_LEN + DIRECTORY_RECORD_LEN;
        bytes[cmp_header + 1] = 0x02; // directory still says 0x01
        assert_eq!(read_archive(&bytes), Err(ReadError::MalformedFile));
    }

    #[test]
    fn rejects_prefix_longer_than_length() {
        let mut bytes = single_entry_archive(0, &[1, 2, 3]);
        let cmp_header = HEADER_LEN + DIRECTORY_RECORD_LEN;
        bytes[cmp_header + 8..cmp_header + 10].copy_from_slice(&100u16.to_le_bytes());
        assert_eq!(read_archive(&bytes), Err(ReadError::MalformedFile));
    }

    #[test]
    fn rejects_overrunning_instruction_stream() {
        // RLE run of 10 declared into a 4-byte payload.
        let mut bytes = single_entry_archive(1, &[0x7D + 10, 9]);
        let cmp_header = HEADER_LEN + DIRECTORY_RECORD_LEN;
        bytes[cmp_header + 4..cmp_header + 8].copy_from_slice(&4u32.to_le_bytes());
        assert_eq!(read_archive(&bytes), Err(ReadError::MalformedFile));
    }
}
