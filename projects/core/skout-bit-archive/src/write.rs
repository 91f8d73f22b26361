//! BIT archive serializer.
//!
//! Writing is a single sequential pass: header, a reserved directory region,
//! then each entry in order (its offset is wherever the stream happens to be),
//! finished by seeking back and patching the directory with the measured
//! on-disk lengths.

use crate::codec;
use crate::format::{
    Archive, CmpHeader, DirectoryRecord, Entry, DIRECTORY_RECORD_LEN, HEADER_LEN, MAGIC,
};
use std::io::{Seek, SeekFrom, Write};
use std::vec::Vec;
use thiserror::Error;

/// Errors that can occur while writing a BIT archive.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The underlying stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An entry's uncompressed prefix is longer than its payload.
    #[error("entry {id:08X}: uncompressed prefix of {prefix} bytes exceeds the {len}-byte payload")]
    PrefixExceedsPayload {
        /// The offending entry's id.
        id: u32,
        /// Declared uncompressed prefix length.
        prefix: usize,
        /// Payload length.
        len: usize,
    },

    /// The archive does not fit in the container's 32-bit offsets.
    #[error("archive exceeds the container's 32-bit offset range")]
    ArchiveTooLarge,
}

/// Serializes an archive to a seekable stream.
///
/// Entries are written in order; each entry's directory offset is the stream
/// position where its compression header lands, so reordering
/// [`Archive::entries`] reorders the file but changes no entry's content.
pub fn write_archive<W: Write + Seek>(archive: &Archive, out: &mut W) -> Result<(), WriteError> {
    out.write_all(&MAGIC)?;
    out.write_all(&archive.revision.to_le_bytes())?;
    let entry_count =
        u32::try_from(archive.entries.len()).map_err(|_| WriteError::ArchiveTooLarge)?;
    out.write_all(&entry_count.to_le_bytes())?;

    // Reserve the directory; it is back-patched once every offset and
    // on-disk length is known.
    let directory_start = HEADER_LEN as u64;
    let zeroes = [0u8; DIRECTORY_RECORD_LEN];
    for _ in &archive.entries {
        out.write_all(&zeroes)?;
    }

    let mut records = Vec::with_capacity(archive.entries.len());
    for entry in &archive.entries {
        records.push(write_entry(entry, out)?);
    }

    out.seek(SeekFrom::Start(directory_start))?;
    for record in records {
        out.write_all(&record.to_bytes())?;
    }
    out.flush()?;

    Ok(())
}

fn write_entry<W: Write + Seek>(entry: &Entry, out: &mut W) -> Result<DirectoryRecord, WriteError> {
    let prefix = usize::from(entry.uncompressed_prefix);
    let (head, tail) = entry
        .bytes
        .split_at_checked(prefix)
        .ok_or(WriteError::PrefixExceedsPayload {
            id: entry.id,
            prefix,
            len: entry.bytes.len(),
        })?;

    let offset = position_u32(out)?;

    let header = CmpHeader {
        mode: entry.compression as u8,
        file_type: entry.ident.file_type(),
        ident: [entry.ident.0[1], entry.ident.0[2]],
        length: u32::try_from(entry.bytes.len()).map_err(|_| WriteError::ArchiveTooLarge)?,
        uncompressed_prefix: entry.uncompressed_prefix,
    };
    out.write_all(&header.to_bytes())?;

    out.write_all(head)?;
    out.write_all(&codec::compress(entry.compression, tail))?;

    let end = position_u32(out)?;
    Ok(DirectoryRecord {
        id: entry.id,
        offset,
        length: end - offset,
        hash: entry.hash,
        file_type: entry.ident.file_type(),
    })
}

fn position_u32<W: Seek>(out: &mut W) -> Result<u32, WriteError> {
    u32::try_from(out.stream_position()?).map_err(|_| WriteError::ArchiveTooLarge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{CompressionKind, Ident};
    use crate::read::read_archive;
    use rstest::rstest;
    use std::io::Cursor;
    use std::vec;

    fn entry(id: u32, ident: Ident, kind: CompressionKind, prefix: u16, bytes: Vec<u8>) -> Entry {
        Entry {
            id,
            hash: id ^ 0xA5A5_A5A5,
            ident,
            compression: kind,
            uncompressed_prefix: prefix,
            bytes,
        }
    }

    #[test]
    fn roundtrips_mixed_compression_kinds() {
        let mut archive = Archive::new(258);
        archive.entries.push(entry(
            0xFFFF0400,
            Ident::PALETTE,
            CompressionKind::Copy,
            0,
            vec![0x11; 768],
        ));
        archive.entries.push(entry(
            0x0000_0001,
            Ident([0x04, 0x0C, 0x00]),
            CompressionKind::Rle,
            4,
            {
                let mut v = vec![1, 2, 3, 4];
                v.extend_from_slice(&[0u8; 300]);
                v.extend_from_slice(b"trailing pixels");
                v
            },
        ));
        archive.entries.push(entry(
            0x0000_0002,
            Ident([0x04, 0x0C, 0xFF]),
            CompressionKind::LzRle,
            0,
            (0..=255u8).cycle().take(1024).collect(),
        ));

        let mut cursor = Cursor::new(Vec::new());
        write_archive(&archive, &mut cursor).unwrap();

        // Whole-archive comparison: every entry field must survive.
        assert_eq!(read_archive(cursor.get_ref()), Ok(archive));
    }

    #[rstest]
    #[case(CompressionKind::Copy)]
    #[case(CompressionKind::Rle)]
    #[case(CompressionKind::LzRle)]
    fn roundtrips_empty_payload(#[case] kind: CompressionKind) {
        let mut archive = Archive::new(1);
        archive
            .entries
            .push(entry(7, Ident([0x02, 0x00, 0x00]), kind, 0, Vec::new()));

        let mut cursor = Cursor::new(Vec::new());
        write_archive(&archive, &mut cursor).unwrap();
        let reread = read_archive(cursor.get_ref()).unwrap();
        assert!(reread.entries[0].bytes.is_empty());
    }

    #[test]
    fn roundtrips_empty_archive() {
        let mut cursor = Cursor::new(Vec::new());
        write_archive(&Archive::new(42), &mut cursor).unwrap();
        let reread = read_archive(cursor.get_ref()).unwrap();
        assert_eq!(reread.revision, 42);
        assert!(reread.entries.is_empty());
    }

    #[test]
    fn rejects_prefix_longer_than_payload() {
        let mut archive = Archive::new(1);
        archive.entries.push(entry(
            1,
            Ident::PALETTE,
            CompressionKind::Copy,
            10,
            vec![0; 4],
        ));

        let mut cursor = Cursor::new(Vec::new());
        let err = write_archive(&archive, &mut cursor).unwrap_err();
        assert!(matches!(
            err,
            WriteError::PrefixExceedsPayload {
                id: 1,
                prefix: 10,
                len: 4
            }
        ));
    }

    #[test]
    fn directory_records_on_disk_lengths() {
        let payload = vec![0xABu8; 512]; // compresses well under RLE
        let mut archive = Archive::new(1);
        archive.entries.push(entry(
            1,
            Ident::PALETTE,
            CompressionKind::Rle,
            0,
            payload,
        ));

        let mut cursor = Cursor::new(Vec::new());
        write_archive(&archive, &mut cursor).unwrap();
        let bytes = cursor.into_inner();

        let dir = HEADER_LEN;
        let offset =
            u32::from_le_bytes([bytes[dir + 4], bytes[dir + 5], bytes[dir + 6], bytes[dir + 7]]);
        let length =
            u32::from_le_bytes([bytes[dir + 8], bytes[dir + 9], bytes[dir + 10], bytes[dir + 11]]);
        assert_eq!(offset as usize, HEADER_LEN + DIRECTORY_RECORD_LEN);
        assert_eq!(offset as usize + length as usize, bytes.len());
        // 512 identical bytes: 4 run ops under the 130 cap, plus the header.
        assert_eq!(length as usize, crate::format::CMP_HEADER_LEN + 8);
    }
}
