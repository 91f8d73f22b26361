//! The three BIT payload codecs: Copy, RLE, and LZRLE.
//!
//! A compressed entry stream is `uncompressed_prefix` raw bytes followed by
//! the codec's instruction stream. Decompression always produces exactly the
//! declared number of bytes, decoding op-by-op until the output is full.
//!
//! RLE control byte `c`:
//! - `c >= 0x80`: run of `c - 0x7D` (3..=130) copies of the next byte
//! - `c < 0x80`: `c + 1` (1..=128) literal bytes
//!
//! LZRLE control byte `c`:
//! - `0x80` and `0x40` set: run of `c - 0xBD` (3..=66)
//! - `0x80` set, `0x40` clear: back-reference of `c - 0x7C` (4..=67) bytes
//!   copied from `out_pos - distance` (LE u16 follows), byte by byte so an
//!   overlapping source self-replicates
//! - `0x80` clear: `c + 1` (1..=128) literal bytes
//!
//! The LZRLE *encoder* only ever emits run and literal ops. The reference
//! tool never implemented the back-reference emitter, and archives it wrote
//! are the compatibility target, so the asymmetry is kept: a forward-capable
//! decoder paired with a run/literal-only encoder.

use crate::error::CodecError;
use crate::format::CompressionKind;
use alloc::vec::Vec;

/// Shortest byte repeat worth emitting as a run op.
const RUN_MIN_LEN: usize = 3;

/// Longest literal op payload, for both codecs.
const LITERAL_MAX_LEN: usize = 128;

/// RLE run op: longest run and the control-byte base (`base + len`).
const RLE_RUN_MAX_LEN: usize = 130;
const RLE_RUN_OP_BASE: u8 = 0x7D;

/// LZRLE run op: longest run and the control-byte base.
const LZRLE_RUN_MAX_LEN: usize = 66;
const LZRLE_RUN_OP_BASE: u8 = 0xBD;

/// Decompresses an entry stream into exactly `length` bytes.
///
/// `input` must start at the entry's uncompressed prefix (just past the
/// compression header): `uncompressed_prefix` raw bytes, then the codec's
/// instruction stream.
///
/// # Errors
///
/// Any structural problem in the stream is a [`CodecError`]; no partial
/// output is returned.
pub fn decompress(
    kind: CompressionKind,
    input: &[u8],
    length: usize,
    uncompressed_prefix: usize,
) -> Result<Vec<u8>, CodecError> {
    if uncompressed_prefix > length {
        return Err(CodecError::PrefixExceedsLength {
            prefix: uncompressed_prefix,
            length,
        });
    }

    let prefix = input
        .get(..uncompressed_prefix)
        .ok_or(CodecError::TruncatedInput)?;
    let stream = &input[uncompressed_prefix..];

    let mut out = Vec::with_capacity(length);
    out.extend_from_slice(prefix);

    match kind {
        CompressionKind::Copy => decode_copy(stream, &mut out, length)?,
        CompressionKind::Rle => decode_rle(stream, &mut out, length)?,
        CompressionKind::LzRle => decode_lzrle(stream, &mut out, length)?,
    }

    Ok(out)
}

/// Compresses a payload tail (the bytes after the uncompressed prefix).
///
/// No framing is produced; the caller writes the compression header and the
/// prefix bytes itself.
pub fn compress(kind: CompressionKind, input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    match kind {
        CompressionKind::Copy => out.extend_from_slice(input),
        CompressionKind::Rle => encode_runs(input, &mut out, RLE_RUN_MAX_LEN, RLE_RUN_OP_BASE),
        CompressionKind::LzRle => {
            encode_runs(input, &mut out, LZRLE_RUN_MAX_LEN, LZRLE_RUN_OP_BASE)
        }
    }
    out
}

fn decode_copy(stream: &[u8], out: &mut Vec<u8>, length: usize) -> Result<(), CodecError> {
    let remaining = length - out.len();
    let bytes = stream.get(..remaining).ok_or(CodecError::TruncatedInput)?;
    out.extend_from_slice(bytes);
    Ok(())
}

fn decode_rle(stream: &[u8], out: &mut Vec<u8>, length: usize) -> Result<(), CodecError> {
    let mut pos = 0;
    while out.len() < length {
        let op = *stream.get(pos).ok_or(CodecError::TruncatedInput)?;

        if op >= 0x80 {
            let run_len = (op - 0x7D) as usize;
            let value = *stream.get(pos + 1).ok_or(CodecError::TruncatedInput)?;
            push_run(out, value, run_len, length)?;
            pos += 2;
        } else {
            let lit_len = op as usize + 1;
            let literals = stream
                .get(pos + 1..pos + 1 + lit_len)
                .ok_or(CodecError::TruncatedInput)?;
            push_literals(out, literals, length)?;
            pos += 1 + lit_len;
        }
    }
    Ok(())
}

fn decode_lzrle(stream: &[u8], out: &mut Vec<u8>, length: usize) -> Result<(), CodecError> {
    // Back-references address only the output this instruction stream has
    // produced, not the uncompressed prefix in front of it.
    let stream_out_start = out.len();

    let mut pos = 0;
    while out.len() < length {
        let op = *stream.get(pos).ok_or(CodecError::TruncatedInput)?;

        if op & 0x80 != 0 {
            if op & 0x40 != 0 {
                let run_len = (op - 0xBD) as usize;
                let value = *stream.get(pos + 1).ok_or(CodecError::TruncatedInput)?;
                push_run(out, value, run_len, length)?;
                pos += 2;
            } else {
                let count = (op - 0x7C) as usize;
                let distance = stream
                    .get(pos + 1..pos + 3)
                    .map(|d| u16::from_le_bytes([d[0], d[1]]) as usize)
                    .ok_or(CodecError::TruncatedInput)?;

                let produced = out.len() - stream_out_start;
                if distance == 0 || distance > produced {
                    return Err(CodecError::BackReferenceOutOfRange { distance, produced });
                }
                if count > length - out.len() {
                    return Err(CodecError::OutputOverrun {
                        requested: count,
                        remaining: length - out.len(),
                    });
                }

                // Byte-by-byte so a distance smaller than the count
                // replicates the freshly written bytes.
                let mut src = out.len() - distance;
                for _ in 0..count {
                    let byte = out[src];
                    out.push(byte);
                    src += 1;
                }
                pos += 3;
            }
        } else {
            let lit_len = op as usize + 1;
            let literals = stream
                .get(pos + 1..pos + 1 + lit_len)
                .ok_or(CodecError::TruncatedInput)?;
            push_literals(out, literals, length)?;
            pos += 1 + lit_len;
        }
    }
    Ok(())
}

fn push_run(out: &mut Vec<u8>, value: u8, run_len: usize, length: usize) -> Result<(), CodecError> {
    if run_len > length - out.len() {
        return Err(CodecError::OutputOverrun {
            requested: run_len,
            remaining: length - out.len(),
        });
    }
    out.resize(out.len() + run_len, value);
    Ok(())
}

fn push_literals(out: &mut Vec<u8>, literals: &[u8], length: usize) -> Result<(), CodecError> {
    if literals.len() > length - out.len() {
        return Err(CodecError::OutputOverrun {
            requested: literals.len(),
            remaining: length - out.len(),
        });
    }
    out.extend_from_slice(literals);
    Ok(())
}

/// Greedy scan for a run at the start of `window`.
///
/// Returns `(true, run_len)` when the window opens with a run of at least
/// `min_run_len` identical bytes, else `(false, literal_len)` where
/// `literal_len` extends up to the next qualifying run (or the window end).
fn find_run(window: &[u8], min_run_len: usize) -> (bool, usize) {
    debug_assert!(!window.is_empty());

    let mut repeat_start: isize = 0;
    let mut repeat_len = 1;
    let mut prev_byte = window[0];

    let mut i = 1;
    while i < window.len() {
        let b = window[i];

        if repeat_start >= 0 && b == prev_byte {
            repeat_len += 1;

            if repeat_start != 0 && repeat_len >= min_run_len {
                // A run starts inside the window; cut the literal just
                // before it.
                i = repeat_start as usize;
                break;
            }
        } else if b == prev_byte {
            repeat_start = i as isize - 1;
            repeat_len = 2;
        } else {
            if repeat_start == 0 && repeat_len >= min_run_len {
                break;
            }

            repeat_start = -1;
            repeat_len = 1;
        }

        prev_byte = b;
        i += 1;
    }

    if repeat_start == 0 && repeat_len >= min_run_len {
        (true, repeat_len)
    } else {
        (false, i)
    }
}

fn encode_runs(mut input: &[u8], out: &mut Vec<u8>, run_max_len: usize, run_op_base: u8) {
    let window_len = LITERAL_MAX_LEN.max(run_max_len);

    while !input.is_empty() {
        let window = &input[..input.len().min(window_len)];
        let (is_run, len) = find_run(window, RUN_MIN_LEN);

        let len = if is_run {
            let len = len.min(run_max_len);
            out.push(run_op_base + len as u8);
            out.push(input[0]);
            len
        } else {
            let len = len.min(LITERAL_MAX_LEN);
            out.push((len - 1) as u8);
            out.extend_from_slice(&input[..len]);
            len
        };

        input = &input[len..];
    }
}
