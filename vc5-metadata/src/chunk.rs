// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The chunk envelope that carries a metadata tuple tree inside the VC-5 bitstream.
//!
//! Two tag encodings exist: a small chunk with a 16-bit tag and a length in 32-bit segments, and
//! a large chunk identified by an 8-bit `0x61` prefix with a 24-bit segment length.

use vc5_core::error::{syntax_error, Result};
use vc5_core::io::ByteStream;

/// The reserved small-chunk tag for metadata.
pub const SMALL_METADATA_CHUNK_TAG: u16 = 0x4010;
/// The reserved large-chunk tag prefix for metadata.
pub const LARGE_METADATA_CHUNK_PREFIX: u8 = 0x61;

/// Writes the metadata tuple tree's binary encoding, enveloped in a small chunk header, whose
/// length field is back-patched once the payload is known.
pub fn write_small_chunk<B: ByteStream>(stream: &mut B, payload: &[u8]) -> Result<()> {
    if payload.len() % 4 != 0 {
        return syntax_error("metadata chunk payload is not segment-aligned");
    }
    let length_in_segments = (payload.len() / 4) as u16;
    let header = ((SMALL_METADATA_CHUNK_TAG as u32) << 16) | length_in_segments as u32;
    stream.put_word(header)?;
    stream.put_block(payload)
}

/// Reads a small chunk header and its payload, verifying the tag matches
/// [`SMALL_METADATA_CHUNK_TAG`].
pub fn read_small_chunk<B: ByteStream>(stream: &mut B) -> Result<Vec<u8>> {
    let header = stream.get_word()?;
    let tag = (header >> 16) as u16;
    if tag != SMALL_METADATA_CHUNK_TAG {
        return syntax_error("expected the small metadata chunk tag");
    }
    let length_in_segments = (header & 0xffff) as usize;
    let mut payload = vec![0u8; length_in_segments * 4];
    stream.get_block(&mut payload)?;
    Ok(payload)
}

/// Writes the metadata tuple tree's binary encoding, enveloped in a large chunk header.
pub fn write_large_chunk<B: ByteStream>(stream: &mut B, payload: &[u8]) -> Result<()> {
    if payload.len() % 4 != 0 {
        return syntax_error("metadata chunk payload is not segment-aligned");
    }
    let length_in_segments = (payload.len() / 4) as u32;
    if length_in_segments > 0x00ff_ffff {
        return syntax_error("metadata chunk too large for a 24-bit segment length");
    }
    let header = ((LARGE_METADATA_CHUNK_PREFIX as u32) << 24) | length_in_segments;
    stream.put_word(header)?;
    stream.put_block(payload)
}

/// Reads a large chunk header and its payload, verifying the 8-bit prefix matches
/// [`LARGE_METADATA_CHUNK_PREFIX`].
pub fn read_large_chunk<B: ByteStream>(stream: &mut B) -> Result<Vec<u8>> {
    let header = stream.get_word()?;
    let prefix = (header >> 24) as u8;
    if prefix != LARGE_METADATA_CHUNK_PREFIX {
        return syntax_error("expected the large metadata chunk prefix");
    }
    let length_in_segments = (header & 0x00ff_ffff) as usize;
    let mut payload = vec![0u8; length_in_segments * 4];
    stream.get_block(&mut payload)?;
    Ok(payload)
}

/// Skips an unrecognised chunk's payload given its length in segments, per the decoder's rule
/// for chunks it does not understand.
pub fn skip_chunk<B: ByteStream>(stream: &mut B, length_in_segments: u32) -> Result<()> {
    stream.skip(4 * length_in_segments as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc5_core::io::BufferByteStream;

    #[test]
    fn verify_small_chunk_round_trip() {
        let mut bs = BufferByteStream::new();
        let payload = vec![1, 2, 3, 4, 5, 6, 7, 8];
        write_small_chunk(&mut bs, &payload).unwrap();
        bs.rewind().unwrap();
        let decoded = read_small_chunk(&mut bs).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn verify_large_chunk_round_trip() {
        let mut bs = BufferByteStream::new();
        let payload = vec![0u8; 4096];
        write_large_chunk(&mut bs, &payload).unwrap();
        bs.rewind().unwrap();
        let decoded = read_large_chunk(&mut bs).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn verify_skip_unrecognised_chunk() {
        let mut bs = BufferByteStream::new();
        bs.put_block(&[0xaa; 16]).unwrap();
        bs.put_byte(0xff).unwrap();
        bs.rewind().unwrap();
        skip_chunk(&mut bs, 4).unwrap();
        assert_eq!(bs.get_byte().unwrap(), 0xff);
    }
}
