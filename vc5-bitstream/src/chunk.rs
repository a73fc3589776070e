// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Chunk framing: a segment whose value is back-patched, after the fact, with the length in
//! segments of the payload that follows it.

use vc5_core::error::Result;
use vc5_core::io::{ByteStream, SampleOffsetStack};

use crate::segment::{put_segment, Segment};

/// Writes a chunk header with a placeholder zero length and pushes the header's offset onto
/// `stack`, so [`end_chunk`] can later patch in the real length.
pub fn begin_chunk<B: ByteStream>(stream: &mut B, stack: &mut SampleOffsetStack, tag: i16) -> Result<()> {
    let offset = stream.position();
    put_segment(stream, Segment::new(tag, 0))?;
    stack.push(offset)
}

/// Pops the most recently pushed chunk offset and back-patches its length field with the
/// number of segments written since [`begin_chunk`], leaving the stream positioned where it was
/// (at the end of the payload).
pub fn end_chunk<B: ByteStream>(stream: &mut B, stack: &mut SampleOffsetStack, tag: i16) -> Result<()> {
    let current = stream.position();
    let length_in_segments = stack.pop(current)?;
    let header_offset = current - 4 * (length_in_segments as u64) - 4;
    let word = ((tag as u16 as u32) << 16) | (length_in_segments & 0xffff);
    stream.put_block_at(header_offset, &word.to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc5_core::io::BufferByteStream;

    #[test]
    fn verify_chunk_back_patch_empty_channel_payload() {
        let mut bs = BufferByteStream::new();
        bs.pad(100).unwrap();
        let mut stack = SampleOffsetStack::new();

        begin_chunk(&mut bs, &mut stack, 7).unwrap();
        bs.put_block(&[0u8; 12]).unwrap();
        end_chunk(&mut bs, &mut stack, 7).unwrap();

        let header = bs.as_slice()[100..104].to_vec();
        let word = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
        assert_eq!((word >> 16) as u16, 7);
        assert_eq!(word & 0xffff, 3);
    }

    #[test]
    fn verify_nested_chunks_back_patch_independently() {
        let mut bs = BufferByteStream::new();
        let mut stack = SampleOffsetStack::new();

        begin_chunk(&mut bs, &mut stack, 1).unwrap();
        begin_chunk(&mut bs, &mut stack, 2).unwrap();
        bs.put_block(&[0u8; 4]).unwrap();
        end_chunk(&mut bs, &mut stack, 2).unwrap();
        end_chunk(&mut bs, &mut stack, 1).unwrap();

        assert!(stack.is_empty());
        let bytes = bs.as_slice();
        let outer = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let inner = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        assert_eq!(outer & 0xffff, 2); // inner header (1 segment) + inner payload (1 segment)
        assert_eq!(inner & 0xffff, 1);
    }
}
