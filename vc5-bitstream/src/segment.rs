// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The tag-value "segment": one 32-bit wire element, a signed 16-bit tag concatenated with a
//! signed 16-bit value.

use vc5_core::error::{syntax_error, Result, Vc5Error};
use vc5_core::io::ByteStream;

use crate::tag::is_chunk_tag;

/// A 16-bit signed tag paired with a 16-bit signed value, the atomic wire unit of the syntax
/// layer. A tag with its most-significant bit set is optional: a decoder that does not
/// recognise it is required to skip it rather than fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub tag: i16,
    pub value: i16,
}

impl Segment {
    pub fn new(tag: i16, value: i16) -> Self {
        Segment { tag, value }
    }

    /// True if the top bit of the tag is set, marking the segment optional.
    pub fn is_optional(&self) -> bool {
        self.tag < 0
    }
}

/// Reads one 32-bit segment, splitting it into its tag and value halves.
pub fn get_segment<B: ByteStream>(stream: &mut B) -> Result<Segment> {
    let word = stream.get_word()?;
    let tag = (word >> 16) as u16 as i16;
    let value = (word & 0xffff) as u16 as i16;
    Ok(Segment { tag, value })
}

/// Writes one 32-bit segment from its tag and value halves.
pub fn put_segment<B: ByteStream>(stream: &mut B, segment: Segment) -> Result<()> {
    let word = ((segment.tag as u16 as u32) << 16) | (segment.value as u16 as u32);
    stream.put_word(word)
}

/// Reads segments until one matching `wanted_tag` is found, silently skipping any optional
/// segments encountered along the way. An unrecognised optional chunk tag has its payload
/// skipped (`4 * value` bytes); any other unrecognised optional segment is simply discarded.
/// A required segment whose tag does not match `wanted_tag` is a `BADTAG` error.
pub fn get_tag_value<B: ByteStream>(stream: &mut B, wanted_tag: i16) -> Result<Segment> {
    loop {
        let segment = get_segment(stream)?;
        if segment.tag == wanted_tag {
            return Ok(segment);
        }
        if segment.is_optional() {
            if is_chunk_tag(segment.tag) {
                stream.skip(4 * segment.value as u16 as u64)?;
            }
            continue;
        }
        return Err(Vc5Error::Syntax("unexpected required tag: bitstream does not match expected syntax order"));
    }
}

/// Reads the next segment and asserts its tag equals `wanted_tag`, returning its value.
/// Returns a `BADTAG` error (and a value of zero) on mismatch, without skipping anything.
pub fn get_value<B: ByteStream>(stream: &mut B, wanted_tag: i16) -> Result<i16> {
    let segment = get_segment(stream)?;
    if segment.tag != wanted_tag {
        return syntax_error("BADTAG: segment tag does not match the one expected");
    }
    Ok(segment.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc5_core::io::BufferByteStream;

    #[test]
    fn verify_tag_value_round_trip() {
        let mut bs = BufferByteStream::new();
        put_segment(&mut bs, Segment::new(0x1A2B, 0x00C8)).unwrap();
        assert_eq!(bs.as_slice(), &[0x1A, 0x2B, 0x00, 0xC8]);
        bs.rewind().unwrap();
        let segment = get_segment(&mut bs).unwrap();
        assert_eq!(segment, Segment::new(0x1A2B, 0x00C8));
    }

    #[test]
    fn verify_optional_segment_skip() {
        // tag = 0xFFF0 (optional, unrecognised chunk), value = 1 -> skip 4 bytes (one filler
        // word), then the wanted tag 0x1234 with value 0x5678.
        let bytes: [u8; 12] = [0xFF, 0xF0, 0x00, 0x01, 0xDE, 0xAD, 0xBE, 0xEF, 0x12, 0x34, 0x56, 0x78];
        let mut bs = BufferByteStream::from_vec(bytes.to_vec());
        let segment = get_tag_value(&mut bs, 0x1234).unwrap();
        assert_eq!(segment, Segment::new(0x1234, 0x5678));
    }

    #[test]
    fn verify_get_value_mismatch_is_badtag() {
        let mut bs = BufferByteStream::new();
        put_segment(&mut bs, Segment::new(5, 99)).unwrap();
        bs.rewind().unwrap();
        assert!(get_value(&mut bs, 6).is_err());
    }

    #[test]
    fn verify_get_value_matches() {
        let mut bs = BufferByteStream::new();
        put_segment(&mut bs, Segment::new(5, 99)).unwrap();
        bs.rewind().unwrap();
        assert_eq!(get_value(&mut bs, 5).unwrap(), 99);
    }
}
