// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Segment tag constants and the bit-pattern conventions that govern how an unrecognised
//! optional segment is skipped.
//!
//! A tag's top bit (bit 15) marks it optional. Among optional tags, the next bit down (bit 14)
//! marks it a *chunk* tag, whose value is a payload length in segments rather than an ordinary
//! parameter; an unrecognised optional chunk tag is skipped by its length, an unrecognised
//! optional parameter tag is simply discarded.

/// True if the tag's top bit is set (an optional element a decoder may silently skip).
pub fn is_optional(tag: i16) -> bool {
    tag < 0
}

/// True if an optional tag additionally carries the chunk bit, meaning its value is a
/// payload length in segments rather than a plain parameter.
pub fn is_chunk_tag(tag: i16) -> bool {
    (tag as u16) & 0xc000 == 0xc000
}

// Required parameter tags (top bit clear): codec state fields mutated one per segment.
pub const TAG_CHANNEL_NUMBER: i16 = 1;
pub const TAG_SUBBAND_NUMBER: i16 = 2;
pub const TAG_LOWPASS_PRECISION: i16 = 3;
pub const TAG_QUANTIZATION: i16 = 4;
pub const TAG_PRESCALE_SHIFT: i16 = 5;
pub const TAG_CHANNEL_WIDTH: i16 = 6;
pub const TAG_CHANNEL_HEIGHT: i16 = 7;
pub const TAG_IMAGE_WIDTH: i16 = 8;
pub const TAG_IMAGE_HEIGHT: i16 = 9;
pub const TAG_IMAGE_FORMAT: i16 = 10;
pub const TAG_PATTERN_WIDTH: i16 = 11;
pub const TAG_PATTERN_HEIGHT: i16 = 12;
pub const TAG_COMPONENTS_PER_SAMPLE: i16 = 13;
pub const TAG_BITS_PER_COMPONENT: i16 = 14;
pub const TAG_FRAME_STRUCTURE: i16 = 15;
pub const TAG_LAYER_NUMBER: i16 = 16;
pub const TAG_BAND_CODING: i16 = 17;
pub const TAG_ENABLED_PARTS: i16 = 18;
pub const TAG_CHANNEL_COUNT: i16 = 19;
pub const TAG_SUBBAND_COUNT: i16 = 20;

/// Start marker: an encoder must write this segment before any other, and a decoder must find
/// it first.
pub const TAG_START_MARKER: i16 = 0x0100;
/// Start marker's companion value, a fixed identifying constant.
pub const START_MARKER_VALUE: i16 = 0x1000;

/// End marker: closes the bitstream.
pub const TAG_END_MARKER: i16 = 0x0101;
pub const END_MARKER_VALUE: i16 = 0x2000;

/// Band-end trailer: a checksum/length confirmation written after the band-end marker and
/// segment alignment.
pub const TAG_BAND_END_TRAILER: i16 = 21;

/// Frame-structure flag bits within `TAG_FRAME_STRUCTURE`'s value.
pub const FRAME_STRUCTURE_INTERLACED: i16 = 1 << 0;
pub const FRAME_STRUCTURE_BOTTOM_FIELD_FIRST: i16 = 1 << 1;
pub const FRAME_STRUCTURE_BOTTOM_ROW_FIRST: i16 = 1 << 2;

/// Band-coding flag bits within `TAG_BAND_CODING`'s value: the low 4 bits select the active
/// codebook, bit 4 requests difference coding (undefined behaviour outside the baseline
/// profile, which forbids it).
pub const BAND_CODING_CODEBOOK_MASK: i16 = 0x0f;
pub const BAND_CODING_DIFFERENCE_FLAG: i16 = 1 << 4;

/// Optional small metadata chunk tag (top two bits set, marking it an optional chunk).
pub const TAG_SMALL_METADATA_CHUNK: i16 = 0xc010u16 as i16;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_required_tags_are_not_optional() {
        assert!(!is_optional(TAG_CHANNEL_NUMBER));
        assert!(!is_optional(TAG_BAND_CODING));
    }

    #[test]
    fn verify_chunk_tag_pattern() {
        assert!(is_optional(TAG_SMALL_METADATA_CHUNK));
        assert!(is_chunk_tag(TAG_SMALL_METADATA_CHUNK));
        assert!(is_chunk_tag(0xfff0u16 as i16));
    }

    #[test]
    fn verify_plain_optional_tag_is_not_a_chunk_tag() {
        // Top bit set, second bit clear: optional parameter, not a chunk.
        let plain_optional = 0x8000u16 as i16;
        assert!(is_optional(plain_optional));
        assert!(!is_chunk_tag(plain_optional));
    }
}
