// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Encode/decode parameters, and the minimal pixel-format surface the codec core depends on.
//!
//! Pixel packing and unpacking for specific formats is an external collaborator (see `PURPOSE &
//! SCOPE`): this module only declares the tag names and the trait boundary an external packer
//! implements. A [`PassthroughFormat`] baseline treats one sample as one coefficient per
//! component, sufficient for formats that are already planar 16-bit (e.g. `RG48`), and exists
//! so the pipeline in [`crate::codec`] has something concrete to drive in tests.

use vc5_core::error::{unsupported_error, Result};

/// Pixel-format tag names the syntax layer recognises, in the `ImageFormat` segment. Packing
/// rules for each are an external collaborator's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormatTag {
    Byr3,
    Byr4,
    Rg48,
    B64a,
    Yuy2,
    Nv12,
    Dpx0,
}

impl PixelFormatTag {
    pub fn from_fourcc(fourcc: &[u8; 4]) -> Result<Self> {
        match fourcc {
            b"BYR3" => Ok(PixelFormatTag::Byr3),
            b"BYR4" => Ok(PixelFormatTag::Byr4),
            b"RG48" => Ok(PixelFormatTag::Rg48),
            b"B64A" => Ok(PixelFormatTag::B64a),
            b"YUY2" => Ok(PixelFormatTag::Yuy2),
            b"NV12" => Ok(PixelFormatTag::Nv12),
            b"DPX0" => Ok(PixelFormatTag::Dpx0),
            _ => unsupported_error("unrecognised pixel format tag"),
        }
    }

    /// A small numeric code for this format, carried in the `ImageFormat` segment's 16-bit
    /// value (the segment has no room for a four-byte FourCC).
    pub fn header_code(self) -> i16 {
        match self {
            PixelFormatTag::Byr3 => 3,
            PixelFormatTag::Byr4 => 4,
            PixelFormatTag::Rg48 => 48,
            PixelFormatTag::B64a => 64,
            PixelFormatTag::Yuy2 => 22,
            PixelFormatTag::Nv12 => 12,
            PixelFormatTag::Dpx0 => 10,
        }
    }

    /// Inverts [`header_code`](Self::header_code).
    pub fn from_header_code(code: i16) -> Result<Self> {
        match code {
            3 => Ok(PixelFormatTag::Byr3),
            4 => Ok(PixelFormatTag::Byr4),
            48 => Ok(PixelFormatTag::Rg48),
            64 => Ok(PixelFormatTag::B64a),
            22 => Ok(PixelFormatTag::Yuy2),
            12 => Ok(PixelFormatTag::Nv12),
            10 => Ok(PixelFormatTag::Dpx0),
            _ => unsupported_error("unrecognised image format code"),
        }
    }

    pub fn fourcc(self) -> [u8; 4] {
        match self {
            PixelFormatTag::Byr3 => *b"BYR3",
            PixelFormatTag::Byr4 => *b"BYR4",
            PixelFormatTag::Rg48 => *b"RG48",
            PixelFormatTag::B64a => *b"B64A",
            PixelFormatTag::Yuy2 => *b"YUY2",
            PixelFormatTag::Nv12 => *b"NV12",
            PixelFormatTag::Dpx0 => *b"DPX0",
        }
    }

    /// Number of interleaved components per sample, for the formats this implementation can
    /// drive without an external packer (planar/interleaved integer formats).
    pub fn components_per_sample(self) -> usize {
        match self {
            PixelFormatTag::Rg48 => 3,
            PixelFormatTag::B64a => 4,
            _ => 1,
        }
    }
}

/// A pixel-format packer/unpacker: the external collaborator the codec core drives but does not
/// implement in full generality. Given one row of packed samples, extracts per-channel
/// coefficients (unpack) or reassembles them (pack).
pub trait PixelFormat {
    /// Number of colour channels this format exposes to the wavelet cascade.
    fn channel_count(&self) -> usize;

    /// Unpacks one row of `width` packed samples into `channel_count()` destination rows.
    fn unpack_row(&self, packed: &[u8], destinations: &mut [Vec<i32>]);

    /// Packs `channel_count()` source rows back into one row of packed samples.
    fn pack_row(&self, sources: &[Vec<i32>], packed: &mut Vec<u8>);
}

/// A baseline pixel format that treats each 16-bit big-endian sample as one coefficient,
/// interleaved across `components_per_sample` channels. Suitable for already-planar or
/// already-linear formats (`RG48`, `B64A`); Bayer and YUV formats require a richer external
/// packer and are out of scope for the core.
pub struct PassthroughFormat {
    pub components_per_sample: usize,
}

impl PixelFormat for PassthroughFormat {
    fn channel_count(&self) -> usize {
        self.components_per_sample
    }

    fn unpack_row(&self, packed: &[u8], destinations: &mut [Vec<i32>]) {
        let count = self.components_per_sample;
        for (sample_index, chunk) in packed.chunks_exact(2 * count).enumerate() {
            for channel in 0..count {
                let hi = chunk[2 * channel] as i32;
                let lo = chunk[2 * channel + 1] as i32;
                destinations[channel][sample_index] = (hi << 8) | lo;
            }
        }
    }

    fn pack_row(&self, sources: &[Vec<i32>], packed: &mut Vec<u8>) {
        let count = self.components_per_sample;
        let width = sources[0].len();
        packed.clear();
        packed.reserve(width * count * 2);
        for sample_index in 0..width {
            for channel in 0..count {
                let value = sources[channel][sample_index].clamp(0, 0xffff) as u16;
                packed.extend_from_slice(&value.to_be_bytes());
            }
        }
    }
}

/// Parameters supplied to the encoder: dimensions, format, and per-subband tuning.
#[derive(Debug, Clone)]
pub struct EncoderParameters {
    pub width: u16,
    pub height: u16,
    pub pixel_format: PixelFormatTag,
    pub bits_per_component: u8,
    pub enabled_parts: u16,
    pub quantization: [u16; crate::state::SUBBAND_COUNT],
    pub verbose: bool,
}

impl EncoderParameters {
    pub fn new(width: u16, height: u16, pixel_format: PixelFormatTag, bits_per_component: u8) -> Self {
        EncoderParameters {
            width,
            height,
            pixel_format,
            bits_per_component,
            enabled_parts: 1,
            quantization: vc5_entropy::quant::DEFAULT_QUANT_DIVISORS,
            verbose: false,
        }
    }
}

/// Parameters supplied to the decoder: the caller's expectations, checked against the
/// bitstream's own header segments.
#[derive(Debug, Clone, Default)]
pub struct DecoderParameters {
    pub expected_width: Option<u16>,
    pub expected_height: Option<u16>,
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_pixel_format_tag_round_trips_fourcc() {
        assert_eq!(PixelFormatTag::from_fourcc(b"RG48").unwrap(), PixelFormatTag::Rg48);
        assert_eq!(PixelFormatTag::Rg48.fourcc(), *b"RG48");
    }

    #[test]
    fn verify_passthrough_format_round_trip() {
        let format = PassthroughFormat { components_per_sample: 3 };
        let mut packed = Vec::new();
        let sources = vec![vec![100, 200], vec![300, 400], vec![500, 600]];
        format.pack_row(&sources, &mut packed);

        let mut destinations = vec![vec![0i32; 2], vec![0i32; 2], vec![0i32; 2]];
        format.unpack_row(&packed, &mut destinations);
        assert_eq!(destinations, sources);
    }

    #[test]
    fn verify_unrecognised_fourcc_is_unsupported() {
        assert!(PixelFormatTag::from_fourcc(b"XXXX").is_err());
    }
}
