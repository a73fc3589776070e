// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Codec state: the bag of parameters incrementally updated as the decoder (or encoder)
//! consumes (or emits) segments.

use vc5_wavelet::wavelet::MAX_WAVELET_COUNT;

/// Quantization divisors for the ten subbands (index 0 is always 1, the lowpass).
pub const SUBBAND_COUNT: usize = 10;

/// Default prescale table for 8-bit source precision: no shift at any level.
pub const DEFAULT_PRESCALE_8_BIT: [u8; MAX_WAVELET_COUNT] = [0, 0, 0];
/// Default prescale table for 10- or 12-bit source precision.
pub const DEFAULT_PRESCALE_10_12_BIT: [u8; MAX_WAVELET_COUNT] = [0, 2, 2];

/// Packs a prescale table into the 16-bit value carried by the `PrescaleShift` segment: level
/// `i` occupies bits `(14 - 2i)..=(15 - 2i)`.
pub fn pack_prescale_table(levels: &[u8]) -> i16 {
    let mut packed: u16 = 0;
    for (i, &shift) in levels.iter().enumerate().take(MAX_WAVELET_COUNT) {
        packed |= (shift as u16 & 0b11) << (14 - 2 * i);
    }
    packed as i16
}

/// Unpacks a `PrescaleShift` segment value into a per-level prescale table.
pub fn unpack_prescale_table(value: i16) -> [u8; MAX_WAVELET_COUNT] {
    let packed = value as u16;
    let mut levels = [0u8; MAX_WAVELET_COUNT];
    for (i, slot) in levels.iter_mut().enumerate() {
        *slot = ((packed >> (14 - 2 * i)) & 0b11) as u8;
    }
    levels
}

/// The default prescale table for a given source bit depth, per the syntax layer's convention
/// that an encoder whose table equals the default may omit the `PrescaleShift` segment.
pub fn default_prescale_table(bits_per_component: u8) -> [u8; MAX_WAVELET_COUNT] {
    if bits_per_component <= 8 {
        DEFAULT_PRESCALE_8_BIT
    } else {
        DEFAULT_PRESCALE_10_12_BIT
    }
}

/// Frame-structure flags decoded from the `FrameStructure` segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStructure {
    pub interlaced: bool,
    pub bottom_field_first: bool,
    pub bottom_row_first: bool,
}

impl FrameStructure {
    pub fn from_value(value: i16) -> Self {
        FrameStructure {
            interlaced: value & 0b001 != 0,
            bottom_field_first: value & 0b010 != 0,
            bottom_row_first: value & 0b100 != 0,
        }
    }

    pub fn to_value(self) -> i16 {
        (self.interlaced as i16) | ((self.bottom_field_first as i16) << 1) | ((self.bottom_row_first as i16) << 2)
    }
}

/// Active codebook and band-coding mode, decoded from the `BandCoding` segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandCoding {
    pub codebook: u8,
    pub difference_coding: bool,
}

impl Default for BandCoding {
    fn default() -> Self {
        BandCoding { codebook: 17, difference_coding: false }
    }
}

impl BandCoding {
    pub fn from_value(value: i16) -> Self {
        BandCoding { codebook: (value & 0x0f) as u8, difference_coding: value & 0x10 != 0 }
    }

    pub fn to_value(self) -> i16 {
        (self.codebook as i16 & 0x0f) | ((self.difference_coding as i16) << 4)
    }
}

/// The full set of mutable fields a segment may update as the codec state machine runs.
#[derive(Debug, Clone)]
pub struct CodecState {
    pub channel_number: u16,
    pub channel_count: u16,
    pub subband_number: u8,
    pub channel_width: u16,
    pub channel_height: u16,
    pub image_width: u16,
    pub image_height: u16,
    pub image_format: i16,
    pub pattern_width: u16,
    pub pattern_height: u16,
    pub components_per_sample: u16,
    pub bits_per_component: u8,
    pub lowpass_precision: u8,
    pub quantization: [u16; SUBBAND_COUNT],
    pub prescale: [u8; MAX_WAVELET_COUNT],
    pub band_coding: BandCoding,
    pub frame_structure: FrameStructure,
    pub layer_number: u16,
    pub enabled_parts: u16,
}

impl Default for CodecState {
    fn default() -> Self {
        CodecState {
            channel_number: 0,
            channel_count: 1,
            subband_number: 0,
            channel_width: 0,
            channel_height: 0,
            image_width: 0,
            image_height: 0,
            image_format: 0,
            pattern_width: 1,
            pattern_height: 1,
            components_per_sample: 1,
            bits_per_component: 8,
            lowpass_precision: 16,
            quantization: vc5_entropy::quant::DEFAULT_QUANT_DIVISORS,
            prescale: DEFAULT_PRESCALE_8_BIT,
            band_coding: BandCoding::default(),
            frame_structure: FrameStructure::default(),
            layer_number: 0,
            enabled_parts: 1,
        }
    }
}

impl CodecState {
    pub fn new() -> Self {
        CodecState::default()
    }

    /// The quantization divisor for one of the nine highpass subbands (1-indexed as in the
    /// wire vector; subband 0, the lowpass, always has divisor 1).
    pub fn subband_divisor(&self, subband: u8) -> u16 {
        self.quantization[subband as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_prescale_packing_example() {
        // [0, 2, 2] packs to 0x2800 per the literal spec example.
        assert_eq!(pack_prescale_table(&[0, 2, 2]) as u16, 0x2800);
    }

    #[test]
    fn verify_prescale_round_trip() {
        let table = [1u8, 3, 2];
        let packed = pack_prescale_table(&table);
        assert_eq!(unpack_prescale_table(packed), table);
    }

    #[test]
    fn verify_frame_structure_round_trip() {
        let fs = FrameStructure { interlaced: true, bottom_field_first: false, bottom_row_first: true };
        assert_eq!(FrameStructure::from_value(fs.to_value()), fs);
    }

    #[test]
    fn verify_band_coding_round_trip() {
        let bc = BandCoding { codebook: 17, difference_coding: false };
        assert_eq!(BandCoding::from_value(bc.to_value()), bc);
    }

    #[test]
    fn verify_default_prescale_depends_on_precision() {
        assert_eq!(default_prescale_table(8), DEFAULT_PRESCALE_8_BIT);
        assert_eq!(default_prescale_table(12), DEFAULT_PRESCALE_10_12_BIT);
    }
}
