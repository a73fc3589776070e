// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The four-band wavelet container, the per-channel transform, and subband numbering.

use vc5_core::error::{value_error, Result};

/// The highest wavelet level a transform may hold (levels are `0..MAX_WAVELET_COUNT`, applied
/// successively to the previous level's LL band).
pub const MAX_WAVELET_COUNT: usize = 3;

/// One of the four bands produced by a single 2-D wavelet level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Ll,
    Lh,
    Hl,
    Hh,
}

impl Band {
    /// All four bands, in the fixed storage order used by `valid_band_mask`.
    pub const ALL: [Band; 4] = [Band::Ll, Band::Lh, Band::Hl, Band::Hh];

    fn index(self) -> usize {
        match self {
            Band::Ll => 0,
            Band::Lh => 1,
            Band::Hl => 2,
            Band::Hh => 3,
        }
    }
}

/// Maps a decode-order subband number (0-9) to its (wavelet level, band).
///
/// `0 -> (2, LL); 1..3 -> (2, LH/HL/HH); 4..6 -> (1, LH/HL/HH); 7..9 -> (0, LH/HL/HH)`.
pub fn subband_to_level_band(subband: u8) -> Result<(usize, Band)> {
    match subband {
        0 => Ok((2, Band::Ll)),
        1 => Ok((2, Band::Lh)),
        2 => Ok((2, Band::Hl)),
        3 => Ok((2, Band::Hh)),
        4 => Ok((1, Band::Lh)),
        5 => Ok((1, Band::Hl)),
        6 => Ok((1, Band::Hh)),
        7 => Ok((0, Band::Lh)),
        8 => Ok((0, Band::Hl)),
        9 => Ok((0, Band::Hh)),
        _ => value_error("subband number out of range (expected 0..=9)"),
    }
}

/// A fixed four-band container for one wavelet transform level.
#[derive(Debug, Clone)]
pub struct Wavelet {
    width: usize,
    height: usize,
    pitch: usize,
    bands: [Vec<i32>; 4],
    /// How many bits of headroom the forward transform has accumulated in each band.
    scale: [u32; 4],
    /// Per-subband quantization divisor, indexed by [`Band`].
    quant: [u16; 4],
    valid_band_mask: u8,
}

impl Wavelet {
    /// Allocates a wavelet level with all four bands zero-filled at `width`x`height`.
    pub fn new(width: usize, height: usize) -> Self {
        let pitch = width;
        Wavelet {
            width,
            height,
            pitch,
            bands: Default::default(),
            scale: [1, 1, 1, 1],
            quant: [1, 1, 1, 1],
            valid_band_mask: 0,
        }
        .with_allocated_bands()
    }

    fn with_allocated_bands(mut self) -> Self {
        for band in Band::ALL {
            self.bands[band.index()] = vec![0i32; self.pitch * self.height];
        }
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    /// Borrows one band's full coefficient storage, row-major.
    pub fn band(&self, band: Band) -> &[i32] {
        &self.bands[band.index()]
    }

    /// Mutably borrows one band's full coefficient storage, row-major, and marks it populated.
    pub fn band_mut(&mut self, band: Band) -> &mut [i32] {
        self.valid_band_mask |= 1 << band.index();
        &mut self.bands[band.index()]
    }

    /// Borrows one row of a band.
    pub fn band_row(&self, band: Band, y: usize) -> &[i32] {
        let start = y * self.pitch;
        &self.bands[band.index()][start..start + self.width]
    }

    /// Mutably borrows one row of a band, marking it populated.
    pub fn band_row_mut(&mut self, band: Band, y: usize) -> &mut [i32] {
        self.valid_band_mask |= 1 << band.index();
        let start = y * self.pitch;
        &mut self.bands[band.index()][start..start + self.width]
    }

    pub fn scale(&self, band: Band) -> u32 {
        self.scale[band.index()]
    }

    pub fn set_scale(&mut self, band: Band, scale: u32) {
        self.scale[band.index()] = scale;
    }

    pub fn quant(&self, band: Band) -> u16 {
        self.quant[band.index()]
    }

    pub fn set_quant(&mut self, band: Band, divisor: u16) {
        self.quant[band.index()] = divisor;
    }

    /// True once every band has been written at least once.
    pub fn is_complete(&self) -> bool {
        self.valid_band_mask == 0b1111
    }

    pub fn valid_band_mask(&self) -> u8 {
        self.valid_band_mask
    }
}

/// A per-channel cascade of up to [`MAX_WAVELET_COUNT`] wavelet levels. Level 0 is applied to
/// the channel's component array; each subsequent level is applied to the previous level's LL
/// band.
#[derive(Debug, Clone)]
pub struct Transform {
    levels: Vec<Wavelet>,
}

impl Transform {
    /// Creates an empty transform; levels are pushed as the cascade runs.
    pub fn new() -> Self {
        Transform { levels: Vec::with_capacity(MAX_WAVELET_COUNT) }
    }

    /// Appends the next wavelet level, enforcing the halving invariant against the previous
    /// level's dimensions (skipped for the first level, whose input is the component array).
    pub fn push_level(&mut self, wavelet: Wavelet) -> Result<()> {
        if let Some(previous) = self.levels.last() {
            if wavelet.width() != previous.width() / 2 || wavelet.height() != previous.height() / 2 {
                return value_error("wavelet cascade: level dimensions are not half of the previous level");
            }
        }
        if self.levels.len() >= MAX_WAVELET_COUNT {
            return value_error("wavelet cascade: too many levels");
        }
        self.levels.push(wavelet);
        Ok(())
    }

    pub fn level(&self, index: usize) -> Option<&Wavelet> {
        self.levels.get(index)
    }

    pub fn level_mut(&mut self, index: usize) -> Option<&mut Wavelet> {
        self.levels.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_subband_numbering_table() {
        assert_eq!(subband_to_level_band(0).unwrap(), (2, Band::Ll));
        assert_eq!(subband_to_level_band(1).unwrap(), (2, Band::Lh));
        assert_eq!(subband_to_level_band(3).unwrap(), (2, Band::Hh));
        assert_eq!(subband_to_level_band(4).unwrap(), (1, Band::Lh));
        assert_eq!(subband_to_level_band(6).unwrap(), (1, Band::Hh));
        assert_eq!(subband_to_level_band(7).unwrap(), (0, Band::Lh));
        assert_eq!(subband_to_level_band(9).unwrap(), (0, Band::Hh));
        assert!(subband_to_level_band(10).is_err());
    }

    #[test]
    fn verify_wavelet_completeness() {
        let mut w = Wavelet::new(4, 4);
        assert!(!w.is_complete());
        for band in Band::ALL {
            w.band_mut(band).fill(1);
        }
        assert!(w.is_complete());
    }

    #[test]
    fn verify_cascade_halving_invariant() {
        let mut t = Transform::new();
        t.push_level(Wavelet::new(16, 16)).unwrap();
        assert!(t.push_level(Wavelet::new(7, 8)).is_err());
        t.push_level(Wavelet::new(8, 8)).unwrap();
        assert_eq!(t.len(), 2);
    }
}
