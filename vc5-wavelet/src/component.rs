// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component arrays: one channel's worth of signed coefficients.

use vc5_core::error::{value_error, Result};

/// Highest channel index a transform can address (channels are numbered `0..MAX_CHANNEL_COUNT`).
pub const MAX_CHANNEL_COUNT: usize = 4;

/// A 2-D array of signed coefficients for one colour channel.
#[derive(Debug, Clone)]
pub struct ComponentArray {
    width: usize,
    height: usize,
    pitch: usize,
    bits_per_component: u8,
    data: Vec<i32>,
}

impl ComponentArray {
    /// Allocates a zero-filled component array. `pitch` is in elements, not bytes, and must be
    /// at least `width`.
    pub fn new(width: usize, height: usize, pitch: usize, bits_per_component: u8) -> Result<Self> {
        if pitch < width {
            return value_error("component array: pitch narrower than width");
        }
        if bits_per_component == 0 || bits_per_component > 16 {
            return value_error("component array: bits-per-component out of range");
        }
        Ok(ComponentArray { width, height, pitch, bits_per_component, data: vec![0i32; pitch * height] })
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

    pub fn bits_per_component(&self) -> u8 {
        self.bits_per_component
    }

    /// Borrows one row of `width` valid samples (the pitch may extend beyond it).
    pub fn row(&self, y: usize) -> &[i32] {
        let start = y * self.pitch;
        &self.data[start..start + self.width]
    }

    /// Mutably borrows one row of `width` valid samples.
    pub fn row_mut(&mut self, y: usize) -> &mut [i32] {
        let start = y * self.pitch;
        &mut self.data[start..start + self.width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_rejects_narrow_pitch() {
        assert!(ComponentArray::new(10, 4, 5, 10).is_err());
    }

    #[test]
    fn verify_row_access() {
        let mut arr = ComponentArray::new(4, 2, 4, 10).unwrap();
        arr.row_mut(1).copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(arr.row(1), &[1, 2, 3, 4]);
        assert_eq!(arr.row(0), &[0, 0, 0, 0]);
    }
}
