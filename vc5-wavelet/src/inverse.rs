// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inverse wavelet synthesis: reconstructs a line of `2*lowpass.len()` (or `output_width`, if
//! narrower) samples from a lowpass/highpass pair, then the column-wise pass that undoes the
//! vertical analysis. The reference implementation keeps only a three-row sliding window of the
//! LH band during vertical synthesis as a streaming optimization; since whole-band buffering is
//! explicitly permitted, this implementation reconstructs a full band at a time instead.

use vc5_entropy::quant::dequantize;

use crate::wavelet::{Band, Wavelet};

/// Applies the inverse three-tap synthesis filter to a lowpass line `lowpass` and a highpass
/// line `highpass` of equal length `w`, producing up to `output_width` reconstructed samples
/// (`output_width` may be `2*w - 1` when the original row had odd width).
pub fn synthesis_filter(lowpass: &[i32], highpass: &[i32], output_width: usize) -> Vec<i32> {
    let w = lowpass.len();
    debug_assert_eq!(highpass.len(), w);
    let mut out = Vec::with_capacity(output_width);

    for k in 0..w {
        let (even, odd) = if k == 0 {
            let l0 = lowpass[0];
            let l1 = if w > 1 { lowpass[1] } else { lowpass[0] };
            let l2 = if w > 2 { lowpass[2] } else { l1 };
            let even = ((11 * l0 - 4 * l1 + l2 + 4) >> 3) + highpass[0];
            let odd = ((5 * l0 + 4 * l1 - l2 + 4) >> 3) - highpass[0];
            (even >> 1, odd >> 1)
        } else if k == w - 1 {
            let l0 = lowpass[w - 1];
            let l1 = if w > 1 { lowpass[w - 2] } else { lowpass[w - 1] };
            let l2 = if w > 2 { lowpass[w - 3] } else { l1 };
            let even = ((11 * l0 - 4 * l1 + l2 + 4) >> 3) + highpass[w - 1];
            let odd = ((5 * l0 + 4 * l1 - l2 + 4) >> 3) - highpass[w - 1];
            (even >> 1, odd >> 1)
        } else {
            let lm = lowpass[k - 1];
            let lp = lowpass[k + 1];
            let lk = lowpass[k];
            let hk = highpass[k];
            let even = ((lm - lp + 4) >> 3) + lk + hk;
            let odd = ((lp - lm + 4) >> 3) + lk - hk;
            (even >> 1, odd >> 1)
        };

        out.push(even);
        if out.len() < output_width {
            out.push(odd);
        }
    }

    out.truncate(output_width);
    out
}

fn dequantize_column(raw: &[i32], divisor: u16) -> Vec<i32> {
    raw.iter().map(|&q| dequantize(q, divisor as i32)).collect()
}

/// Reconstructs `output_height` rows of `output_width` samples from one wavelet level's four
/// bands, inverting both the vertical and horizontal analysis passes and dequantizing the three
/// highpass bands as their columns are consumed.
pub fn synthesize_level(wavelet: &Wavelet, output_width: usize, output_height: usize) -> Vec<Vec<i32>> {
    let half_width = wavelet.width();
    let half_height = wavelet.height();

    let mut lowpass_rows: Vec<Vec<i32>> = vec![vec![0i32; half_width]; output_height];
    let mut highpass_rows: Vec<Vec<i32>> = vec![vec![0i32; half_width]; output_height];

    // Vertical synthesis: combine LL/LH columns into lowpass-row columns, HL/HH into
    // highpass-row columns.
    for x in 0..half_width {
        let ll_col: Vec<i32> = (0..half_height).map(|y| wavelet.band(Band::Ll)[y * wavelet.pitch() + x]).collect();
        let lh_col_raw: Vec<i32> = (0..half_height).map(|y| wavelet.band(Band::Lh)[y * wavelet.pitch() + x]).collect();
        let lh_col = dequantize_column(&lh_col_raw, wavelet.quant(Band::Lh));
        let column = synthesis_filter(&ll_col, &lh_col, output_height);
        for (y, value) in column.into_iter().enumerate() {
            lowpass_rows[y][x] = value;
        }

        let hl_col_raw: Vec<i32> = (0..half_height).map(|y| wavelet.band(Band::Hl)[y * wavelet.pitch() + x]).collect();
        let hl_col = dequantize_column(&hl_col_raw, wavelet.quant(Band::Hl));
        let hh_col_raw: Vec<i32> = (0..half_height).map(|y| wavelet.band(Band::Hh)[y * wavelet.pitch() + x]).collect();
        let hh_col = dequantize_column(&hh_col_raw, wavelet.quant(Band::Hh));
        let column = synthesis_filter(&hl_col, &hh_col, output_height);
        for (y, value) in column.into_iter().enumerate() {
            highpass_rows[y][x] = value;
        }
    }

    // Horizontal synthesis: combine each lowpass/highpass row pair into one output row.
    let mut out = Vec::with_capacity(output_height);
    for y in 0..output_height {
        out.push(synthesis_filter(&lowpass_rows[y], &highpass_rows[y], output_width));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::analysis_filter;

    #[test]
    fn verify_horizontal_analysis_synthesis_round_trip_even_width() {
        let row: Vec<i32> = (0..16).map(|i| (i * 7) % 23).collect();
        let (lowpass, highpass) = analysis_filter(&row, 0);
        let reconstructed = synthesis_filter(&lowpass, &highpass, row.len());
        assert_eq!(reconstructed, row);
    }

    #[test]
    fn verify_horizontal_analysis_synthesis_round_trip_odd_width() {
        let row: Vec<i32> = vec![3, -1, 4, 1, 5, 9, 2, 6, 8];
        let (lowpass, highpass) = analysis_filter(&row, 0);
        let reconstructed = synthesis_filter(&lowpass, &highpass, row.len());
        assert_eq!(reconstructed, row);
    }

    #[test]
    fn verify_constant_row_round_trips() {
        let row = vec![42; 12];
        let (lowpass, highpass) = analysis_filter(&row, 0);
        let reconstructed = synthesis_filter(&lowpass, &highpass, row.len());
        assert_eq!(reconstructed, row);
    }
}
