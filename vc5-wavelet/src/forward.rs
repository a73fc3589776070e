// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Forward wavelet analysis: a three-tap lowpass/highpass filter pair applied first along rows,
//! then along columns of the row-filtered result.
//!
//! The vertical pass is stated to mirror the horizontal kernels exactly, so both passes share
//! [`analysis_filter`]; the vertical pass simply calls it on gathered columns instead of rows.

use vc5_entropy::quant::quantize;

use crate::wavelet::{Band, Wavelet};

/// Returns `x[i]`, duplicating the final sample when `i` runs past the end of an odd-width row
/// (the border-kernel duplication rule).
fn sample(x: &[i32], i: usize) -> i32 {
    x[i.min(x.len() - 1)]
}

/// Applies the forward three-tap analysis filter to one line of `count` samples, producing a
/// lowpass and a highpass output line each of length `count / 2` (rounded up).
///
/// `prescale` is the right-shift folded into the lowpass average to control dynamic range
/// growth; pass 0 to disable it.
pub fn analysis_filter(x: &[i32], prescale: u32) -> (Vec<i32>, Vec<i32>) {
    let half = x.len().div_ceil(2);
    let mut lowpass = Vec::with_capacity(half);
    let mut highpass = Vec::with_capacity(half);
    let round_in = (1i32 << prescale) - 1;

    for k in 0..half {
        let even = sample(x, 2 * k);
        let odd = sample(x, 2 * k + 1);
        lowpass.push((even + odd + round_in) >> prescale);
    }

    for k in 0..half {
        let h = if k == 0 {
            // Left border: [+5, -11, +4, +4, -1, -1] / 8 over the first six samples.
            let s = [sample(x, 0), sample(x, 1), sample(x, 2), sample(x, 3), sample(x, 4), sample(x, 5)];
            (5 * s[0] - 11 * s[1] + 4 * s[2] + 4 * s[3] - s[4] - s[5] + 4) >> 3
        } else if k == half - 1 {
            // Right border: [-5, +11, -4, -4, +1, +1] / 8 over the last six samples, reversed.
            let n = x.len();
            let s = [
                sample(x, n - 1),
                sample(x, n.saturating_sub(2)),
                sample(x, n.saturating_sub(3)),
                sample(x, n.saturating_sub(4)),
                sample(x, n.saturating_sub(5)),
                sample(x, n.saturating_sub(6)),
            ];
            (-5 * s[0] + 11 * s[1] - 4 * s[2] - 4 * s[3] + s[4] + s[5] + 4) >> 3
        } else {
            let a = sample(x, 2 * k - 2);
            let b = sample(x, 2 * k - 1);
            let c = sample(x, 2 * k + 2);
            let d = sample(x, 2 * k + 3);
            ((-a - b + c + d + 4) >> 3) + sample(x, 2 * k) - sample(x, 2 * k + 1)
        };
        highpass.push(h);
    }

    (lowpass, highpass)
}

fn gather_column(rows: &[Vec<i32>], x: usize) -> Vec<i32> {
    rows.iter().map(|row| row[x]).collect()
}

/// Runs one 2-D analysis level: horizontal pass over every row, then vertical pass over every
/// column of each of the two row-filtered arrays, writing the four resulting bands (already
/// quantized, except the LL band) into `wavelet`.
///
/// `rows` holds `height` input rows, each `width` samples wide. `quant` is the divisor vector
/// `[LH, HL, HH]` for this level (the LL band is never quantized). `rounding` is the midpoint
/// rounding setting (2 in the baseline profile).
pub fn analyze_level(rows: &[Vec<i32>], prescale: u32, quant: [u16; 3], rounding: i32, wavelet: &mut Wavelet) {
    let width = rows[0].len();

    let mut lowpass_rows = Vec::with_capacity(rows.len());
    let mut highpass_rows = Vec::with_capacity(rows.len());
    for row in rows {
        let (l, h) = analysis_filter(row, prescale);
        lowpass_rows.push(l);
        highpass_rows.push(h);
    }

    let half_width = lowpass_rows[0].len();
    let height = rows.len();

    for x in 0..half_width {
        let column = gather_column(&lowpass_rows, x);
        let (ll, lh) = analysis_filter(&column, 0);
        for (y, value) in ll.into_iter().enumerate() {
            wavelet.band_mut(Band::Ll)[y * wavelet.pitch() + x] = value;
        }
        for (y, value) in lh.into_iter().enumerate() {
            let q = quantize(value, quant[0] as i32, rounding);
            wavelet.band_mut(Band::Lh)[y * wavelet.pitch() + x] = q;
        }
    }
    for x in 0..half_width {
        let column = gather_column(&highpass_rows, x);
        let (hl, hh) = analysis_filter(&column, 0);
        for (y, value) in hl.into_iter().enumerate() {
            let q = quantize(value, quant[1] as i32, rounding);
            wavelet.band_mut(Band::Hl)[y * wavelet.pitch() + x] = q;
        }
        for (y, value) in hh.into_iter().enumerate() {
            let q = quantize(value, quant[2] as i32, rounding);
            wavelet.band_mut(Band::Hh)[y * wavelet.pitch() + x] = q;
        }
    }

    wavelet.set_scale(Band::Ll, wavelet.scale(Band::Ll) * 4);
    wavelet.set_scale(Band::Lh, wavelet.scale(Band::Lh) * 2);
    wavelet.set_scale(Band::Hl, wavelet.scale(Band::Hl) * 2);

    let _ = width;
    let _ = height;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_lowpass_is_adjacent_sum_without_prescale() {
        let row = vec![1, 2, 3, 4];
        let (lowpass, _) = analysis_filter(&row, 0);
        assert_eq!(lowpass, vec![3, 7]);
    }

    #[test]
    fn verify_constant_row_has_zero_highpass_interior() {
        let row = vec![10; 16];
        let (_, highpass) = analysis_filter(&row, 0);
        for (k, &h) in highpass.iter().enumerate() {
            if k != 0 && k != highpass.len() - 1 {
                assert_eq!(h, 0, "interior highpass should vanish on a constant row");
            }
        }
    }

    #[test]
    fn verify_odd_width_duplicates_last_sample() {
        let row = vec![1, 2, 3, 4, 5];
        let (lowpass, _) = analysis_filter(&row, 0);
        // Last output column pairs x[4] with a duplicated x[4].
        assert_eq!(lowpass.last().copied(), Some(5 + 5));
    }
}
