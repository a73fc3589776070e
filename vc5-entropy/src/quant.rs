// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-subband coefficient quantization and its inverse.

use crate::companding::uncompand;

/// The default per-subband quantization divisor vector (Filmscan-1 quality). Index 0 (the
/// lowpass band) is always 1; indices 1..=9 cover the eight highpass subbands produced by the
/// two-level cascade plus the reserved ninth entry.
pub const DEFAULT_QUANT_DIVISORS: [u16; 10] = [1, 24, 24, 12, 24, 24, 12, 96, 96, 144];

const PIXEL_MIN: i32 = -32768;
const PIXEL_MAX: i32 = 32767;

fn clamp_pixel(v: i32) -> i32 {
    v.clamp(PIXEL_MIN, PIXEL_MAX)
}

/// Returns the midpoint-rounding offset for divisor `d` under rounding setting `s`.
///
/// Setting 2 is the one used throughout the baseline profile: `m = d/2 - 1` when that is
/// nonzero, otherwise 0.
fn midpoint(d: i32, s: i32) -> i32 {
    match s {
        2 => {
            let m = d / 2 - 1;
            if m > 0 {
                m
            } else {
                0
            }
        }
        _ => d / s.max(1),
    }
}

/// Quantizes one coefficient `v` by divisor `d`, using midpoint-rounding setting `s` (2 in the
/// baseline profile).
pub fn quantize(v: i32, d: i32, s: i32) -> i32 {
    if d <= 1 {
        return clamp_pixel(v);
    }

    let m = midpoint(d, s);
    let magnitude = v.unsigned_abs() as i64;
    let scaled = ((magnitude + m as i64) * (65536 / d as i64)) >> 16;
    let q = if v < 0 { -(scaled as i32) } else { scaled as i32 };
    clamp_pixel(q)
}

/// Dequantizes one coefficient `q`, inverting [`quantize`]'s companding but not its midpoint
/// rounding (the forward direction absorbed that irreversibly).
pub fn dequantize(q: i32, d: i32) -> i32 {
    let r = uncompand(q);
    if r == 0 {
        return 0;
    }
    let magnitude = r.unsigned_abs() as i64 * d as i64;
    let signed = if r < 0 { -magnitude } else { magnitude };
    clamp_pixel(signed as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_divisor_one_is_passthrough() {
        assert_eq!(quantize(1234, 1, 2), 1234);
        assert_eq!(quantize(-1234, 0, 2), -1234);
    }

    #[test]
    fn verify_quantize_preserves_sign() {
        let positive = quantize(1000, 24, 2);
        let negative = quantize(-1000, 24, 2);
        assert_eq!(positive, -negative);
        assert!(positive > 0);
    }

    #[test]
    fn verify_clamp_to_pixel_range() {
        assert_eq!(quantize(i32::MAX, 1, 2), PIXEL_MAX);
        assert_eq!(quantize(i32::MIN, 1, 2), PIXEL_MIN);
    }

    #[test]
    fn verify_zero_stays_zero_through_dequantize() {
        assert_eq!(dequantize(0, 24), 0);
    }
}
