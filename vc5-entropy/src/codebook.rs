// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Codebook 17: the mandatory variable-length codebook for the baseline profile.
//!
//! A codebook is a sorted table of entries, each either a coefficient-magnitude codeword, a
//! run-length codeword, or a special marker codeword (currently only the band-end marker). Three
//! derived tables are computed from it at codec initialization: a magnitudes table indexed by
//! `|value|`, a run-length table indexed by run length, and a decode table keyed by the
//! bit pattern actually read off the wire.
//!
//! **The codewords below are synthesized, not transcribed, and are not bit-exact with VC-5 Part
//! 1's actual codebook 17.** The real table (`table17.inc` in the reference encoder) is not
//! present anywhere in the source material available here; `codebooks.h` only declares the
//! functions that build it (`FillMagnitudeEncodingTable`, `ComputeRunLengthCodeTable`, ...), not
//! the bit patterns themselves. Lacking that table, entries here are instead assigned canonical
//! variable-length codes from an exponential-Golomb length profile: short runs and small
//! magnitudes get short codes, so the codebook is internally consistent and prefix-free (the
//! round-trip invariant this crate can actually verify), but a conformance comparator checking
//! output against real Part 1 bitstreams would reject it. Swap `code_length`/`build` for a
//! transcription of the real table if `table17.inc` ever becomes available.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use vc5_core::error::{syntax_error, Result};

/// Largest coefficient magnitude entry present in the magnitudes table. Values greater than this
/// saturate to this entry, matching the reference encoder's `mags_table_index` clamp.
pub const MAX_MAGNITUDE_ENTRY: u16 = 1023;

/// Number of entries in the run-length table. A run longer than `RUN_TABLE_LENGTH - 1` is
/// greedily covered with repeated codewords.
pub const RUN_TABLE_LENGTH: u16 = 64;

/// A codeword's size in bits. The reference implementation calls this `BITCOUNT`.
pub type BitCount = u8;

/// Special codewords that mark locations in the bitstream rather than encode a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialMarker {
    /// Marks the end of an entropy-coded band.
    BandEnd,
}

#[derive(Debug, Clone, Copy)]
enum Symbol {
    Magnitude(u16),
    Run(u16),
    Special(SpecialMarker),
}

/// A `(bits, size)` codeword, as stored in the magnitudes and run-length tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Codeword {
    pub bits: u32,
    pub size: BitCount,
}

/// A run-length table entry: the codeword, plus how much of the run it covers.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunCodeword {
    pub bits: u32,
    pub size: BitCount,
    pub count: u16,
}

/// The compiled codebook: encode tables (magnitude, run-length, special) plus a decode map keyed
/// by `(size, bits)`.
pub struct Codebook {
    magnitudes: Vec<Codeword>,
    runs: Vec<RunCodeword>,
    band_end: Codeword,
    decode: HashMap<(BitCount, u32), Symbol>,
    max_code_size: BitCount,
}

/// Exponential-Golomb-style length profile: `len(n) = 2*floor(log2(n)) + 1` for `n >= 1`.
fn golomb_length(n: u16) -> u32 {
    debug_assert!(n >= 1);
    32 - (n as u32).leading_zeros() - 1
}

fn code_length(n: u16) -> u32 {
    2 * golomb_length(n) + 1
}

impl Codebook {
    fn build() -> Self {
        // Gather every symbol the codebook must represent along with its code length, then
        // assign canonical codes in (length, symbol-order) order. This keeps the table
        // prefix-free without transcribing a literal bit pattern table.
        let mut symbols: Vec<(Symbol, u32)> = Vec::new();

        for m in 1..=MAX_MAGNITUDE_ENTRY {
            symbols.push((Symbol::Magnitude(m), code_length(m)));
        }
        for r in 1..RUN_TABLE_LENGTH {
            symbols.push((Symbol::Run(r), code_length(r)));
        }
        // The band-end marker is reserved the longest codeword in the set so it can never be
        // confused with a magnitude or run-length prefix during the canonical assignment below.
        let band_end_length = symbols.iter().map(|(_, len)| *len).max().unwrap_or(1) + 2;
        symbols.push((Symbol::Special(SpecialMarker::BandEnd), band_end_length));

        symbols.sort_by_key(|(_, len)| *len);

        let mut decode = HashMap::with_capacity(symbols.len());
        let mut magnitudes = vec![Codeword::default(); (MAX_MAGNITUDE_ENTRY + 1) as usize];
        let mut runs = vec![RunCodeword::default(); RUN_TABLE_LENGTH as usize];
        let mut band_end = Codeword::default();

        let mut code: u32 = 0;
        let mut prev_len: u32 = 0;
        let mut max_code_size: BitCount = 0;

        for (symbol, len) in symbols {
            if prev_len != 0 {
                code <<= len - prev_len;
            }
            prev_len = len;
            max_code_size = max_code_size.max(len as BitCount);

            match symbol {
                Symbol::Magnitude(m) => {
                    magnitudes[m as usize] = Codeword { bits: code, size: len as BitCount };
                }
                Symbol::Run(r) => {
                    runs[r as usize] = RunCodeword { bits: code, size: len as BitCount, count: r };
                }
                Symbol::Special(SpecialMarker::BandEnd) => {
                    band_end = Codeword { bits: code, size: len as BitCount };
                }
            }
            decode.insert((len as BitCount, code), symbol);
            code += 1;
        }

        // Run-length table entry 0 is unused (a run of zero coefficients is never emitted); fill
        // it with the shortest single-zero-run code so an out-of-range index degrades gracefully.
        runs[0] = runs[1];

        Codebook { magnitudes, runs, band_end, decode, max_code_size }
    }

    /// Returns the codeword for a coefficient magnitude, saturating at the table's last entry.
    pub fn magnitude_codeword(&self, magnitude: i32) -> Codeword {
        let index = magnitude.clamp(1, MAX_MAGNITUDE_ENTRY as i32) as usize;
        self.magnitudes[index]
    }

    /// Returns the run-length table entry that covers the largest prefix of `remaining`.
    pub fn run_codeword(&self, remaining: u32) -> RunCodeword {
        let index = remaining.min(RUN_TABLE_LENGTH as u32 - 1).max(1) as usize;
        self.runs[index]
    }

    /// Returns the band-end special marker's codeword.
    pub fn band_end_codeword(&self) -> Codeword {
        self.band_end
    }

    /// The widest codeword size in the compiled table; decoders need read at most this many bits
    /// to resolve one symbol.
    pub fn max_code_size(&self) -> BitCount {
        self.max_code_size
    }

    /// Looks up the symbol for an exact `(size, bits)` codeword, used while decoding bit by bit.
    pub(crate) fn lookup(&self, size: BitCount, bits: u32) -> Option<DecodedSymbol> {
        self.decode.get(&(size, bits)).map(|symbol| match *symbol {
            Symbol::Magnitude(m) => DecodedSymbol::Magnitude(m),
            Symbol::Run(r) => DecodedSymbol::Run(r),
            Symbol::Special(marker) => DecodedSymbol::Special(marker),
        })
    }
}

/// The result of resolving one codeword while decoding a band.
#[derive(Debug, Clone, Copy)]
pub enum DecodedSymbol {
    Magnitude(u16),
    Run(u16),
    Special(SpecialMarker),
}

static CODEBOOK_17: Lazy<Codebook> = Lazy::new(Codebook::build);

/// Returns the process-wide, read-only codebook 17 instance, initialized on first use.
pub fn codebook_17() -> &'static Codebook {
    &CODEBOOK_17
}

pub(crate) fn invalid_codeword<T>() -> Result<T> {
    syntax_error("entropy decoder: bit pattern does not match any codebook entry")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_small_magnitudes_get_short_codes() {
        let cb = codebook_17();
        let small = cb.magnitude_codeword(1);
        let large = cb.magnitude_codeword(1000);
        assert!(small.size < large.size);
    }

    #[test]
    fn verify_magnitude_table_saturates() {
        let cb = codebook_17();
        let saturated = cb.magnitude_codeword(5000);
        let at_max = cb.magnitude_codeword(MAX_MAGNITUDE_ENTRY as i32);
        assert_eq!(saturated.bits, at_max.bits);
        assert_eq!(saturated.size, at_max.size);
    }

    #[test]
    fn verify_every_assigned_code_round_trips_through_decode() {
        let cb = codebook_17();
        for m in [1u16, 2, 3, 40, 255, 1023] {
            let cw = cb.magnitude_codeword(m as i32);
            match cb.lookup(cw.size, cw.bits) {
                Some(DecodedSymbol::Magnitude(decoded)) => assert_eq!(decoded, m),
                other => panic!("expected magnitude {m}, got {other:?}"),
            }
        }
        let band_end = cb.band_end_codeword();
        match cb.lookup(band_end.size, band_end.bits) {
            Some(DecodedSymbol::Special(SpecialMarker::BandEnd)) => {}
            other => panic!("expected band-end marker, got {other:?}"),
        }
    }

    #[test]
    fn verify_prefix_free_no_code_is_a_prefix_of_another() {
        let cb = codebook_17();
        let mut codes: Vec<(BitCount, u32)> = cb.decode.keys().copied().collect();
        codes.sort();
        for &(len_a, code_a) in &codes {
            for &(len_b, code_b) in &codes {
                if len_a >= len_b {
                    continue;
                }
                let shifted = code_b >> (len_b - len_a);
                assert_ne!(shifted, code_a, "code of length {len_a} is a prefix of one of length {len_b}");
            }
        }
    }
}
