// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Variable-length coding of signed coefficient values, zero runs, and special markers.

use vc5_core::error::Result;
use vc5_core::io::{BitReader, BitWriter, ByteStream};

use crate::codebook::{codebook_17, invalid_codeword, DecodedSymbol, SpecialMarker};

const SIGN_CODE_SIZE: u32 = 1;
const POSITIVE_SIGN: u32 = 0;
const NEGATIVE_SIGN: u32 = 1;

/// Writes a nonzero companded magnitude, followed by its sign bit.
///
/// The value passed in has already had companding applied by the caller (see
/// [`crate::companding::compand`]); zero is never passed here, it is handled by
/// [`put_zeros`].
pub fn put_value<B: ByteStream>(writer: &mut BitWriter<'_, B>, value: i32) -> Result<()> {
    debug_assert!(value != 0);
    let codebook = codebook_17();
    let codeword = codebook.magnitude_codeword(value.abs());
    let sign = if value > 0 { POSITIVE_SIGN } else { NEGATIVE_SIGN };
    writer.put_bits(codeword.bits, codeword.size as u32)?;
    writer.put_bits(sign, SIGN_CODE_SIZE)
}

/// Writes one or more run-length codewords covering exactly `count` zero coefficients.
pub fn put_zeros<B: ByteStream>(writer: &mut BitWriter<'_, B>, mut count: u32) -> Result<()> {
    let codebook = codebook_17();
    while count > 0 {
        let run = codebook.run_codeword(count);
        writer.put_bits(run.bits, run.size as u32)?;
        count -= run.count as u32;
    }
    Ok(())
}

/// Writes the band-end special marker.
pub fn put_band_end<B: ByteStream>(writer: &mut BitWriter<'_, B>) -> Result<()> {
    let codeword = codebook_17().band_end_codeword();
    writer.put_bits(codeword.bits, codeword.size as u32)
}

/// One decoded band-coding token.
#[derive(Debug, Clone, Copy)]
pub enum Token {
    /// `count` consecutive zero coefficients.
    Zeros(u32),
    /// A single nonzero, still-companded coefficient value (sign already applied).
    Value(i32),
    /// The end of the band.
    BandEnd,
}

/// Reads one codeword and resolves it into a [`Token`], consuming the sign bit for a nonzero
/// value codeword.
pub fn get_token<B: ByteStream>(reader: &mut BitReader<'_, B>) -> Result<Token> {
    let codebook = codebook_17();
    let max_size = codebook.max_code_size();

    let mut bits: u32 = 0;
    for size in 1..=max_size {
        bits = (bits << 1) | reader.get_bit()?;
        if let Some(symbol) = codebook.lookup(size, bits) {
            return match symbol {
                DecodedSymbol::Run(count) => Ok(Token::Zeros(count as u32)),
                DecodedSymbol::Magnitude(magnitude) => {
                    let sign = reader.get_bit()?;
                    let value = if sign == NEGATIVE_SIGN { -(magnitude as i32) } else { magnitude as i32 };
                    Ok(Token::Value(value))
                }
                DecodedSymbol::Special(SpecialMarker::BandEnd) => Ok(Token::BandEnd),
            };
        }
    }
    invalid_codeword()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc5_core::io::BufferByteStream;

    #[test]
    fn verify_value_and_zeros_round_trip() {
        let mut bs = BufferByteStream::new();
        {
            let mut w = BitWriter::new(&mut bs);
            put_zeros(&mut w, 2).unwrap();
            put_value(&mut w, 3).unwrap();
            put_zeros(&mut w, 1).unwrap();
            put_band_end(&mut w).unwrap();
            w.align_word().unwrap();
        }
        bs.rewind().unwrap();
        let mut r = BitReader::new(&mut bs);

        let mut zeros_total = 0u32;
        match get_token(&mut r).unwrap() {
            Token::Zeros(n) => zeros_total += n,
            other => panic!("expected zeros, got {other:?}"),
        }
        assert_eq!(zeros_total, 2);

        match get_token(&mut r).unwrap() {
            Token::Value(v) => assert_eq!(v, 3),
            other => panic!("expected value, got {other:?}"),
        }

        match get_token(&mut r).unwrap() {
            Token::Zeros(n) => assert_eq!(n, 1),
            other => panic!("expected zeros, got {other:?}"),
        }

        match get_token(&mut r).unwrap() {
            Token::BandEnd => {}
            other => panic!("expected band end, got {other:?}"),
        }
    }

    #[test]
    fn verify_negative_value_sign_bit() {
        let mut bs = BufferByteStream::new();
        {
            let mut w = BitWriter::new(&mut bs);
            put_value(&mut w, -7).unwrap();
            w.align_word().unwrap();
        }
        bs.rewind().unwrap();
        let mut r = BitReader::new(&mut bs);
        match get_token(&mut r).unwrap() {
            Token::Value(v) => assert_eq!(v, -7),
            other => panic!("expected value, got {other:?}"),
        }
    }
}
