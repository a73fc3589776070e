// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Encoding and decoding of one highpass band's flattened, run/value-coded coefficients, and the
//! raw fixed-width encoding used for the lowpass band.

use vc5_core::error::{syntax_error, Result};
use vc5_core::io::{BitReader, BitWriter, ByteStream};

use crate::companding::{compand, uncompand};
use crate::vlc::{get_token, put_band_end, put_value, put_zeros, Token};

/// Encodes a highpass band's coefficients, already quantized, in row-major order.
///
/// Runs of zeros are coalesced into run-length codewords; each nonzero coefficient is companded
/// and written as a magnitude codeword followed by its sign. The band-end marker follows the
/// last coefficient, whether or not it was itself a zero run.
pub fn encode_band<B: ByteStream>(writer: &mut BitWriter<'_, B>, coefficients: &[i32]) -> Result<()> {
    let mut run = 0u32;
    for &coefficient in coefficients {
        if coefficient == 0 {
            run += 1;
            continue;
        }
        if run > 0 {
            put_zeros(writer, run)?;
            run = 0;
        }
        put_value(writer, compand(coefficient))?;
    }
    if run > 0 {
        put_zeros(writer, run)?;
    }
    put_band_end(writer)
}

/// Decodes a highpass band of exactly `count` coefficients, returning them dequantized in the
/// companded (still-to-be-scaled) domain; the caller applies the per-subband divisor.
pub fn decode_band<B: ByteStream>(reader: &mut BitReader<'_, B>, count: usize) -> Result<Vec<i32>> {
    let mut coefficients = vec![0i32; count];
    let mut index = 0usize;

    loop {
        match get_token(reader)? {
            Token::Zeros(run) => {
                let run = run as usize;
                if index + run > count {
                    return syntax_error("entropy band: zero run overruns band length");
                }
                index += run;
            }
            Token::Value(value) => {
                if index >= count {
                    return syntax_error("entropy band: value overruns band length");
                }
                coefficients[index] = uncompand(value);
                index += 1;
            }
            Token::BandEnd => {
                if index != count {
                    return syntax_error("entropy band: band-end marker before band was full");
                }
                return Ok(coefficients);
            }
        }
    }
}

/// Writes the lowpass band raw: each coefficient as a fixed-width field of `precision` bits,
/// row-major, no entropy coding.
pub fn encode_lowpass<B: ByteStream>(writer: &mut BitWriter<'_, B>, coefficients: &[i32], precision: u32) -> Result<()> {
    for &coefficient in coefficients {
        writer.put_signed(coefficient, precision)?;
    }
    Ok(())
}

/// Reads `count` raw fixed-width lowpass coefficients.
pub fn decode_lowpass<B: ByteStream>(reader: &mut BitReader<'_, B>, count: usize, precision: u32) -> Result<Vec<i32>> {
    let mut coefficients = Vec::with_capacity(count);
    for _ in 0..count {
        coefficients.push(reader.get_signed(precision)?);
    }
    Ok(coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc5_core::io::BufferByteStream;

    #[test]
    fn verify_band_end_example_from_specification() {
        // Encoding the 4-coefficient band [0, 0, 3, 0] emits: zero-run(2), value-code(3),
        // sign(0), zero-run(1), band-end-marker.
        let mut bs = BufferByteStream::new();
        {
            let mut w = BitWriter::new(&mut bs);
            encode_band(&mut w, &[0, 0, 3, 0]).unwrap();
            w.align_word().unwrap();
        }
        bs.rewind().unwrap();
        let mut r = BitReader::new(&mut bs);
        let decoded = decode_band(&mut r, 4).unwrap();
        assert_eq!(decoded, vec![0, 0, 3, 0]);
    }

    #[test]
    fn verify_all_zero_band() {
        let mut bs = BufferByteStream::new();
        {
            let mut w = BitWriter::new(&mut bs);
            encode_band(&mut w, &[0, 0, 0, 0, 0]).unwrap();
            w.align_word().unwrap();
        }
        bs.rewind().unwrap();
        let mut r = BitReader::new(&mut bs);
        let decoded = decode_band(&mut r, 5).unwrap();
        assert_eq!(decoded, vec![0, 0, 0, 0, 0]);
    }

    #[test]
    fn verify_lowpass_raw_round_trip() {
        let mut bs = BufferByteStream::new();
        let coefficients = [0i32, -1, 32000, -32000, 12345];
        {
            let mut w = BitWriter::new(&mut bs);
            encode_lowpass(&mut w, &coefficients, 16).unwrap();
            w.align_word().unwrap();
        }
        bs.rewind().unwrap();
        let mut r = BitReader::new(&mut bs);
        let decoded = decode_lowpass(&mut r, coefficients.len(), 16).unwrap();
        assert_eq!(decoded, coefficients);
    }

    #[test]
    fn verify_band_end_before_full_is_rejected() {
        let mut bs = BufferByteStream::new();
        {
            let mut w = BitWriter::new(&mut bs);
            encode_band(&mut w, &[0, 0]).unwrap();
            w.align_word().unwrap();
        }
        bs.rewind().unwrap();
        let mut r = BitReader::new(&mut bs);
        assert!(decode_band(&mut r, 4).is_err());
    }
}
