// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared argument parsing and raw-image I/O for the `vc5-encode` and `vc5-decode` binaries.
//!
//! Packing and unpacking of specific pixel formats is an external collaborator
//! (`vc5_bitstream::params::PixelFormat`, see `PURPOSE & SCOPE`); this crate drives that trait
//! with the only implementation the core ships, [`PassthroughFormat`], so it can exercise
//! already-planar 16-bit formats (`RG48`, `B64A`) end to end. Bayer and YUV formats are
//! recognised as header tags but rejected at the pack/unpack boundary with `Unsupported`.

use std::path::Path;

use log::LevelFilter;

use vc5_bitstream::params::{PassthroughFormat, PixelFormat, PixelFormatTag};
use vc5_bitstream::state::SUBBAND_COUNT;
use vc5_core::error::{application_error, unsupported_error, Result, Vc5Error};
use vc5_core::io::{ByteStream, FileByteStream};
use vc5_wavelet::component::ComponentArray;

/// Parses a pixel-format tag name (`RG48`, `BYR4`, ...) from a CLI argument.
pub fn parse_pixel_format(text: &str) -> Result<PixelFormatTag> {
    let upper = text.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    if bytes.len() != 4 {
        return application_error("pixel format must be a 4-character tag (e.g. RG48)");
    }
    let mut fourcc = [0u8; 4];
    fourcc.copy_from_slice(bytes);
    PixelFormatTag::from_fourcc(&fourcc)
}

/// Parses a comma-separated `-Q q1,...,q9` quantization list into the full ten-entry divisor
/// vector (entry 0, the lowpass, is always 1).
pub fn parse_quantization(text: &str) -> Result<[u16; SUBBAND_COUNT]> {
    let mut divisors = vc5_entropy::quant::DEFAULT_QUANT_DIVISORS;
    let mut count = 0;
    for (index, field) in text.split(',').enumerate() {
        let divisor: u16 = field.trim().parse().map_err(|_| Vc5Error::Application("-Q: not a number"))?;
        if index + 1 >= SUBBAND_COUNT {
            return application_error("-Q: at most 9 quantization divisors are accepted");
        }
        divisors[index + 1] = divisor;
        count += 1;
    }
    if count != 9 {
        return application_error("-Q: expected exactly 9 comma-separated divisors (q1,...,q9)");
    }
    Ok(divisors)
}

/// Parses a comma-separated `-P parts-list` (e.g. `"1,3,4"`) into the `enabled_parts` bitmask.
pub fn parse_parts(text: &str) -> Result<u16> {
    let mut mask = 0u16;
    for field in text.split(',') {
        let part: u32 = field.trim().parse().map_err(|_| Vc5Error::Application("-P: not a number"))?;
        if part == 0 || part > 15 {
            return application_error("-P: part numbers must be in 1..=15");
        }
        mask |= 1 << part;
    }
    Ok(mask)
}

/// Builds a logging filter from the `-v`/`-q`/`-z` flags: `-v` raises the level to `Debug`,
/// `-q`/`-z` lower it to `Error`, and absent either, `Info`.
pub fn init_logging(verbose: bool, quiet: bool, silent: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet || silent {
        LevelFilter::Error
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new().filter_level(level).format_timestamp(None).init();
}

/// The external collaborator this CLI can actually drive: a [`PassthroughFormat`] for formats
/// whose samples are already planar (or simply interleaved) 16-bit big-endian values.
fn packer_for(format: PixelFormatTag) -> Result<PassthroughFormat> {
    match format {
        PixelFormatTag::Rg48 | PixelFormatTag::B64a => {
            Ok(PassthroughFormat { components_per_sample: format.components_per_sample() })
        }
        _ => unsupported_error("this reference CLI only packs/unpacks already-planar 16-bit formats (RG48, B64A); \
            Bayer and YUV formats require an external packer"),
    }
}

/// Reads a raw packed-image file at `path` (`height` rows of `width` samples, each sample
/// `components_per_sample` big-endian 16-bit values interleaved) into one [`ComponentArray`] per
/// channel.
pub fn read_packed_image(path: &Path, width: u16, height: u16, format: PixelFormatTag, bits: u8) -> Result<Vec<ComponentArray>> {
    let packer = packer_for(format)?;
    let channel_count = packer.channel_count();
    let width = width as usize;
    let height = height as usize;

    let mut channels: Vec<ComponentArray> =
        (0..channel_count).map(|_| ComponentArray::new(width, height, width, bits)).collect::<Result<_>>()?;

    let mut stream = FileByteStream::open(path)?;
    let row_bytes = width * channel_count * 2;
    let mut row_buffer = vec![0u8; row_bytes];
    let mut destinations: Vec<Vec<i32>> = vec![vec![0i32; width]; channel_count];

    for y in 0..height {
        stream.get_block(&mut row_buffer)?;
        packer.unpack_row(&row_buffer, &mut destinations);
        for (channel, row) in destinations.iter().enumerate() {
            channels[channel].row_mut(y).copy_from_slice(row);
        }
    }
    Ok(channels)
}

/// Writes decoded channel arrays back out as one raw packed-image file, mirroring
/// [`read_packed_image`].
pub fn write_packed_image(path: &Path, channels: &[ComponentArray], format: PixelFormatTag) -> Result<()> {
    let packer = packer_for(format)?;
    if channels.is_empty() {
        return application_error("decoded image has no channels to pack");
    }
    let width = channels[0].width();
    let height = channels[0].height();

    let mut stream = FileByteStream::create(path)?;
    let mut packed = Vec::new();
    let mut sources: Vec<Vec<i32>> = vec![vec![0i32; width]; channels.len()];

    for y in 0..height {
        for (channel, source) in sources.iter_mut().enumerate() {
            source.copy_from_slice(channels[channel].row(y));
        }
        packer.pack_row(&sources, &mut packed);
        stream.put_block(&packed)?;
    }
    stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_pixel_format_parsing_is_case_insensitive() {
        assert_eq!(parse_pixel_format("rg48").unwrap(), PixelFormatTag::Rg48);
        assert_eq!(parse_pixel_format("RG48").unwrap(), PixelFormatTag::Rg48);
    }

    #[test]
    fn verify_quantization_list_requires_nine_entries() {
        assert!(parse_quantization("24,24,12,24,24,12,96,96").is_err());
        let divisors = parse_quantization("24,24,12,24,24,12,96,96,144").unwrap();
        assert_eq!(divisors, vc5_entropy::quant::DEFAULT_QUANT_DIVISORS);
    }

    #[test]
    fn verify_parts_list_builds_bitmask() {
        assert_eq!(parse_parts("1,3,4").unwrap(), (1 << 1) | (1 << 3) | (1 << 4));
        assert!(parse_parts("0").is_err());
    }

    #[test]
    fn verify_unsupported_format_is_rejected_at_the_pack_boundary() {
        assert!(packer_for(PixelFormatTag::Byr4).is_err());
        assert!(packer_for(PixelFormatTag::Rg48).is_ok());
    }
}
