// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `vc5-encode`: reads a raw packed image and writes a VC-5 bitstream.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use vc5_bitstream::codec::encode_image;
use vc5_bitstream::params::EncoderParameters;
use vc5_cli::{init_logging, parse_parts, parse_pixel_format, parse_quantization, read_packed_image};
use vc5_core::error::Result;
use vc5_core::io::{ByteStream, FileByteStream};

/// Encodes a raw packed image into a VC-5 bitstream.
#[derive(Parser, Debug)]
#[command(name = "vc5-encode", version, about)]
struct EncodeArgs {
    /// Input raw packed image.
    input: PathBuf,

    /// Output bitstream path.
    output: PathBuf,

    /// Image width in pixels.
    #[arg(short = 'w', long)]
    width: u16,

    /// Image height in pixels.
    #[arg(short = 'h', long)]
    height: u16,

    /// Pixel format FourCC (e.g. RG48, B64A).
    #[arg(short = 'p', long, value_parser = parse_pixel_format)]
    format: vc5_bitstream::params::PixelFormatTag,

    /// Bits per component (1..=16).
    #[arg(short = 'b', long, default_value_t = 8)]
    bits: u8,

    /// Comma-separated list of enabled VC-5 parts, e.g. "1,3,4".
    #[arg(short = 'P', long, value_parser = parse_parts)]
    parts: Option<u16>,

    /// Comma-separated list of nine quantization divisors (q1,...,q9), highest to lowest band.
    #[arg(short = 'Q', long, value_parser = parse_quantization)]
    quant: Option<[u16; vc5_bitstream::state::SUBBAND_COUNT]>,

    /// Enable verbose (debug) logging.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress all but error logging.
    #[arg(short = 'z', long)]
    quiet: bool,

    /// Suppress all logging output.
    #[arg(short = 'q', long)]
    silent: bool,
}

fn run(args: EncodeArgs) -> Result<()> {
    let channels = read_packed_image(&args.input, args.width, args.height, args.format, args.bits)?;

    let mut params = EncoderParameters::new(args.width, args.height, args.format, args.bits);
    if let Some(parts) = args.parts {
        params.enabled_parts = parts;
    }
    if let Some(quant) = args.quant {
        params.quantization = quant;
    }
    params.verbose = args.verbose;

    let mut output = FileByteStream::create(&args.output)?;
    encode_image(&mut output, &channels, &params)?;
    output.flush()
}

fn main() -> ExitCode {
    let args = EncodeArgs::parse();
    init_logging(args.verbose, args.quiet, args.silent);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
