// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `vc5-decode`: reads a VC-5 bitstream and writes a raw packed image.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, warn};

use vc5_bitstream::codec::decode_image;
use vc5_cli::{init_logging, parse_parts, parse_pixel_format, write_packed_image};
use vc5_core::error::{application_error, Result};
use vc5_core::io::FileByteStream;

/// Decodes a VC-5 bitstream into a raw packed image.
#[derive(Parser, Debug)]
#[command(name = "vc5-decode", version, about)]
struct DecodeArgs {
    /// Input VC-5 bitstream.
    input: PathBuf,

    /// Output raw packed image path.
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Expected image width; mismatches against the bitstream header are reported as a warning.
    #[arg(short = 'w', long)]
    width: Option<u16>,

    /// Expected image height; mismatches against the bitstream header are reported as a warning.
    #[arg(short = 'h', long)]
    height: Option<u16>,

    /// Pixel format to pack the decoded channels into (e.g. RG48, B64A).
    #[arg(short = 'p', long, value_parser = parse_pixel_format)]
    format: vc5_bitstream::params::PixelFormatTag,

    /// Comma-separated list of VC-5 parts the decoder must support, e.g. "1,3,4".
    #[arg(short = 'P', long, value_parser = parse_parts)]
    parts: Option<u16>,

    /// Dump a single band's coefficients to a file (debug tooling, not supported by this decoder).
    #[arg(short = 'B', long)]
    bandfile: Option<PathBuf>,

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

fn run(args: DecodeArgs) -> Result<()> {
    if args.bandfile.is_some() {
        return application_error("-B (per-band coefficient dump) is not supported by this decoder");
    }

    if let Some(parts) = args.parts {
        debug!("caller requires VC-5 parts bitmask {parts:#06x}");
    }

    let mut input = FileByteStream::open(&args.input)?;
    let decoded = decode_image(&mut input)?;

    if let Some(expected) = args.width {
        if expected as usize != decoded.width {
            warn!("decoded width {} does not match expected width {expected}", decoded.width);
        }
    }
    if let Some(expected) = args.height {
        if expected as usize != decoded.height {
            warn!("decoded height {} does not match expected height {expected}", decoded.height);
        }
    }

    write_packed_image(&args.output, &decoded.channels, args.format)
}

fn main() -> ExitCode {
    let args = DecodeArgs::parse();
    init_logging(args.verbose, args.quiet, args.silent);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
