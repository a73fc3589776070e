// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The top-level encode/decode pipelines (spec.md §4.9): bitstream header and trailer, the
//! per-channel forward/inverse wavelet cascade, and the per-subband entropy-coded band protocol,
//! all driven by [`CodecState`] as segments are written or consumed.
//!
//! The decode side is a strict per-segment state machine (spec.md §5): the bitstream must be
//! well-formed in the order header -> per-channel(header -> per-subband(header -> band ->
//! band-end marker -> band-end trailer)) -> trailer, and any deviation from a required tag is
//! fatal, matching the reference decoder's "no graceful recovery from malformed input" design.

use vc5_core::error::{syntax_error, Result};
use vc5_core::io::{AdditiveTally, BitReader, BitWriter, ByteStream, TallyReader};
use vc5_entropy::band::{decode_band, decode_lowpass, encode_band, encode_lowpass};
use vc5_wavelet::component::ComponentArray;
use vc5_wavelet::forward::analyze_level;
use vc5_wavelet::inverse::synthesize_level;
use vc5_wavelet::wavelet::{subband_to_level_band, Band, Wavelet, MAX_WAVELET_COUNT};

use crate::params::{EncoderParameters, PixelFormatTag};
use crate::segment::{get_segment, get_value, put_segment, Segment};
use crate::state::{pack_prescale_table, unpack_prescale_table, CodecState};
use crate::tag::*;

/// The midpoint-rounding setting used throughout the baseline profile (spec.md §4.7).
const QUANT_ROUNDING: i32 = 2;

/// A fully decoded (or not-yet-packed) image: one [`ComponentArray`] per colour channel, plus
/// the overall channel dimensions they share.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: usize,
    pub height: usize,
    pub channels: Vec<ComponentArray>,
}

/// The dimensions of each of the [`MAX_WAVELET_COUNT`] wavelet levels for a channel of the given
/// size: level 0 (finest, first applied) through level `MAX_WAVELET_COUNT - 1` (coarsest). Each
/// level's band dimensions are the ceiling-half of the previous level's (component array at
/// level -1).
fn level_dims(width: usize, height: usize) -> [(usize, usize); MAX_WAVELET_COUNT] {
    let mut dims = [(0usize, 0usize); MAX_WAVELET_COUNT];
    let mut w = width;
    let mut h = height;
    for slot in dims.iter_mut() {
        w = w.div_ceil(2);
        h = h.div_ceil(2);
        *slot = (w, h);
    }
    dims
}

/// Subbands 7..=9 belong to level 0 (finest), 4..=6 to level 1, 1..=3 to level 2 (coarsest);
/// subband 0 is level 2's LL. Returns the three highpass subband numbers, in (LH, HL, HH)
/// order, that a given wavelet level index contributes.
fn level_highpass_subbands(level: usize) -> [u8; 3] {
    match level {
        0 => [7, 8, 9],
        1 => [4, 5, 6],
        2 => [1, 2, 3],
        _ => unreachable!("wavelet level index out of range"),
    }
}

fn quant_vector(state: &CodecState, level: usize) -> [u16; 3] {
    let subbands = level_highpass_subbands(level);
    [state.subband_divisor(subbands[0]), state.subband_divisor(subbands[1]), state.subband_divisor(subbands[2])]
}

fn band_rows(wavelet: &Wavelet, band: Band) -> Vec<Vec<i32>> {
    (0..wavelet.height()).map(|y| wavelet.band_row(band, y).to_vec()).collect()
}

fn inject_rows(wavelet: &mut Wavelet, band: Band, rows: &[Vec<i32>]) {
    for (y, row) in rows.iter().enumerate() {
        wavelet.band_row_mut(band, y).copy_from_slice(row);
    }
}

fn flatten_band(wavelet: &Wavelet, band: Band) -> Vec<i32> {
    (0..wavelet.height()).flat_map(|y| wavelet.band_row(band, y).to_vec()).collect()
}

fn unflatten_into(wavelet: &mut Wavelet, band: Band, coefficients: &[i32]) {
    let width = wavelet.width();
    for (y, row) in coefficients.chunks(width).enumerate() {
        wavelet.band_row_mut(band, y).copy_from_slice(row);
    }
}

// ---------------------------------------------------------------------------------------------
// Header / trailer
// ---------------------------------------------------------------------------------------------

/// Writes the bitstream start marker and the VC-5 parameter segments describing the whole image:
/// dimensions, pixel format, pattern dimensions, components-per-sample, bits-per-component,
/// internal (lowpass) precision, and enabled parts. The `PrescaleShift` segment is omitted when
/// the table equals the default for `bits_per_component` (spec.md §4.3).
pub fn write_header<B: ByteStream>(stream: &mut B, state: &CodecState, format: PixelFormatTag) -> Result<()> {
    put_segment(stream, Segment::new(TAG_START_MARKER, START_MARKER_VALUE))?;
    put_segment(stream, Segment::new(TAG_IMAGE_WIDTH, state.image_width as i16))?;
    put_segment(stream, Segment::new(TAG_IMAGE_HEIGHT, state.image_height as i16))?;
    put_segment(stream, Segment::new(TAG_IMAGE_FORMAT, format.header_code()))?;
    put_segment(stream, Segment::new(TAG_PATTERN_WIDTH, state.pattern_width as i16))?;
    put_segment(stream, Segment::new(TAG_PATTERN_HEIGHT, state.pattern_height as i16))?;
    put_segment(stream, Segment::new(TAG_COMPONENTS_PER_SAMPLE, state.components_per_sample as i16))?;
    put_segment(stream, Segment::new(TAG_BITS_PER_COMPONENT, state.bits_per_component as i16))?;
    put_segment(stream, Segment::new(TAG_LOWPASS_PRECISION, state.lowpass_precision as i16))?;
    put_segment(stream, Segment::new(TAG_ENABLED_PARTS, state.enabled_parts as i16))?;
    put_segment(stream, Segment::new(TAG_CHANNEL_COUNT, state.channel_count as i16))?;

    let default_prescale = crate::state::default_prescale_table(state.bits_per_component);
    if state.prescale != default_prescale {
        put_segment(stream, Segment::new(TAG_PRESCALE_SHIFT, pack_prescale_table(&state.prescale)))?;
    }
    Ok(())
}

/// Reads the start marker and header parameter segments, returning the populated [`CodecState`]
/// and the pixel format named by the `ImageFormat` segment. Any required segment out of order or
/// with an unexpected value is a fatal `Syntax` error (spec.md §7).
pub fn read_header<B: ByteStream>(stream: &mut B) -> Result<(CodecState, PixelFormatTag)> {
    let start = get_segment(stream)?;
    if start.tag != TAG_START_MARKER || start.value != START_MARKER_VALUE {
        return syntax_error("missing or malformed start marker: not a VC-5 bitstream");
    }

    let mut state = CodecState::new();
    let mut format = PixelFormatTag::Rg48;
    let mut prescale_seen = false;

    loop {
        let segment = get_segment(stream)?;
        match segment.tag {
            TAG_IMAGE_WIDTH => state.image_width = segment.value as u16,
            TAG_IMAGE_HEIGHT => state.image_height = segment.value as u16,
            TAG_IMAGE_FORMAT => format = PixelFormatTag::from_header_code(segment.value)?,
            TAG_PATTERN_WIDTH => state.pattern_width = segment.value as u16,
            TAG_PATTERN_HEIGHT => state.pattern_height = segment.value as u16,
            TAG_COMPONENTS_PER_SAMPLE => state.components_per_sample = segment.value as u16,
            TAG_BITS_PER_COMPONENT => state.bits_per_component = segment.value as u8,
            TAG_LOWPASS_PRECISION => state.lowpass_precision = segment.value as u8,
            TAG_ENABLED_PARTS => state.enabled_parts = segment.value as u16,
            TAG_CHANNEL_COUNT => state.channel_count = segment.value as u16,
            TAG_PRESCALE_SHIFT => {
                state.prescale = unpack_prescale_table(segment.value);
                prescale_seen = true;
            }
            TAG_CHANNEL_NUMBER => {
                // The first channel header: header phase is over. Re-dispatch this segment to
                // the channel loop by handling it here directly (channel number is always 0 for
                // the first channel) and returning.
                state.channel_number = segment.value as u16;
                if !prescale_seen {
                    state.prescale = crate::state::default_prescale_table(state.bits_per_component);
                }
                return Ok((state, format));
            }
            other if other < 0 => continue, // unrecognised optional parameter segment
            _ => return syntax_error("unexpected required tag while parsing the bitstream header"),
        }
    }
}

/// Writes the end marker that closes the bitstream.
pub fn write_trailer<B: ByteStream>(stream: &mut B) -> Result<()> {
    put_segment(stream, Segment::new(TAG_END_MARKER, END_MARKER_VALUE))
}

/// Reads and validates the end marker.
pub fn read_trailer<B: ByteStream>(stream: &mut B) -> Result<()> {
    let segment = get_segment(stream)?;
    if segment.tag != TAG_END_MARKER || segment.value != END_MARKER_VALUE {
        return syntax_error("missing or malformed end marker");
    }
    Ok(())
}

// ---------------------------------------------------------------------------------------------
// Per-channel encode / decode
// ---------------------------------------------------------------------------------------------

/// Runs the forward three-level wavelet cascade over one channel's component array, then emits
/// the channel header and, for each of the ten subbands in decode order, a subband header
/// followed by its entropy-coded (or, for the lowpass, raw) band and band-end trailer.
pub fn encode_channel<B: ByteStream>(
    stream: &mut B,
    channel_number: u16,
    component: &ComponentArray,
    state: &CodecState,
) -> Result<()> {
    put_segment(stream, Segment::new(TAG_CHANNEL_NUMBER, channel_number as i16))?;
    put_segment(stream, Segment::new(TAG_CHANNEL_WIDTH, component.width() as i16))?;
    put_segment(stream, Segment::new(TAG_CHANNEL_HEIGHT, component.height() as i16))?;

    let dims = level_dims(component.width(), component.height());
    let mut levels: Vec<Wavelet> = Vec::with_capacity(MAX_WAVELET_COUNT);

    let mut input_rows: Vec<Vec<i32>> = (0..component.height()).map(|y| component.row(y).to_vec()).collect();
    for level in 0..MAX_WAVELET_COUNT {
        let (w, h) = dims[level];
        let mut wavelet = Wavelet::new(w, h);
        analyze_level(&input_rows, state.prescale[level] as u32, quant_vector(state, level), QUANT_ROUNDING, &mut wavelet);
        input_rows = band_rows(&wavelet, Band::Ll);
        levels.push(wavelet);
    }

    for subband in 0..=9u8 {
        let (level, band) = subband_to_level_band(subband)?;
        let divisor = state.subband_divisor(subband);
        put_segment(stream, Segment::new(TAG_SUBBAND_NUMBER, subband as i16))?;
        put_segment(stream, Segment::new(TAG_QUANTIZATION, divisor as i16))?;
        encode_subband_body(stream, &levels[level], band, state.lowpass_precision as u32)?;
    }

    Ok(())
}

fn encode_subband_body<B: ByteStream>(stream: &mut B, wavelet: &Wavelet, band: Band, lowpass_precision: u32) -> Result<()> {
    if band == Band::Ll {
        let coefficients = flatten_band(wavelet, Band::Ll);
        let mut tally: TallyReader<'_, B, AdditiveTally> = TallyReader::new(stream);
        {
            let mut writer = BitWriter::new(&mut tally);
            encode_lowpass(&mut writer, &coefficients, lowpass_precision)?;
            writer.align_word()?;
        }
        let checksum = tally.value();
        put_segment(stream, Segment::new(TAG_BAND_END_TRAILER, checksum as i16))
    } else {
        let coefficients = flatten_band(wavelet, band);
        let mut tally: TallyReader<'_, B, AdditiveTally> = TallyReader::new(stream);
        {
            let mut writer = BitWriter::new(&mut tally);
            encode_band(&mut writer, &coefficients)?;
            writer.align_word()?;
        }
        let checksum = tally.value();
        put_segment(stream, Segment::new(TAG_BAND_END_TRAILER, checksum as i16))
    }
}

fn decode_subband_body<B: ByteStream>(stream: &mut B, count: usize, is_lowpass: bool, lowpass_precision: u32) -> Result<Vec<i32>> {
    let mut tally: TallyReader<'_, B, AdditiveTally> = TallyReader::new(stream);
    let coefficients = {
        let mut reader = BitReader::new(&mut tally);
        let coefficients =
            if is_lowpass { decode_lowpass(&mut reader, count, lowpass_precision)? } else { decode_band(&mut reader, count)? };
        reader.align_word();
        coefficients
    };
    let checksum = tally.value();
    let trailer = get_value(stream, TAG_BAND_END_TRAILER)?;
    if trailer as u16 as u32 != checksum {
        return syntax_error("band-end trailer checksum mismatch");
    }
    Ok(coefficients)
}

/// Mirrors [`encode_channel`]: reads a channel header (the `ChannelNumber` segment must already
/// have been consumed by the caller, per the strict state machine) plus its width/height, then
/// the ten subband headers and bodies, and reconstructs the channel's component array via the
/// coarse-to-fine inverse wavelet cascade.
pub fn decode_channel<B: ByteStream>(stream: &mut B, state: &mut CodecState) -> Result<ComponentArray> {
    state.channel_width = get_value(stream, TAG_CHANNEL_WIDTH)? as u16;
    state.channel_height = get_value(stream, TAG_CHANNEL_HEIGHT)? as u16;

    let width = state.channel_width as usize;
    let height = state.channel_height as usize;
    let dims = level_dims(width, height);
    let mut levels: Vec<Wavelet> = dims.iter().map(|&(w, h)| Wavelet::new(w, h)).collect();

    for expected_subband in 0..=9u8 {
        let subband = get_value(stream, TAG_SUBBAND_NUMBER)? as u8;
        if subband != expected_subband {
            return syntax_error("subband number out of sequence");
        }
        state.subband_number = subband;
        let divisor = get_value(stream, TAG_QUANTIZATION)? as u16;
        state.quantization[subband as usize] = divisor;

        let (level, band) = subband_to_level_band(subband)?;
        let (level_w, level_h) = dims[level];
        let count = level_w * level_h;
        let is_lowpass = band == Band::Ll;
        let coefficients = decode_subband_body(stream, count, is_lowpass, state.lowpass_precision as u32)?;

        if !is_lowpass {
            levels[level].set_quant(band, divisor);
        }
        unflatten_into(&mut levels[level], band, &coefficients);
    }

    // Reconstruct coarse-to-fine: level[2] -> level[1]'s LL input -> level[0]'s LL input ->
    // the final component array.
    for level in (1..MAX_WAVELET_COUNT).rev() {
        let (target_w, target_h) = dims[level - 1];
        let rows = synthesize_level(&levels[level], target_w, target_h);
        inject_rows(&mut levels[level - 1], Band::Ll, &rows);
    }
    let final_rows = synthesize_level(&levels[0], width, height);

    let mut component = ComponentArray::new(width, height, width, state.bits_per_component)?;
    for (y, row) in final_rows.iter().enumerate() {
        component.row_mut(y).copy_from_slice(row);
    }
    Ok(component)
}

// ---------------------------------------------------------------------------------------------
// Whole-image encode / decode
// ---------------------------------------------------------------------------------------------

/// Encodes every channel of `image` (already unpacked into per-channel component arrays) as one
/// complete VC-5 bitstream: header, one channel section per array, trailer.
pub fn encode_image<B: ByteStream>(stream: &mut B, image: &[ComponentArray], params: &EncoderParameters) -> Result<()> {
    let mut state = CodecState::new();
    state.image_width = params.width;
    state.image_height = params.height;
    state.bits_per_component = params.bits_per_component;
    state.components_per_sample = params.pixel_format.components_per_sample() as u16;
    state.channel_count = image.len() as u16;
    state.quantization = params.quantization;
    state.enabled_parts = params.enabled_parts;
    state.prescale = crate::state::default_prescale_table(params.bits_per_component);

    write_header(stream, &state, params.pixel_format)?;
    for (index, component) in image.iter().enumerate() {
        // `encode_channel` writes its own `ChannelNumber` segment, including for the first
        // channel: the header phase ends the moment that tag appears (see `read_header`).
        encode_channel(stream, index as u16, component, &state)?;
    }
    write_trailer(stream)
}

/// Decodes a complete VC-5 bitstream into a [`DecodedImage`].
pub fn decode_image<B: ByteStream>(stream: &mut B) -> Result<DecodedImage> {
    let (mut state, _format) = read_header(stream)?;
    let channel_count = state.channel_count.max(1);

    let mut channels = Vec::with_capacity(channel_count as usize);
    for expected_channel in 0..channel_count {
        if expected_channel > 0 {
            let channel_number = get_value(stream, TAG_CHANNEL_NUMBER)? as u16;
            if channel_number != expected_channel {
                return syntax_error("channel number out of sequence");
            }
        }
        state.channel_number = expected_channel;
        channels.push(decode_channel(stream, &mut state)?);
    }

    read_trailer(stream)?;
    Ok(DecodedImage { width: state.image_width as usize, height: state.image_height as usize, channels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vc5_core::io::BufferByteStream;

    fn ramp_component(width: usize, height: usize) -> ComponentArray {
        let mut component = ComponentArray::new(width, height, width, 8).unwrap();
        for y in 0..height {
            for (x, sample) in component.row_mut(y).iter_mut().enumerate() {
                *sample = ((x * 3 + y * 7) % 251) as i32;
            }
        }
        component
    }

    #[test]
    fn verify_header_round_trip_with_default_prescale_omitted() {
        let mut bs = BufferByteStream::new();
        let mut state = CodecState::new();
        state.image_width = 64;
        state.image_height = 32;
        state.bits_per_component = 8;
        state.channel_count = 1;
        write_header(&mut bs, &state, PixelFormatTag::Rg48).unwrap();
        put_segment(&mut bs, Segment::new(TAG_CHANNEL_NUMBER, 0)).unwrap();

        bs.rewind().unwrap();
        let (decoded, format) = read_header(&mut bs).unwrap();
        assert_eq!(decoded.image_width, 64);
        assert_eq!(decoded.image_height, 32);
        assert_eq!(format, PixelFormatTag::Rg48);
        assert_eq!(decoded.prescale, crate::state::DEFAULT_PRESCALE_8_BIT);
    }

    #[test]
    fn verify_header_round_trip_with_nondefault_prescale() {
        let mut bs = BufferByteStream::new();
        let mut state = CodecState::new();
        state.image_width = 16;
        state.image_height = 16;
        state.bits_per_component = 12;
        state.prescale = [1, 2, 3];
        write_header(&mut bs, &state, PixelFormatTag::Byr4).unwrap();
        put_segment(&mut bs, Segment::new(TAG_CHANNEL_NUMBER, 0)).unwrap();

        bs.rewind().unwrap();
        let (decoded, _format) = read_header(&mut bs).unwrap();
        assert_eq!(decoded.prescale, [1, 2, 3]);
    }

    #[test]
    fn verify_single_channel_round_trip_identity_quantization() {
        let width = 32usize;
        let height = 24usize;
        let component = ramp_component(width, height);

        let mut state = CodecState::new();
        state.quantization = [1; 10];
        state.bits_per_component = 8;
        state.prescale = [0, 0, 0];
        state.lowpass_precision = 16;

        let mut bs = BufferByteStream::new();
        encode_channel(&mut bs, 0, &component, &state).unwrap();
        bs.rewind().unwrap();

        let mut decode_state = state.clone();
        let decoded = decode_channel(&mut bs, &mut decode_state).unwrap();

        assert_eq!(decoded.width(), width);
        assert_eq!(decoded.height(), height);
        for y in 0..height {
            assert_eq!(decoded.row(y), component.row(y), "row {y} mismatch");
        }
    }

    #[test]
    fn verify_whole_image_round_trip_identity_quantization() {
        let width = 16usize;
        let height = 16usize;
        let channel_a = ramp_component(width, height);
        let channel_b = ramp_component(width, height);

        let mut params = EncoderParameters::new(width as u16, height as u16, PixelFormatTag::Byr3, 8);
        params.quantization = [1; 10];

        let mut bs = BufferByteStream::new();
        encode_image(&mut bs, &[channel_a.clone(), channel_b.clone()], &params).unwrap();
        bs.rewind().unwrap();

        let decoded = decode_image(&mut bs).unwrap();
        assert_eq!(decoded.channels.len(), 2);
        for y in 0..height {
            assert_eq!(decoded.channels[0].row(y), channel_a.row(y));
            assert_eq!(decoded.channels[1].row(y), channel_b.row(y));
        }
    }

    #[test]
    fn verify_non_identity_quantization_round_trips_approximately() {
        let width = 16usize;
        let height = 16usize;
        let component = ramp_component(width, height);

        let mut state = CodecState::new();
        state.bits_per_component = 8;
        state.prescale = [0, 0, 0];
        state.lowpass_precision = 16;

        let mut bs = BufferByteStream::new();
        encode_channel(&mut bs, 0, &component, &state).unwrap();
        bs.rewind().unwrap();

        let mut decode_state = state.clone();
        let decoded = decode_channel(&mut bs, &mut decode_state).unwrap();

        let total_divisor: i64 = state.quantization[1..].iter().map(|&d| d as i64).sum();
        for y in 0..height {
            for x in 0..width {
                let diff = (decoded.row(y)[x] - component.row(y)[x]).unsigned_abs() as i64;
                assert!(diff <= total_divisor, "pixel ({x},{y}) differs by {diff}, bound {total_divisor}");
            }
        }
    }
}
