// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bespoke value encodings for tags whose payload is not a plain numeric vector.

use vc5_core::error::{syntax_error, Result};

use crate::base64;

/// The 16-byte pixel-format layout structure carried by the `PFMT` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbaLayout {
    pub bytes: [u8; 16],
}

/// How a special tag's text representation maps to (and from) its binary payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextProcessor {
    /// Base64 string, decoded to a fixed 16-byte `RGBALayout` structure (`PFMT`).
    PixelFormatLayout,
    /// Base64 string to/from an opaque binary blob (`ICCP`, `CVTD`, `VEND`, and the
    /// element-text forms `DPXh`, `MXFd`, `ACEh`).
    Base64Blob,
    /// Element text passed straight through, no transcoding (`XMPd`, `ALEd`).
    Passthrough,
    /// Hex-digit pairs to/from a 16-byte Universal Label (`U` type).
    HexUniversalLabel,
    /// Whitespace-separated FourCCs (`F` type).
    FourCcList,
    /// Hex-encoded UUID (`G` type).
    HexUuid,
}

/// Looks up the text processor for a tuple given its tag and wire type, per the special-tag
/// table in the tuple framework.
pub fn processor_for(tag: [u8; 4], ty: u8) -> TextProcessor {
    match &tag {
        b"PFMT" => TextProcessor::PixelFormatLayout,
        b"ICCP" | b"CVTD" | b"VEND" | b"DPXh" | b"MXFd" | b"ACEh" => TextProcessor::Base64Blob,
        b"XMPd" | b"ALEd" => TextProcessor::Passthrough,
        _ => match ty {
            b'U' => TextProcessor::HexUniversalLabel,
            b'F' => TextProcessor::FourCcList,
            b'G' => TextProcessor::HexUuid,
            _ => TextProcessor::Passthrough,
        },
    }
}

/// Decodes a hex-digit string (no separators) into raw bytes, used for `U` and `G` types.
fn decode_hex(text: &str) -> Result<Vec<u8>> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return syntax_error("hex payload: odd number of hex digits");
    }
    let mut bytes = Vec::with_capacity(text.len() / 2);
    let chars: Vec<char> = text.chars().collect();
    for pair in chars.chunks(2) {
        let byte_str: String = pair.iter().collect();
        let byte = u8::from_str_radix(&byte_str, 16).map_err(|_| vc5_core::error::Vc5Error::Syntax("invalid hex digit in payload"))?;
        bytes.push(byte);
    }
    Ok(bytes)
}

fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl TextProcessor {
    /// Converts element/attribute text into the tuple's binary payload.
    pub fn text_to_binary(&self, text: &str) -> Result<Vec<u8>> {
        match self {
            TextProcessor::PixelFormatLayout | TextProcessor::Base64Blob => {
                base64::decode(text).map(|b| b.into_vec()).ok_or(vc5_core::error::Vc5Error::Syntax("invalid base64 payload"))
            }
            TextProcessor::Passthrough => Ok(text.as_bytes().to_vec()),
            TextProcessor::HexUniversalLabel | TextProcessor::HexUuid => decode_hex(text),
            TextProcessor::FourCcList => {
                let mut bytes = Vec::new();
                for word in text.split_whitespace() {
                    if word.len() != 4 {
                        return syntax_error("FourCC list: element is not four characters");
                    }
                    bytes.extend_from_slice(word.as_bytes());
                }
                Ok(bytes)
            }
        }
    }

    /// Converts a tuple's binary payload into element/attribute text.
    pub fn binary_to_text(&self, binary: &[u8]) -> Result<String> {
        match self {
            TextProcessor::PixelFormatLayout | TextProcessor::Base64Blob => Ok(base64::encode(binary)),
            TextProcessor::Passthrough => {
                String::from_utf8(binary.to_vec()).map_err(|_| vc5_core::error::Vc5Error::Syntax("payload is not valid UTF-8 text"))
            }
            TextProcessor::HexUniversalLabel | TextProcessor::HexUuid => Ok(encode_hex(binary)),
            TextProcessor::FourCcList => {
                if binary.len() % 4 != 0 {
                    return syntax_error("FourCC list: payload is not a multiple of 4 bytes");
                }
                let words: Result<Vec<&str>> = binary
                    .chunks(4)
                    .map(|chunk| std::str::from_utf8(chunk).map_err(|_| vc5_core::error::Vc5Error::Syntax("FourCC is not valid UTF-8")))
                    .collect();
                Ok(words?.join(" "))
            }
        }
    }
}

impl RgbaLayout {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 16 {
            return syntax_error("PFMT payload must be exactly 16 bytes");
        }
        let mut layout = RgbaLayout::default();
        layout.bytes.copy_from_slice(bytes);
        Ok(layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_pfmt_routes_to_base64() {
        assert_eq!(processor_for(*b"PFMT", b'0'), TextProcessor::PixelFormatLayout);
    }

    #[test]
    fn verify_xmpd_passthrough_round_trip() {
        let processor = processor_for(*b"XMPd", b'0');
        let text = "<x:xmpmeta/>";
        let binary = processor.text_to_binary(text).unwrap();
        assert_eq!(processor.binary_to_text(&binary).unwrap(), text);
    }

    #[test]
    fn verify_hex_universal_label_round_trip() {
        let processor = TextProcessor::HexUniversalLabel;
        let bytes: Vec<u8> = (0..16).collect();
        let text = processor.binary_to_text(&bytes).unwrap();
        assert_eq!(processor.text_to_binary(&text).unwrap(), bytes);
    }

    #[test]
    fn verify_fourcc_list_round_trip() {
        let processor = TextProcessor::FourCcList;
        let text = "ABCD WXYZ";
        let binary = processor.text_to_binary(text).unwrap();
        assert_eq!(processor.binary_to_text(&binary).unwrap(), text);
    }

    #[test]
    fn verify_base64_blob_round_trip() {
        let processor = TextProcessor::Base64Blob;
        let bytes = vec![0, 1, 2, 255, 254];
        let text = processor.binary_to_text(&bytes).unwrap();
        assert_eq!(processor.text_to_binary(&text).unwrap(), bytes);
    }
}
