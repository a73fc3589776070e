// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `error` module defines the taxonomy of errors reported by the codec core.
//!
//! The seven kinds below mirror the reference implementation's error subsystems rather than
//! transport-level `std::io::Error` kinds: a `Stream` failure and a `Syntax` failure are both
//! surfaced to callers as `Vc5Error`, never as a raw `io::Error`.

use std::fmt;

/// `Vc5Error` enumerates every way the codec core can fail.
#[derive(Debug)]
pub enum Vc5Error {
    /// The underlying byte stream failed or ended prematurely.
    Stream(&'static str),
    /// The bitstream is ill-formed: missing start marker, duplicate header parameter, a required
    /// parameter presented as optional, an invalid or unexpected tag, a bad section tag.
    Syntax(&'static str),
    /// A value read from the bitstream is out of range for its field (band index, subband,
    /// channel, precision, quantization divisor, pattern dimensions, component count).
    Value(&'static str),
    /// Allocation failed, or a file could not be opened, created, seeked, or flushed.
    Resource(&'static str),
    /// An unknown pixel or image format, or a VC-5 part not enabled at build time.
    Unsupported(&'static str),
    /// A command-line argument was missing or malformed, or usage was requested.
    Application(&'static str),
}

impl fmt::Display for Vc5Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vc5Error::Stream(msg) => write!(f, "stream error: {msg}"),
            Vc5Error::Syntax(msg) => write!(f, "bitstream syntax error: {msg}"),
            Vc5Error::Value(msg) => write!(f, "value out of range: {msg}"),
            Vc5Error::Resource(msg) => write!(f, "resource error: {msg}"),
            Vc5Error::Unsupported(msg) => write!(f, "unsupported: {msg}"),
            Vc5Error::Application(msg) => write!(f, "application error: {msg}"),
        }
    }
}

impl std::error::Error for Vc5Error {}

impl From<std::io::Error> for Vc5Error {
    fn from(err: std::io::Error) -> Vc5Error {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof => Vc5Error::Stream("unexpected end of stream"),
            std::io::ErrorKind::NotFound => Vc5Error::Resource("file not found"),
            _ => Vc5Error::Stream("i/o operation failed"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Vc5Error>;

/// Convenience function to create a stream error.
pub fn stream_error<T>(msg: &'static str) -> Result<T> {
    Err(Vc5Error::Stream(msg))
}

/// Convenience function to create a syntax error.
pub fn syntax_error<T>(msg: &'static str) -> Result<T> {
    Err(Vc5Error::Syntax(msg))
}

/// Convenience function to create a value error.
pub fn value_error<T>(msg: &'static str) -> Result<T> {
    Err(Vc5Error::Value(msg))
}

/// Convenience function to create a resource error.
pub fn resource_error<T>(msg: &'static str) -> Result<T> {
    Err(Vc5Error::Resource(msg))
}

/// Convenience function to create an unsupported-feature error.
pub fn unsupported_error<T>(msg: &'static str) -> Result<T> {
    Err(Vc5Error::Unsupported(msg))
}

/// Convenience function to create an application (CLI) error.
pub fn application_error<T>(msg: &'static str) -> Result<T> {
    Err(Vc5Error::Application(msg))
}
