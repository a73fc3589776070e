// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A running tally wrapped around a [`ByteStream`], used to verify a band's trailer checksum
//! against the bytes actually transferred for that band.

use crate::error::Result;
use crate::io::ByteStream;

/// Accumulates a running value over a sequence of bytes.
pub trait Tally: Default {
    /// Folds one byte into the running value.
    fn feed(&mut self, byte: u8);

    /// Returns the accumulated value.
    fn value(&self) -> u32;
}

/// The additive tally used for band-end trailers: a 16-bit sum of the bytes transferred since the
/// tally was last reset, matching the reference decoder's per-band checksum.
#[derive(Debug, Default, Clone, Copy)]
pub struct AdditiveTally {
    sum: u32,
}

impl Tally for AdditiveTally {
    fn feed(&mut self, byte: u8) {
        self.sum = self.sum.wrapping_add(byte as u32);
    }

    fn value(&self) -> u32 {
        self.sum & 0xffff
    }
}

/// Wraps a [`ByteStream`] and folds every byte transferred through it into a [`Tally`].
pub struct TallyReader<'a, B: ByteStream, T: Tally = AdditiveTally> {
    inner: &'a mut B,
    tally: T,
}

impl<'a, B: ByteStream, T: Tally> TallyReader<'a, B, T> {
    /// Wraps `inner`, starting from a fresh tally.
    pub fn new(inner: &'a mut B) -> Self {
        TallyReader { inner, tally: T::default() }
    }

    /// Returns the tally's current value.
    pub fn value(&self) -> u32 {
        self.tally.value()
    }

    /// Resets the tally to its initial state without affecting the underlying stream.
    pub fn reset(&mut self) {
        self.tally = T::default();
    }
}

impl<'a, B: ByteStream, T: Tally> ByteStream for TallyReader<'a, B, T> {
    fn get_byte(&mut self) -> Result<u8> {
        let byte = self.inner.get_byte()?;
        self.tally.feed(byte);
        Ok(byte)
    }

    fn put_byte(&mut self, byte: u8) -> Result<()> {
        self.tally.feed(byte);
        self.inner.put_byte(byte)
    }

    fn get_block(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.get_block(buf)?;
        for &byte in buf.iter() {
            self.tally.feed(byte);
        }
        Ok(())
    }

    fn put_block(&mut self, buf: &[u8]) -> Result<()> {
        for &byte in buf.iter() {
            self.tally.feed(byte);
        }
        self.inner.put_block(buf)
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(offset)
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn is_eof(&self) -> bool {
        self.inner.is_eof()
    }

    fn position(&self) -> u64 {
        self.inner.position()
    }

    fn byte_count(&self) -> u64 {
        self.inner.byte_count()
    }

    fn set_error(&mut self) {
        self.inner.set_error()
    }

    fn has_error(&self) -> bool {
        self.inner.has_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BufferByteStream;

    #[test]
    fn verify_tally_accumulates_over_writes() {
        let mut bs = BufferByteStream::new();
        {
            let mut t: TallyReader<_> = TallyReader::new(&mut bs);
            t.put_block(&[1, 2, 3, 4]).unwrap();
            assert_eq!(t.value(), 10);
        }
    }

    #[test]
    fn verify_tally_reset() {
        let mut bs = BufferByteStream::new();
        let mut t: TallyReader<_> = TallyReader::new(&mut bs);
        t.put_byte(200).unwrap();
        t.reset();
        t.put_byte(5).unwrap();
        assert_eq!(t.value(), 5);
    }
}
