// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::Result;
use crate::io::{short_read, ByteStream};

/// An in-memory, contiguous [`ByteStream`] with a single read/write cursor.
///
/// Writes past the current length grow the buffer; reads past the current length are a short
/// read and set the sticky error flag.
pub struct BufferByteStream {
    data: Vec<u8>,
    pos: usize,
    byte_count: u64,
    error: bool,
}

impl BufferByteStream {
    /// Creates an empty, writable buffer stream.
    pub fn new() -> Self {
        BufferByteStream { data: Vec::new(), pos: 0, byte_count: 0, error: false }
    }

    /// Wraps an existing buffer for reading (and, if desired, in-place rewriting).
    pub fn from_vec(data: Vec<u8>) -> Self {
        BufferByteStream { data, pos: 0, byte_count: 0, error: false }
    }

    /// Consumes the stream, returning the underlying buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Borrows the underlying buffer.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for BufferByteStream {
    fn default() -> Self {
        Self::new()
    }
}

impl ByteStream for BufferByteStream {
    fn get_byte(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.get_block(&mut buf)?;
        Ok(buf[0])
    }

    fn put_byte(&mut self, byte: u8) -> Result<()> {
        self.put_block(&[byte])
    }

    fn get_block(&mut self, buf: &mut [u8]) -> Result<()> {
        if self.error {
            buf.fill(0);
            return Ok(());
        }
        if self.pos + buf.len() > self.data.len() {
            self.error = true;
            return short_read();
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        self.byte_count += buf.len() as u64;
        Ok(())
    }

    fn put_block(&mut self, buf: &[u8]) -> Result<()> {
        if self.error {
            return Ok(());
        }
        let end = self.pos + buf.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(buf);
        self.pos = end;
        self.byte_count += buf.len() as u64;
        Ok(())
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        self.pos = offset as usize;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn position(&self) -> u64 {
        self.pos as u64
    }

    fn byte_count(&self) -> u64 {
        self.byte_count
    }

    fn set_error(&mut self) {
        self.error = true;
    }

    fn has_error(&self) -> bool {
        self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_word_round_trip() {
        let mut bs = BufferByteStream::new();
        bs.put_word(0x1A2B00C8).unwrap();
        assert_eq!(bs.as_slice(), &[0x1A, 0x2B, 0x00, 0xC8]);

        bs.rewind().unwrap();
        assert_eq!(bs.get_word().unwrap(), 0x1A2B00C8);
    }

    #[test]
    fn verify_block_at_back_patch() {
        let mut bs = BufferByteStream::new();
        bs.put_word(0).unwrap();
        bs.put_block(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]).unwrap();
        bs.put_block_at(0, &3u32.to_be_bytes()).unwrap();
        assert_eq!(&bs.as_slice()[0..4], &3u32.to_be_bytes());
        assert_eq!(bs.position(), 16);
    }

    #[test]
    fn verify_short_read_sets_sticky_error() {
        let mut bs = BufferByteStream::from_vec(vec![0xff]);
        assert_eq!(bs.get_word().unwrap(), 0);
        assert!(bs.has_error());
        assert_eq!(bs.get_byte().unwrap(), 0);
    }
}
