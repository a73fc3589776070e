// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `io` module implements the byte stream and bit stream layers of the bitstream model.
//!
//! A [`ByteStream`] is a sink/source of bytes backed by either a file or an in-memory buffer. It
//! tracks the cumulative number of bytes transferred and a sticky error flag: once set, further
//! reads return zero without touching the backing store, mirroring the reference decoder's "first
//! error wins" propagation policy.
//!
//! A word, as used throughout this module and the wire format, is 32 bits.

mod bit;
mod buffer;
mod file;
mod tally;

pub use bit::{BitReader, BitWriter, SampleOffsetStack, MAX_SAMPLE_OFFSET_DEPTH};
pub use buffer::BufferByteStream;
pub use file::FileByteStream;
pub use tally::{Tally, TallyReader};

use crate::error::{stream_error, Result};

/// `ByteStream` is a sink/source of bytes backed by either a file or an in-memory buffer.
pub trait ByteStream {
    /// Reads a single byte, advancing the stream position.
    fn get_byte(&mut self) -> Result<u8>;

    /// Writes a single byte, advancing the stream position.
    fn put_byte(&mut self, byte: u8) -> Result<()>;

    /// Reads a 32-bit word in wire (big-endian) byte order. On a short read, sets the sticky
    /// error flag and returns zero rather than a partial word.
    fn get_word(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        match self.get_block(&mut buf) {
            Ok(()) => Ok(u32::from_be_bytes(buf)),
            Err(err) => {
                self.set_error();
                let _ = err;
                Ok(0)
            }
        }
    }

    /// Writes a 32-bit word in wire (big-endian) byte order.
    fn put_word(&mut self, word: u32) -> Result<()> {
        self.put_block(&word.to_be_bytes())
    }

    /// Reads exactly `buf.len()` bytes at the current position.
    fn get_block(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Writes exactly `buf.len()` bytes at the current position.
    fn put_block(&mut self, buf: &[u8]) -> Result<()>;

    /// Saves the current position, seeks to `offset`, reads `buf.len()` bytes, then restores the
    /// saved position.
    fn get_block_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let saved = self.position();
        self.seek(offset)?;
        let result = self.get_block(buf);
        self.seek(saved)?;
        result
    }

    /// Saves the current position, seeks to `offset`, writes `buf`, then restores the saved
    /// position. Used to back-patch a chunk header's length field after its payload has been
    /// emitted.
    fn put_block_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        let saved = self.position();
        self.seek(offset)?;
        let result = self.put_block(buf);
        self.seek(saved)?;
        result
    }

    /// Seeks to an absolute byte offset.
    fn seek(&mut self, offset: u64) -> Result<()>;

    /// Seeks to the start of the stream and resets the byte count.
    fn rewind(&mut self) -> Result<()> {
        self.seek(0)
    }

    /// Advances the read cursor by `count` bytes without retaining the skipped data.
    fn skip(&mut self, count: u64) -> Result<()> {
        let pos = self.position();
        self.seek(pos + count)
    }

    /// Writes `count` zero bytes.
    fn pad(&mut self, count: u64) -> Result<()> {
        let zeros = [0u8; 64];
        let mut remaining = count as usize;
        while remaining > 0 {
            let n = remaining.min(zeros.len());
            self.put_block(&zeros[..n])?;
            remaining -= n;
        }
        Ok(())
    }

    /// Flushes any buffered writes to the backing store.
    fn flush(&mut self) -> Result<()>;

    /// Returns true if the read cursor is at or past the end of the stream.
    fn is_eof(&self) -> bool;

    /// The current absolute byte position.
    fn position(&self) -> u64;

    /// The cumulative number of bytes transferred since the stream was opened or last rewound.
    fn byte_count(&self) -> u64;

    /// Marks the stream as having encountered a sticky error.
    fn set_error(&mut self);

    /// Returns true once a sticky error has been recorded.
    fn has_error(&self) -> bool;
}

pub(crate) fn short_read<T>() -> Result<T> {
    stream_error("short read: fewer bytes available than requested")
}
