// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::Result;
use crate::io::ByteStream;

/// A file-backed [`ByteStream`].
///
/// Supports random-access positional I/O via [`ByteStream::get_block_at`] /
/// [`ByteStream::put_block_at`], which save the current position, seek, transfer, and restore.
pub struct FileByteStream {
    file: File,
    pos: u64,
    byte_count: u64,
    error: bool,
}

impl FileByteStream {
    /// Opens `path` for reading.
    pub fn open(path: &std::path::Path) -> Result<Self> {
        let file = File::open(path).map_err(|_| crate::error::Vc5Error::Resource("could not open file for reading"))?;
        Ok(FileByteStream { file, pos: 0, byte_count: 0, error: false })
    }

    /// Creates (truncating) `path` for writing.
    pub fn create(path: &std::path::Path) -> Result<Self> {
        let file = File::create(path).map_err(|_| crate::error::Vc5Error::Resource("could not create file for writing"))?;
        Ok(FileByteStream { file, pos: 0, byte_count: 0, error: false })
    }
}

impl ByteStream for FileByteStream {
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
        self.file
            .read_exact(buf)
            .map_err(|_| crate::error::Vc5Error::Resource("FILE_READ"))?;
        self.pos += buf.len() as u64;
        self.byte_count += buf.len() as u64;
        Ok(())
    }

    fn put_block(&mut self, buf: &[u8]) -> Result<()> {
        if self.error {
            return Ok(());
        }
        self.file
            .write_all(buf)
            .map_err(|_| crate::error::Vc5Error::Resource("FILE_WRITE"))?;
        self.pos += buf.len() as u64;
        self.byte_count += buf.len() as u64;
        Ok(())
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|_| crate::error::Vc5Error::Resource("FILE_SEEK"))?;
        self.pos = offset;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.file.flush().map_err(|_| crate::error::Vc5Error::Resource("FILE_FLUSH"))
    }

    fn is_eof(&self) -> bool {
        match self.file.metadata() {
            Ok(meta) => self.pos >= meta.len(),
            Err(_) => true,
        }
    }

    fn position(&self) -> u64 {
        self.pos
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
