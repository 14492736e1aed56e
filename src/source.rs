//! Random-access byte sources an archive is read from.

use std::io::{Read, Seek, SeekFrom};

use crate::error::{Result, RresError};

/// Random-access reads keyed by absolute offset and length.
pub trait ByteSource {
    /// Reads exactly `len` bytes starting at `offset`.
    ///
    /// Fails with [`RresError::TruncatedInput`] when the source ends early.
    fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>>;
}

impl<R: Read + Seek> ByteSource for R {
    fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>> {
        self.seek(SeekFrom::Start(offset))?;
        // `len` comes from untrusted size fields; only allocate what the source really has
        let mut buf = Vec::with_capacity(len.min(64 * 1024));
        self.by_ref().take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(RresError::TruncatedInput {
                offset,
                needed: len as u64,
            });
        }
        Ok(buf)
    }
}
