//! Checksumming byte reader
//!
//! Every byte handed to the parser is also folded into the running file
//! CRC, so that after the two trailing checksum bytes have been consumed
//! the accumulator of a well-formed file is zero.

use std::io::{ErrorKind, Read};

use crate::crc::Crc;
use crate::{FitError, Result};

/// A Read wrapper that computes a checksum over data read and counts the
/// bytes consumed since the last reset.
pub(crate) struct CrcReader<R: Read> {
    base: R,
    crc: Crc,
    bytes_read: u32,
}

impl<R: Read> CrcReader<R> {
    pub(crate) fn new(base: R) -> Self {
        Self {
            base,
            crc: Crc::new(),
            bytes_read: 0,
        }
    }

    /// Reads a single byte.
    ///
    /// `what` names the structure being read and is surfaced in the
    /// unexpected-EOF error if the source runs dry.
    pub(crate) fn read_u8(&mut self, what: &'static str) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf, what)?;
        Ok(buf[0])
    }

    /// Fills `buf` exactly, mapping a short read to the distinct
    /// unexpected-EOF error.
    pub(crate) fn read_exact(&mut self, buf: &mut [u8], what: &'static str) -> Result<()> {
        match self.base.read_exact(buf) {
            Ok(()) => {
                self.crc.add_bytes(buf);
                self.bytes_read += buf.len() as u32;
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => {
                Err(FitError::UnexpectedEof(what))
            }
            Err(err) => Err(FitError::Io(err)),
        }
    }

    /// Consumes and discards `n` bytes, still feeding them through the CRC.
    pub(crate) fn discard(&mut self, mut n: u32, what: &'static str) -> Result<()> {
        let mut chunk = [0u8; 256];
        while n > 0 {
            let len = (n as usize).min(chunk.len());
            self.read_exact(&mut chunk[..len], what)?;
            n -= len as u32;
        }
        Ok(())
    }

    /// Bytes consumed since construction or the last `reset_count`.
    pub(crate) fn bytes_read(&self) -> u32 {
        self.bytes_read
    }

    /// Marks the start of the data region.
    pub(crate) fn reset_count(&mut self) {
        self.bytes_read = 0;
    }

    pub(crate) fn crc_sum(&self) -> u16 {
        self.crc.sum()
    }
}
