//! Strict left-to-right reader over a payload slice.
//!
//! The wire layout is fixed by the negotiated output configuration, so the
//! cursor never backtracks and never skips; every read either consumes
//! exactly its field or fails the whole payload.

use crate::{Error, Result};

pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos + len;
        if end > self.buf.len() {
            return Err(Error::NotEnoughData {
                actual: self.buf.len(),
                minimum: end,
            });
        }
        let dat = &self.buf[self.pos..end];
        self.pos = end;
        Ok(dat)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        let d = self.take(4)?;
        Ok(u32::from_le_bytes([d[0], d[1], d[2], d[3]]))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        let d = self.take(8)?;
        Ok(u64::from_le_bytes([
            d[0], d[1], d[2], d[3], d[4], d[5], d[6], d[7],
        ]))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        let d = self.take(4)?;
        Ok(f32::from_le_bytes([d[0], d[1], d[2], d[3]]))
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }
}
