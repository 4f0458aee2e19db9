//! Bounds-checked big-endian cursor over a byte slice.

use std::mem;

use bytemuck::AnyBitPattern;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, position: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn remaining(&self) -> &'a [u8] {
        &self.buf[self.position..]
    }

    fn end_of_data(&self, wanted: usize) -> Error {
        Error::from(format!(
            "reached end of data at offset {} while reading {} byte(s)",
            self.position, wanted
        ))
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        let [b] = self.read_array::<1>()?;
        Ok(b)
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub(crate) fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.read_slice(N)?;
        let mut out = [0; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub(crate) fn read_slice(&mut self, count: usize) -> Result<&'a [u8]> {
        if self.remaining().len() < count {
            Err(self.end_of_data(count))
        } else {
            let slice = &self.remaining()[..count];
            self.position += count;
            Ok(slice)
        }
    }

    /// Reads a fixed-layout record made entirely of byte arrays.
    pub(crate) fn read_obj<T: AnyBitPattern>(&mut self) -> Result<&'a T> {
        assert_eq!(mem::align_of::<T>(), 1);

        let bytes = self.read_slice(mem::size_of::<T>())?;
        Ok(bytemuck::from_bytes(bytes))
    }
}
