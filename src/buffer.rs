//! Accumulation buffer

use std::io::{self, Write};

use crate::error::Error;

///Fixed capacity accumulation buffer
///
///Collects engine output until it is flushed to sink.
///Filled part never exceeds capacity: callers take room via [Buffer::spare_mut] and commit what
///they wrote with [Buffer::advance].
pub struct Buffer {
    inner: Vec<u8>,
    consumed: usize,
}

impl Buffer {
    ///Allocates buffer of `capacity` bytes.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::Params("buffer capacity must be non-zero"));
        }

        let mut inner = Vec::new();
        inner.try_reserve_exact(capacity).map_err(|_| Error::Allocation {
            what: "accumulation buffer",
            size: capacity,
        })?;
        inner.resize(capacity, 0);

        Ok(Self {
            inner,
            consumed: 0,
        })
    }

    #[inline(always)]
    ///Returns capacity
    pub fn capacity(&self) -> usize {
        self.inner.len()
    }

    #[inline(always)]
    ///Returns number of filled bytes
    pub fn len(&self) -> usize {
        self.consumed
    }

    #[inline(always)]
    ///Returns whether nothing is filled
    pub fn is_empty(&self) -> bool {
        self.consumed == 0
    }

    #[inline(always)]
    ///Returns whether buffer has no room left
    pub fn is_full(&self) -> bool {
        self.consumed == self.inner.len()
    }

    #[inline(always)]
    ///Returns room left
    pub fn remaining(&self) -> usize {
        self.inner.len() - self.consumed
    }

    #[inline(always)]
    ///Returns filled part
    pub fn data(&self) -> &[u8] {
        &self.inner[..self.consumed]
    }

    #[inline(always)]
    ///Returns room left for writing
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.inner[self.consumed..]
    }

    #[inline]
    ///Marks `len` bytes of spare room as filled.
    pub fn advance(&mut self, len: usize) {
        debug_assert!(len <= self.remaining());
        self.consumed = core::cmp::min(self.consumed + len, self.inner.len());
    }

    ///Writes filled part to `sink`.
    ///
    ///Buffer is emptied only when every byte is accepted. Sink accepting less is reported as
    ///[Error::ShortWrite] and filled part is left intact.
    ///
    ///Returns number of bytes written.
    pub fn flush<W: Write>(&mut self, sink: &mut W) -> Result<usize, Error> {
        if self.consumed == 0 {
            return Ok(0);
        }

        write_all(sink, &self.inner[..self.consumed])?;
        let written = self.consumed;
        self.consumed = 0;
        Ok(written)
    }
}

impl core::fmt::Debug for Buffer {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fmt.debug_struct("Buffer").field("capacity", &self.capacity()).field("len", &self.consumed).finish()
    }
}

///Writes whole `data` to `sink`, treating sink that stops accepting bytes as short write.
pub(crate) fn write_all<W: Write>(sink: &mut W, data: &[u8]) -> Result<(), Error> {
    let mut written = 0;
    while written < data.len() {
        match sink.write(&data[written..]) {
            Ok(0) => {
                return Err(Error::ShortWrite {
                    expected: data.len(),
                    written,
                })
            },
            Ok(size) => written += size,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error.into()),
        }
    }

    Ok(())
}
