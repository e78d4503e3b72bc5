// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Byte sinks and sources for the codec.

use std::io::{self, Read, Write};

/// Destination of encoded bytes.
pub trait ByteSink {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl ByteSink for Vec<u8> {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_bytes(bytes)
    }
}

/// Origin of encoded bytes.
pub trait ByteSource {
    /// Fill `buf` completely or fail with [`io::ErrorKind::UnexpectedEof`].
    fn read_exact_into(&mut self, buf: &mut [u8]) -> io::Result<()>;

    /// Bytes consumed so far.
    fn position(&self) -> usize;

    /// Bytes left, when known.
    fn remaining(&self) -> Option<usize> {
        None
    }
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_exact_into(&mut self, buf: &mut [u8]) -> io::Result<()> {
        (**self).read_exact_into(buf)
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn remaining(&self) -> Option<usize> {
        (**self).remaining()
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Read cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Unread tail of the buffer.
    pub fn rest(&self) -> &'a [u8] {
        &self.buffer[self.offset..]
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_exact_into(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let end = self.offset + buf.len();
        if end > self.buffer.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected end of buffer",
            ));
        }
        buf.copy_from_slice(&self.buffer[self.offset..end]);
        self.offset = end;
        Ok(())
    }

    fn position(&self) -> usize {
        self.offset
    }

    fn remaining(&self) -> Option<usize> {
        Some(self.buffer.len().saturating_sub(self.offset))
    }
}

// ---------------------------------------------------------------------------
// std::io adapters
// ---------------------------------------------------------------------------

/// [`ByteSink`] over any [`Write`].
#[derive(Debug)]
pub struct IoSink<W: Write> {
    inner: W,
    written: usize,
}

impl<W: Write> IoSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    pub fn bytes_written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> ByteSink for IoSink<W> {
    fn write_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }
}

/// [`ByteSource`] over any [`Read`].
#[derive(Debug)]
pub struct IoSource<R: Read> {
    inner: R,
    position: usize,
}

impl<R: Read> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, position: 0 }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read_exact_into(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.inner.read_exact(buf)?;
        self.position += buf.len();
        Ok(())
    }

    fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_source_bounds() {
        let mut src = SliceSource::new(&[1, 2, 3]);
        let mut two = [0u8; 2];
        src.read_exact_into(&mut two).unwrap();
        assert_eq!(two, [1, 2]);
        assert_eq!(src.remaining(), Some(1));

        let err = src.read_exact_into(&mut two).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        // failed reads do not advance
        assert_eq!(src.position(), 2);
        assert_eq!(src.rest(), &[3]);
    }

    #[test]
    fn io_adapters_track_counts() {
        let mut sink = IoSink::new(Vec::new());
        sink.write_bytes(&[9, 8, 7]).unwrap();
        assert_eq!(sink.bytes_written(), 3);

        let bytes = sink.into_inner();
        let mut src = IoSource::new(bytes.as_slice());
        let mut buf = [0u8; 3];
        src.read_exact_into(&mut buf).unwrap();
        assert_eq!(buf, [9, 8, 7]);
        assert_eq!(src.position(), 3);
        assert!(src.remaining().is_none());
    }
}
