//! Byte-source capabilities consumed by the streaming reader.

use std::io::{self, Read, Seek, SeekFrom};

/// A blocking byte source.
///
/// `pull` fills as much of `buf` as the source can provide and returns the
/// byte count; `Ok(0)` means the source is exhausted. `rewind` steps the
/// position back by `n` bytes when the source supports repositioning;
/// sources without that capability report `Ok(false)` and are left alone.
///
/// Every [`Read`] implementor is a `Source` without the rewind capability;
/// wrap `Read + Seek` values in [`Seekable`] to grant it.
pub trait Source {
    /// Pull up to `buf.len()` bytes from the source.
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Step the position back by `n` bytes, if supported.
    fn rewind(&mut self, n: u64) -> io::Result<bool> {
        let _ = n;
        Ok(false)
    }
}

impl<R: Read> Source for R {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read(buf)
    }
}

/// Wrapper granting the rewind capability to `Read + Seek` sources.
///
/// The reader uses rewind to hand back bytes that were pulled past the end
/// of the compressed data, leaving the source positioned at the first
/// trailing byte.
#[derive(Debug)]
pub struct Seekable<R> {
    inner: R,
}

impl<R> Seekable<R> {
    /// Wrap a seekable stream.
    pub fn new(inner: R) -> Seekable<R> {
        Seekable { inner }
    }

    /// Get a reference to the inner stream.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Get a mutable reference to the inner stream.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the wrapper and return the inner stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> Source for Seekable<R> {
    fn pull(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    fn rewind(&mut self, n: u64) -> io::Result<bool> {
        self.inner.seek(SeekFrom::Current(-(n as i64)))?;
        Ok(true)
    }
}
