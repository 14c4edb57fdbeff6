//! Streaming bzip2 decompression.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{debug, trace};

use marbas_core::{Error, Result, Seekable, Source};

use crate::codec::Decoder;
use crate::handle::Handle;
use crate::BUFFER_SIZE;

/// Options accepted by [`Reader`] constructors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReaderOptions {
    /// Decode with the codec's reduced-memory algorithm (slower, roughly
    /// halves the per-stream footprint).
    pub small: bool,
    /// Stop after the first compressed stream instead of decoding every
    /// concatenated stream.
    pub first_stream_only: bool,
    /// Drop (close) the underlying source when the reader is closed.
    pub autoclose: bool,
}

impl ReaderOptions {
    pub fn new() -> ReaderOptions {
        ReaderOptions::default()
    }

    /// Decode with the reduced-memory algorithm.
    pub fn small(mut self, small: bool) -> ReaderOptions {
        self.small = small;
        self
    }

    /// Decode only the first compressed stream.
    pub fn first_stream_only(mut self, first_stream_only: bool) -> ReaderOptions {
        self.first_stream_only = first_stream_only;
        self
    }

    /// Close the underlying source together with the reader.
    pub fn autoclose(mut self, autoclose: bool) -> ReaderOptions {
        self.autoclose = autoclose;
        self
    }
}

/// A reader that decompresses bzip2 data pulled from a [`Source`].
///
/// Concatenated compressed streams are decoded back to back into one
/// logical output by default. Bytes following the final stream are handed
/// back to sources with the rewind capability (see [`Seekable`]), leaving
/// the source positioned at the first trailing byte; on sources without it
/// the over-read bytes are lost.
///
/// `read` returning `Ok(0)` for a non-empty buffer is the authoritative
/// end-of-data signal. A zero-length read returns `Ok(0)` without advancing
/// anything.
///
/// Known limitation: a `pull` that returns fewer bytes than requested is
/// taken to mean the source is at its end. Sources that return short reads
/// mid-stream are not supported.
pub struct Reader<S: Source> {
    handle: Handle<S>,
    codec: Option<Decoder>,
    small: bool,
    first_stream_only: bool,
    /// Staged compressed bytes; `in_pos..` is not yet consumed by the codec.
    in_buf: Vec<u8>,
    in_pos: usize,
    in_exhausted: bool,
    /// Bytes the codec consumed since the current stream's init; the amount
    /// to hand back beyond the staged leftover when a follow-on stream
    /// turns out to be trailing data.
    stream_in: u64,
    /// Completed stream count. A missing signature with at least one
    /// completed stream is trailing data; on the first it is an error.
    streams: u32,
    done: bool,
    total_in: u64,
    total_out: u64,
}

impl<S: Source> Reader<S> {
    /// Create a reader with default options.
    pub fn new(source: S) -> Reader<S> {
        Reader::with_options(source, ReaderOptions::default())
    }

    /// Create a reader with the given options.
    pub fn with_options(source: S, options: ReaderOptions) -> Reader<S> {
        Reader {
            handle: Handle::new(source, options.autoclose),
            codec: Some(Decoder::new(options.small)),
            small: options.small,
            first_stream_only: options.first_stream_only,
            in_buf: Vec::new(),
            in_pos: 0,
            in_exhausted: false,
            stream_in: 0,
            streams: 0,
            done: false,
            total_in: 0,
            total_out: 0,
        }
    }

    /// Create a reader from a factory that opens the source.
    ///
    /// A factory failure propagates before any reader state exists, so
    /// nothing is left half-open.
    pub fn from_factory<F>(factory: F, options: ReaderOptions) -> Result<Reader<S>>
    where
        F: FnOnce() -> io::Result<S>,
    {
        Ok(Reader::with_options(factory()?, options))
    }

    /// Run `body` against a fresh reader, closing it on every exit path.
    ///
    /// A body that already closed the reader is fine; its result wins over
    /// any close failure.
    pub fn with<T, F>(source: S, options: ReaderOptions, body: F) -> Result<T>
    where
        F: FnOnce(&mut Reader<S>) -> Result<T>,
    {
        let mut reader = Reader::with_options(source, options);
        let outcome = body(&mut reader);
        match reader.close() {
            Ok(()) | Err(Error::Closed) => outcome,
            Err(close_err) => outcome.and(Err(close_err)),
        }
    }

    /// True once every compressed stream has been decoded and drained.
    ///
    /// This is advisory: it can still be false after the last byte has been
    /// delivered, until a read gives the codec the chance to see the stream
    /// end. `read` returning `Ok(0)` is the authoritative signal.
    pub fn eof(&self) -> bool {
        self.done
    }

    /// Total decompressed bytes delivered so far.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Release the codec state and close the reader.
    ///
    /// The first call succeeds; every later call fails with
    /// [`Error::Closed`]. With `autoclose` the underlying source is dropped
    /// here as well.
    pub fn close(&mut self) -> Result<()> {
        self.codec = None;
        self.handle.close()
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    pub fn autoclose(&self) -> bool {
        self.handle.autoclose()
    }

    /// Change the autoclose policy. Fails once the reader is closed.
    pub fn set_autoclose(&mut self, autoclose: bool) -> Result<()> {
        self.handle.set_autoclose(autoclose)
    }

    /// Get a reference to the underlying source.
    ///
    /// `None` once the reader was closed with autoclose in effect.
    pub fn get_ref(&self) -> Option<&S> {
        self.handle.get()
    }

    /// Get a mutable reference to the underlying source.
    pub fn get_mut(&mut self) -> Option<&mut S> {
        self.handle.get_mut()
    }

    /// Consume the reader and return the underlying source.
    ///
    /// Fails with [`Error::Closed`] when an autoclosing close already
    /// dropped the source.
    pub fn into_inner(mut self) -> Result<S> {
        self.codec = None;
        self.handle.release()
    }

    /// Decode into `out` until it is full or the logical stream ends.
    fn fill(&mut self, out: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < out.len() && !self.done {
            if self.in_pos == self.in_buf.len() && !self.in_exhausted {
                self.refill()?;
            }

            let Some(codec) = self.codec.as_mut() else {
                break;
            };
            let input = &self.in_buf[self.in_pos..];

            let step = match codec.step(input, &mut out[filled..]) {
                Ok(step) => step,
                Err(Error::DataMagic) if self.streams > 0 => {
                    // What looked like another stream is not one: trailing
                    // data after the final stream, not an error.
                    let unread = self.stream_in + (self.in_buf.len() - self.in_pos) as u64;
                    debug!(unread, "trailing non-bzip2 data after final stream");
                    self.finish(unread);
                    break;
                }
                Err(err) => return Err(err),
            };

            self.in_pos += step.consumed;
            self.stream_in += step.consumed as u64;
            self.total_in += step.consumed as u64;
            filled += step.produced;
            self.total_out += step.produced as u64;

            if step.done {
                self.streams += 1;
                self.stream_in = 0;
                let leftover = (self.in_buf.len() - self.in_pos) as u64;
                if self.first_stream_only {
                    self.finish(leftover);
                } else if leftover > 0 || self.refill_some()? {
                    trace!(streams = self.streams, "decoding next concatenated stream");
                    self.codec = Some(Decoder::new(self.small));
                } else {
                    self.finish(0);
                }
            } else if step.consumed == 0
                && step.produced == 0
                && self.in_exhausted
                && self.in_pos == self.in_buf.len()
            {
                // The source ended mid-stream and the codec cannot move.
                return Err(Error::UnexpectedEof {
                    bytes_read: self.total_in,
                });
            }
        }
        Ok(filled)
    }

    /// Stage up to one buffer of compressed bytes from the source.
    ///
    /// A short or empty pull marks the source exhausted.
    fn refill(&mut self) -> Result<()> {
        self.in_buf.resize(BUFFER_SIZE, 0);
        self.in_pos = 0;
        let source = self.handle.get_mut().ok_or(Error::Closed)?;
        let n = match source.pull(&mut self.in_buf) {
            Ok(n) => n,
            Err(err) => {
                // leave nothing staged that the codec could mistake for input
                self.in_buf.clear();
                return Err(err.into());
            }
        };
        self.in_buf.truncate(n);
        if n < BUFFER_SIZE {
            self.in_exhausted = true;
        }
        Ok(())
    }

    /// Refill at a stream boundary; true when more input is now staged.
    fn refill_some(&mut self) -> Result<bool> {
        if self.in_exhausted {
            return Ok(false);
        }
        self.refill()?;
        Ok(!self.in_buf.is_empty())
    }

    /// Release the codec and hand unconsumed bytes back to the source.
    ///
    /// Repositioning is best-effort: a source without the capability, or a
    /// failing seek (a pipe, say), leaves the over-read bytes lost to the
    /// caller.
    fn finish(&mut self, unread: u64) {
        self.codec = None;
        self.done = true;
        if unread > 0 {
            if let Some(source) = self.handle.get_mut() {
                match source.rewind(unread) {
                    Ok(true) => trace!(unread, "returned over-read bytes to the source"),
                    Ok(false) => {}
                    Err(err) => debug!(error = %err, "seek-back failed; over-read bytes dropped"),
                }
            }
        }
        self.in_pos = self.in_buf.len();
    }
}

impl Reader<Seekable<File>> {
    /// Open a file for decompression.
    ///
    /// The file is wrapped in [`Seekable`] so trailing data is handed back,
    /// and autoclose is forced on: closing the reader closes the file. A
    /// construction failure closes the file on the way out.
    pub fn open_path<P: AsRef<Path>>(path: P, options: ReaderOptions) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Reader::with_options(
            Seekable::new(file),
            options.autoclose(true),
        ))
    }

    /// Run `body` against a reader opened from `path`, closing it on every
    /// exit path.
    pub fn open_path_with<P, T, F>(path: P, options: ReaderOptions, body: F) -> Result<T>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let mut reader = Reader::open_path(path, options)?;
        let outcome = body(&mut reader);
        match reader.close() {
            Ok(()) | Err(Error::Closed) => outcome,
            Err(close_err) => outcome.and(Err(close_err)),
        }
    }
}

impl<S: Source> Read for Reader<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.handle.ensure_open().map_err(io::Error::from)?;
        if buf.is_empty() || self.done {
            return Ok(0);
        }
        self.fill(buf).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_initial_state() {
        let reader = Reader::new(Cursor::new(Vec::new()));
        assert!(!reader.eof());
        assert!(!reader.is_closed());
        assert!(!reader.autoclose());
        assert_eq!(reader.total_out(), 0);
    }

    #[test]
    fn test_close_is_guarded() {
        let mut reader = Reader::new(Cursor::new(Vec::new()));
        reader.close().unwrap();
        assert!(reader.is_closed());
        assert!(matches!(reader.close(), Err(Error::Closed)));
    }

    #[test]
    fn test_read_after_close() {
        let mut reader = Reader::new(Cursor::new(Vec::new()));
        reader.close().unwrap();

        let mut buf = [0u8; 8];
        let err = reader.read(&mut buf).unwrap_err();
        assert!(matches!(Error::from_io(err), Error::Closed));

        // a zero-length read is refused the same way once closed
        let err = reader.read(&mut []).unwrap_err();
        assert!(matches!(Error::from_io(err), Error::Closed));
    }

    #[test]
    fn test_set_autoclose_after_close() {
        let mut reader = Reader::new(Cursor::new(Vec::new()));
        reader.set_autoclose(true).unwrap();
        assert!(reader.autoclose());
        reader.close().unwrap();
        assert!(matches!(reader.set_autoclose(false), Err(Error::Closed)));
    }

    #[test]
    fn test_into_inner_returns_source() {
        let reader = Reader::new(Cursor::new(vec![1u8, 2, 3]));
        let source = reader.into_inner().unwrap();
        assert_eq!(source.into_inner(), vec![1, 2, 3]);
    }

    #[test]
    fn test_into_inner_after_autoclose() {
        let mut reader = Reader::with_options(
            Cursor::new(Vec::new()),
            ReaderOptions::new().autoclose(true),
        );
        reader.close().unwrap();
        assert!(matches!(reader.into_inner(), Err(Error::Closed)));
    }

    #[test]
    fn test_options_builder() {
        let options = ReaderOptions::new()
            .small(true)
            .first_stream_only(true)
            .autoclose(true);
        assert!(options.small && options.first_stream_only && options.autoclose);
    }
}
