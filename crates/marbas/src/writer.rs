//! Streaming bzip2 compression.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use bzip2::Action;
use tracing::trace;

use marbas_core::{BlockSize, Error, Result, WorkFactor};

use crate::codec::Encoder;
use crate::handle::Handle;
use crate::BUFFER_SIZE;

/// Options accepted by [`Writer`] constructors.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriterOptions {
    /// Compression block size; defaults to the largest (best ratio).
    pub block_size: BlockSize,
    /// Fallback threshold for pathological input; defaults to the codec's
    /// internal choice.
    pub work_factor: WorkFactor,
    /// Drop (close) the underlying sink when the writer is closed.
    pub autoclose: bool,
}

impl WriterOptions {
    pub fn new() -> WriterOptions {
        WriterOptions::default()
    }

    pub fn block_size(mut self, block_size: BlockSize) -> WriterOptions {
        self.block_size = block_size;
        self
    }

    pub fn work_factor(mut self, work_factor: WorkFactor) -> WriterOptions {
        self.work_factor = work_factor;
        self
    }

    /// Close the underlying sink together with the writer.
    pub fn autoclose(mut self, autoclose: bool) -> WriterOptions {
        self.autoclose = autoclose;
        self
    }
}

/// A writer that compresses bytes into a bzip2 stream on the inner sink.
///
/// [`close`](Writer::close) (or [`into_inner`](Writer::into_inner)) must be
/// called for the output to be a complete stream: it drains the codec's
/// trailer to the sink. Dropping an unclosed writer finishes best-effort
/// and cannot report failures.
///
/// `flush` terminates the current compression block early so the bytes
/// written so far are decodable, at a cost in compression ratio - meant for
/// synchronization points, not general use.
pub struct Writer<W: Write> {
    handle: Handle<W>,
    codec: Option<Encoder>,
    total_in: u64,
}

impl<W: Write> Writer<W> {
    /// Create a writer with default options.
    pub fn new(sink: W) -> Writer<W> {
        Writer::with_options(sink, WriterOptions::default())
    }

    /// Create a writer with the given options.
    pub fn with_options(sink: W, options: WriterOptions) -> Writer<W> {
        Writer {
            handle: Handle::new(sink, options.autoclose),
            codec: Some(Encoder::new(options.block_size, options.work_factor)),
            total_in: 0,
        }
    }

    /// Create a writer from a factory that opens the sink.
    pub fn from_factory<F>(factory: F, options: WriterOptions) -> Result<Writer<W>>
    where
        F: FnOnce() -> io::Result<W>,
    {
        Ok(Writer::with_options(factory()?, options))
    }

    /// Run `body` against a fresh writer, closing it on every exit path.
    ///
    /// Closing is what completes the compressed stream, so a close failure
    /// after a successful body is reported; a body that already closed the
    /// writer is fine.
    pub fn with<T, F>(sink: W, options: WriterOptions, body: F) -> Result<T>
    where
        F: FnOnce(&mut Writer<W>) -> Result<T>,
    {
        let mut writer = Writer::with_options(sink, options);
        let outcome = body(&mut writer);
        match writer.close() {
            Ok(()) | Err(Error::Closed) => outcome,
            Err(close_err) => outcome.and(Err(close_err)),
        }
    }

    /// Total uncompressed bytes accepted so far.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Complete the compressed stream and close the writer.
    ///
    /// Drains the codec in finish mode until the stream trailer is on the
    /// sink, releases the codec state, then closes the handle (dropping the
    /// sink when autoclose is set). The first call succeeds; every later
    /// call fails with [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        self.handle.ensure_open()?;
        self.finish_codec()?;
        self.handle.close()
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    pub fn autoclose(&self) -> bool {
        self.handle.autoclose()
    }

    /// Change the autoclose policy. Fails once the writer is closed.
    pub fn set_autoclose(&mut self, autoclose: bool) -> Result<()> {
        self.handle.set_autoclose(autoclose)
    }

    /// Get a reference to the underlying sink.
    ///
    /// `None` once the writer was closed with autoclose in effect.
    pub fn get_ref(&self) -> Option<&W> {
        self.handle.get()
    }

    /// Get a mutable reference to the underlying sink.
    pub fn get_mut(&mut self) -> Option<&mut W> {
        self.handle.get_mut()
    }

    /// Complete the compressed stream and return the underlying sink.
    pub fn into_inner(mut self) -> Result<W> {
        if !self.handle.is_closed() {
            self.finish_codec()?;
        }
        self.handle.release()
    }

    /// Feed `data` through the codec until all of it is consumed, draining
    /// produced bytes to the sink.
    fn run(&mut self, data: &[u8]) -> Result<()> {
        let Some(codec) = self.codec.as_mut() else {
            return Err(Error::Closed);
        };
        let sink = self.handle.get_mut().ok_or(Error::Closed)?;

        let mut out = [0u8; BUFFER_SIZE];
        let mut pos = 0;
        while pos < data.len() {
            let step = codec.step(&data[pos..], &mut out, Action::Run)?;
            pos += step.consumed;
            if step.produced > 0 {
                sink.write_all(&out[..step.produced])?;
            }
        }
        self.total_in += data.len() as u64;
        Ok(())
    }

    /// Terminate the current compression block and drain it to the sink.
    fn flush_block(&mut self) -> Result<()> {
        let Some(codec) = self.codec.as_mut() else {
            return Err(Error::Closed);
        };
        let sink = self.handle.get_mut().ok_or(Error::Closed)?;

        let mut out = [0u8; BUFFER_SIZE];
        loop {
            let step = codec.step(&[], &mut out, Action::Flush)?;
            if step.produced > 0 {
                sink.write_all(&out[..step.produced])?;
            }
            if step.done {
                trace!("compression block flushed");
                return Ok(());
            }
        }
    }

    /// Drain the codec in finish mode and release it.
    fn finish_codec(&mut self) -> Result<()> {
        let Some(codec) = self.codec.as_mut() else {
            return Ok(());
        };
        let sink = self.handle.get_mut().ok_or(Error::Closed)?;

        let mut out = [0u8; BUFFER_SIZE];
        loop {
            let step = codec.step(&[], &mut out, Action::Finish)?;
            if step.produced > 0 {
                sink.write_all(&out[..step.produced])?;
            }
            if step.done {
                break;
            }
        }
        self.codec = None;
        Ok(())
    }
}

impl Writer<File> {
    /// Create a file and compress into it, truncating anything there.
    ///
    /// Autoclose is forced on: closing the writer closes the file.
    pub fn create_path<P: AsRef<Path>>(path: P, options: WriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Writer::with_options(file, options.autoclose(true)))
    }

    /// Run `body` against a writer created at `path`, closing it on every
    /// exit path.
    pub fn create_path_with<P, T, F>(path: P, options: WriterOptions, body: F) -> Result<T>
    where
        P: AsRef<Path>,
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let mut writer = Writer::create_path(path, options)?;
        let outcome = body(&mut writer);
        match writer.close() {
            Ok(()) | Err(Error::Closed) => outcome,
            Err(close_err) => outcome.and(Err(close_err)),
        }
    }
}

impl<W: Write> Write for Writer<W> {
    /// Accept the whole slice; partial acceptance is not an outcome of this
    /// protocol.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.handle.ensure_open().map_err(io::Error::from)?;
        self.run(buf).map_err(io::Error::from)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.handle.ensure_open().map_err(io::Error::from)?;
        self.flush_block().map_err(io::Error::from)?;
        let sink = self.handle.get_mut().ok_or(Error::Closed).map_err(io::Error::from)?;
        sink.flush()
    }
}

impl<W: Write> Drop for Writer<W> {
    fn drop(&mut self) {
        // Best effort; callers that need the failure must close() instead.
        if !self.handle.is_closed() {
            let _ = self.finish_codec();
        }
    }
}
