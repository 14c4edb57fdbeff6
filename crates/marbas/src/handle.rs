//! Shared lifecycle state for the streaming handles.

use marbas_core::{Error, Result};

/// Owns the underlying stream of a reader or writer together with its
/// open/closed state and the autoclose policy applied at close.
///
/// With `autoclose` the underlying stream is dropped (closed) when the
/// handle closes; without it the stream stays available for retrieval.
#[derive(Debug)]
pub(crate) struct Handle<T> {
    inner: Option<T>,
    autoclose: bool,
    closed: bool,
}

impl<T> Handle<T> {
    pub fn new(inner: T, autoclose: bool) -> Handle<T> {
        Handle {
            inner: Some(inner),
            autoclose,
            closed: false,
        }
    }

    /// Fail with [`Error::Closed`] once the handle has been closed.
    pub fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    /// Guarded close: the first call succeeds, every later call reports
    /// [`Error::Closed`].
    pub fn close(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        if self.autoclose {
            self.inner = None;
        }
        Ok(())
    }

    /// Close without applying autoclose and release the stream.
    ///
    /// Fails once the stream is gone (already released, or dropped by an
    /// autoclosing close).
    pub fn release(&mut self) -> Result<T> {
        self.closed = true;
        self.inner.take().ok_or(Error::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn autoclose(&self) -> bool {
        self.autoclose
    }

    pub fn set_autoclose(&mut self, autoclose: bool) -> Result<()> {
        self.ensure_open()?;
        self.autoclose = autoclose;
        Ok(())
    }

    pub fn get(&self) -> Option<&T> {
        self.inner.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.inner.as_mut()
    }
}
