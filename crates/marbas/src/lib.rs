//! # Marbas
//!
//! Streaming bzip2 compression and decompression over byte sources and
//! sinks.
//!
//! Marbas is named after the fifth demon of the Ars Goetia, who answers
//! truly of things hidden and changes men into other shapes - fitting for a
//! library whose whole job is reshaping data and recovering the original.
//!
//! The block-sort codec itself comes from the `bzip2` crate's low-level
//! interface; Marbas owns everything around it: input staging, the
//! multi-stream decode state machine, over-read recovery, lifecycle, and
//! the typed error taxonomy.
//!
//! ## Features
//!
//! - **Multistream decoding**: concatenated compressed streams decode as
//!   one logical output, trailing data is handed back to seekable sources
//! - **Explicit lifecycle**: guarded close, autoclose policy, scoped open
//! - **Typed errors**: every failure mode is a [`Error`] variant, also
//!   recoverable across the `std::io` trait boundary
//!
//! ## Example
//!
//! ```
//! use std::io::{Cursor, Read, Write};
//! use marbas::{Reader, Writer};
//!
//! # fn main() -> marbas::Result<()> {
//! let mut writer = Writer::new(Vec::new());
//! writer.write_all(b"Hello, compression!")?;
//! writer.close()?;
//! let compressed = writer.into_inner()?;
//!
//! let mut reader = Reader::new(Cursor::new(compressed));
//! let mut restored = Vec::new();
//! reader.read_to_end(&mut restored)?;
//! assert_eq!(restored, b"Hello, compression!");
//! # Ok(())
//! # }
//! ```

mod codec;
mod handle;
mod reader;
mod writer;

pub use marbas_core::{BlockSize, Error, Result, Seekable, Source, WorkFactor};
pub use reader::{Reader, ReaderOptions};
pub use writer::{Writer, WriterOptions};

/// Staging buffer size for codec input and output (4 kB).
pub const BUFFER_SIZE: usize = 4096;
