//! # Marbas Core
//!
//! Error taxonomy, parameter types, and byte-source capabilities for the
//! Marbas streaming bzip2 library.
//!
//! Marbas is named after the fifth demon of the Ars Goetia, who answers
//! truly of things hidden and changes men into other shapes - fitting for a
//! library whose whole job is reshaping data and recovering the original.
//!
//! ## Contents
//!
//! - [`Error`] / [`Result`] - typed failures shared by both directions
//! - [`BlockSize`] / [`WorkFactor`] - validated compression parameters
//! - [`Source`] / [`Seekable`] - the byte-source capability consumed by the
//!   decompressing reader

pub mod error;
pub mod source;
pub mod types;

pub use error::{Error, Result};
pub use source::{Seekable, Source};
pub use types::{BlockSize, WorkFactor};
