//! Step interface over the external block-sort codec.
//!
//! The `bzip2` crate exposes libbz2's parameter-block protocol through
//! [`Compress`] and [`Decompress`]. This module narrows that surface to a
//! request/response step call - slices in, progress out - and translates
//! codec statuses into the crate's error taxonomy. The reader and writer
//! never touch the codec types directly.

use bzip2::{Action, Compress, Compression, Decompress, Status};

use marbas_core::{BlockSize, Error, Result, WorkFactor};

/// Progress made by one codec step.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StepResult {
    /// Input bytes the codec consumed.
    pub consumed: usize,
    /// Output bytes the codec produced.
    pub produced: usize,
    /// Whether the step reached its terminal state: the end of a compressed
    /// stream when decoding or finishing, the block boundary when flushing.
    pub done: bool,
}

fn translate(err: bzip2::Error) -> Error {
    match err {
        bzip2::Error::Sequence => Error::Sequence,
        bzip2::Error::Data => Error::Data,
        bzip2::Error::DataMagic => Error::DataMagic,
        bzip2::Error::Param => Error::Param,
    }
}

fn status_name(status: Status) -> &'static str {
    match status {
        Status::Ok => "OK",
        Status::FlushOk => "FLUSH_OK",
        Status::RunOk => "RUN_OK",
        Status::FinishOk => "FINISH_OK",
        Status::StreamEnd => "STREAM_END",
        Status::MemNeeded => "MEM_NEEDED",
    }
}

/// Decompression state for one bzip2 stream.
///
/// Owns the codec's native allocation; dropping releases it. A concatenated
/// follow-on stream needs a fresh `Decoder`.
pub(crate) struct Decoder {
    raw: Decompress,
}

impl Decoder {
    pub fn new(small: bool) -> Decoder {
        Decoder {
            raw: Decompress::new(small),
        }
    }

    /// Run one decompression step. `done` reports the end of the current
    /// compressed stream; the codec may leave input unconsumed past it.
    pub fn step(&mut self, input: &[u8], output: &mut [u8]) -> Result<StepResult> {
        let in_before = self.raw.total_in();
        let out_before = self.raw.total_out();

        let status = self.raw.decompress(input, output).map_err(translate)?;
        let done = match status {
            Status::Ok => false,
            Status::StreamEnd => true,
            Status::MemNeeded => return Err(Error::Mem),
            other => return Err(Error::unexpected(status_name(other))),
        };

        Ok(StepResult {
            consumed: (self.raw.total_in() - in_before) as usize,
            produced: (self.raw.total_out() - out_before) as usize,
            done,
        })
    }
}

/// Compression state for one bzip2 stream.
pub(crate) struct Encoder {
    raw: Compress,
}

impl Encoder {
    pub fn new(block_size: BlockSize, work_factor: WorkFactor) -> Encoder {
        Encoder {
            raw: Compress::new(Compression::new(block_size.get()), work_factor.get()),
        }
    }

    /// Run one compression step in the given mode.
    ///
    /// `done` is only meaningful for [`Action::Flush`] (block boundary
    /// emitted) and [`Action::Finish`] (stream trailer emitted); plain runs
    /// report progress until the input slice is consumed.
    pub fn step(&mut self, input: &[u8], output: &mut [u8], action: Action) -> Result<StepResult> {
        let in_before = self.raw.total_in();
        let out_before = self.raw.total_out();

        let status = self.raw.compress(input, output, action).map_err(translate)?;
        let done = match (action, status) {
            (Action::Run, Status::RunOk) => false,
            (Action::Flush, Status::FlushOk) => false,
            (Action::Flush, Status::RunOk) => true,
            (Action::Finish, Status::FinishOk) => false,
            (Action::Finish, Status::StreamEnd) => true,
            (_, Status::MemNeeded) => return Err(Error::Mem),
            (_, other) => return Err(Error::unexpected(status_name(other))),
        };

        Ok(StepResult {
            consumed: (self.raw.total_in() - in_before) as usize,
            produced: (self.raw.total_out() - out_before) as usize,
            done,
        })
    }
}
