//! Engine contract consumed by adapters
//!
//! [Session](crate::session::Session) is the engine shipped with this crate, but adapters only
//! ever talk to it through [Engine], so any other compression service can be plugged in.

use crate::error::Error;
use crate::session::SessionParams;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
///Status of engine call
pub enum Status {
    ///Call succeeded.
    Ok,
    ///Output space was not enough to make all progress requested.
    ///
    ///Not a failure for one-shot compression: call again with remaining input.
    BufError,
    ///Engine rejected data it was offered.
    ///
    ///Not a failure for one-shot compression: engine is expected to recover on next call.
    DataError,
    ///Engine failed.
    Fail,
}

impl Status {
    #[inline(always)]
    ///Returns whether status is `Ok`
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    #[inline(always)]
    ///Returns whether one-shot compression may carry on after this status.
    pub const fn is_recoverable(self) -> bool {
        matches!(self, Self::Ok | Self::BufError | Self::DataError)
    }

    #[inline]
    pub(crate) fn check(self, op: &'static str, processed: usize) -> Result<(), Error> {
        match self {
            Self::Ok => Ok(()),
            status => Err(Error::Engine {
                op,
                status,
                processed,
            }),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
///Outcome of one-shot compression call
pub struct Compressed {
    ///Input bytes consumed
    pub consumed: usize,
    ///Output bytes written
    pub produced: usize,
    ///Status of call
    pub status: Status,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
///Progress of stateful compression.
///
///Engine updates it on every [Engine::compress_stream] call.
pub struct Stream {
    ///Input bytes consumed by last call
    pub consumed: usize,
    ///Output bytes written by last call
    pub produced: usize,
    ///Input bytes held by engine, not yet compressed
    pub pending_in: usize,
    ///Compressed bytes held by engine, not yet handed out
    pub pending_out: usize,
}

impl Stream {
    #[inline(always)]
    ///Creates idle stream
    pub const fn new() -> Self {
        Self {
            consumed: 0,
            produced: 0,
            pending_in: 0,
            pending_out: 0,
        }
    }

    #[inline(always)]
    ///Returns whether engine holds nothing for this stream.
    ///
    ///Session must not be torn down until this is true.
    pub const fn is_drained(&self) -> bool {
        self.pending_in == 0 && self.pending_out == 0
    }
}

///Compression engine, as seen by adapters.
///
///Single engine instance is bound to single adapter and is never called concurrently.
pub trait Engine {
    ///Returns parameters engine was set up with.
    fn params(&self) -> &SessionParams;

    ///Returns worst-case number of output bytes required to compress `len` input bytes in one
    ///call.
    fn compress_bound(&self, len: usize) -> usize;

    ///Compresses as much of `input` as fits into `output`.
    ///
    ///Input left unconsumed should be offered again on the next call.
    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Compressed;

    ///Feeds `input` into stateful compression, writing whatever output is ready into `output`.
    ///
    ///When `last` is set, engine must eventually emit everything it holds, which caller
    ///observes through [Stream::is_drained].
    fn compress_stream(&mut self, stream: &mut Stream, input: &[u8], output: &mut [u8], last: bool) -> Status;

    ///Ends stream, discarding anything engine still holds for it.
    fn end_stream(&mut self, stream: &mut Stream) -> Status {
        *stream = Stream::new();
        Status::Ok
    }

    ///Releases engine state. No compression is possible afterwards.
    fn teardown(&mut self) -> Status {
        Status::Ok
    }

    ///Closes engine.
    fn close(&mut self) -> Status {
        Status::Ok
    }
}
