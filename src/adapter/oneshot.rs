//! One-shot adapter

use core::cmp;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use super::{io_result, release, OpenMode, Options, Ownership, StreamSink};
use crate::buffer::Buffer;
use crate::engine::Engine;
use crate::error::Error;
use crate::metrics::Timings;
use crate::session::Session;

///One-shot adapter
///
///Every write is compressed in full before it returns: engine is called on what is left of the
///input until nothing is left, and each call's output goes straight to sink.
///
///Engine keeps no state across writes, so there is nothing to finalize on close.
///
///Single write larger than [Options::max_input] is rejected.
///
///## Example
///
///```rust
///use zsink::{StreamSink, OneShot, Options, Format};
///
///let mut adapter = OneShot::hook(Vec::new(), &Options::new()).expect("to create adapter");
///assert_eq!(adapter.push(b"hello").expect("to compress"), 5);
///assert_eq!(adapter.push(b", world").expect("to compress"), 7);
///let compressed = adapter.close().expect("to close").expect("sink is returned");
///
///let mut output = Vec::new();
///Format::Gzip.decoder().expect("decoder").decode_all(&compressed, &mut output).expect("to decode");
///assert_eq!(output, b"hello, world");
///```
pub struct OneShot<W: Write, E: Engine = Session> {
    engine: E,
    sink: W,
    slot: Buffer,
    ownership: Ownership,
    max_input: usize,
    timings: Option<Timings>,
}

impl<W: Write> OneShot<W> {
    ///Creates adapter over `sink` owned by caller.
    pub fn hook(sink: W, opts: &Options) -> Result<Self, Error> {
        let engine = Session::new(*opts.get_params())?;
        Self::with_engine(engine, sink, Ownership::Hooked, opts)
    }
}

impl OneShot<fs::File> {
    ///Opens file at `path`, creating adapter which owns it.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode, opts: &Options) -> Result<Self, Error> {
        let engine = Session::new(*opts.get_params())?;
        let file = mode.open(path.as_ref())?;
        Self::with_engine(engine, file, Ownership::Owned, opts)
    }
}

impl<W: Write, E: Engine> OneShot<W, E> {
    ///Creates adapter with provided `engine`.
    pub fn with_engine(engine: E, sink: W, ownership: Ownership, opts: &Options) -> Result<Self, Error> {
        let block_bound = engine.compress_bound(engine.params().get_hw_buff_sz());
        let slot = Buffer::new(cmp::max(opts.get_capacity(), block_bound))?;

        Ok(Self {
            engine,
            sink,
            slot,
            ownership,
            max_input: opts.get_max_input(),
            timings: opts.get_record_timings().then(Timings::new),
        })
    }

    #[inline(always)]
    ///Returns engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[inline(always)]
    ///Returns sink
    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    #[inline(always)]
    ///Returns timings, if enabled
    pub fn timings(&self) -> Option<&Timings> {
        self.timings.as_ref()
    }
}

impl<W: Write, E: Engine> StreamSink for OneShot<W, E> {
    type Sink = W;

    fn push(&mut self, buf: &[u8]) -> Result<usize, Error> {
        if buf.len() > self.max_input {
            return Err(Error::SizeLimitExceeded {
                size: buf.len(),
                limit: self.max_input,
            });
        }

        let mut consumed = 0;
        while consumed < buf.len() {
            let start = self.timings.as_ref().map(|_| Instant::now());
            let result = self.engine.compress(&buf[consumed..], self.slot.spare_mut());
            if let (Some(timings), Some(start)) = (self.timings.as_mut(), start) {
                timings.record(start.elapsed());
            }

            tracing::debug!("compress: consumed={} produced={} status={:?}", result.consumed, result.produced, result.status);
            if !result.status.is_recoverable() {
                tracing::error!("compress failed with {:?} after {} bytes", result.status, consumed);
                return Err(Error::Engine {
                    op: "compress",
                    status: result.status,
                    processed: consumed,
                });
            }
            if result.consumed == 0 && result.produced == 0 {
                return Err(Error::Stalled {
                    op: "compress",
                    processed: consumed,
                });
            }

            self.slot.advance(result.produced);
            self.slot.flush(&mut self.sink)?;
            consumed += result.consumed;
        }

        Ok(consumed)
    }

    #[inline(always)]
    fn owns_sink(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    fn close(self) -> Result<Option<W>, Error> {
        let Self { mut engine, sink, ownership, .. } = self;

        let released = release(sink, ownership);
        let teardown = engine.teardown().check("teardown", 0);
        let closed = engine.close().check("close", 0);

        let sink = released?;
        teardown?;
        closed?;
        Ok(sink)
    }
}

impl<W: Write, E: Engine> Write for OneShot<W, E> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io_result(self.push(buf))
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}
