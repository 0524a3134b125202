//! Streaming adapter

use core::cmp;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use super::{closed_error, io_result, release, OpenMode, Options, Ownership, StreamSink};
use crate::buffer::Buffer;
use crate::engine::{Engine, Status, Stream};
use crate::error::Error;
use crate::metrics::Timings;
use crate::session::Session;

///Streaming adapter
///
///Writes are fed to stateful engine in slices of quarter of `hw_buff_sz`, while engine output
///accumulates in buffer of [Options::capacity] bytes, which is flushed to sink whenever it gets
///full.
///
///Engine may keep input and output to itself between writes, so [StreamSink::close] finalizes
///stream until engine holds nothing before sink is released.
///
///If adapter is dropped without close, stream is finalized best effort and errors are only
///logged.
///
///## Example
///
///```rust
///use zsink::{StreamSink, Streaming, Options, Format};
///
///let mut adapter = Streaming::hook(Vec::new(), &Options::new().capacity(16)).expect("to create adapter");
///for _ in 0..64 {
///    adapter.push(b"streaming data ").expect("to compress");
///}
///let compressed = adapter.close().expect("to close").expect("sink is returned");
///
///let mut output = Vec::new();
///Format::Gzip.decoder().expect("decoder").decode_all(&compressed, &mut output).expect("to decode");
///assert_eq!(output, b"streaming data ".repeat(64));
///```
pub struct Streaming<W: Write, E: Engine = Session> {
    engine: E,
    stream: Stream,
    buffer: Buffer,
    sink: Option<W>,
    ownership: Ownership,
    slice_len: usize,
    finalized: bool,
    timings: Option<Timings>,
}

impl<W: Write> Streaming<W> {
    ///Creates adapter over `sink` owned by caller.
    pub fn hook(sink: W, opts: &Options) -> Result<Self, Error> {
        let engine = Session::new(*opts.get_params())?;
        Self::with_engine(engine, sink, Ownership::Hooked, opts)
    }
}

impl Streaming<fs::File> {
    ///Opens file at `path`, creating adapter which owns it.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode, opts: &Options) -> Result<Self, Error> {
        let engine = Session::new(*opts.get_params())?;
        let file = mode.open(path.as_ref())?;
        Self::with_engine(engine, file, Ownership::Owned, opts)
    }
}

impl<W: Write, E: Engine> Streaming<W, E> {
    ///Creates adapter with provided `engine`.
    pub fn with_engine(engine: E, sink: W, ownership: Ownership, opts: &Options) -> Result<Self, Error> {
        let buffer = Buffer::new(opts.get_capacity())?;
        let slice_len = cmp::max(engine.params().get_hw_buff_sz() / 4, 1);

        Ok(Self {
            engine,
            stream: Stream::new(),
            buffer,
            sink: Some(sink),
            ownership,
            slice_len,
            finalized: false,
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
    ///
    ///Always present until adapter is closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.sink.as_ref()
    }

    #[inline(always)]
    ///Returns number of compressed bytes waiting in accumulation buffer
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    #[inline(always)]
    ///Returns stream progress as of last engine call
    pub fn stream(&self) -> &Stream {
        &self.stream
    }

    #[inline(always)]
    ///Returns timings, if enabled
    pub fn timings(&self) -> Option<&Timings> {
        self.timings.as_ref()
    }

    fn flush_buffer(&mut self) -> Result<usize, Error> {
        match self.sink.as_mut() {
            Some(sink) => self.buffer.flush(sink),
            None => Err(closed_error()),
        }
    }

    fn compress_stream(&mut self, input: &[u8], last: bool) -> Status {
        let start = self.timings.as_ref().map(|_| Instant::now());
        let status = self.engine.compress_stream(&mut self.stream, input, self.buffer.spare_mut(), last);
        if let (Some(timings), Some(start)) = (self.timings.as_mut(), start) {
            timings.record(start.elapsed());
        }

        self.buffer.advance(self.stream.produced);
        tracing::debug!(
            "compress_stream(last={}): consumed={} produced={} pending_in={} pending_out={} status={:?}",
            last,
            self.stream.consumed,
            self.stream.produced,
            self.stream.pending_in,
            self.stream.pending_out,
            status
        );
        status
    }

    ///Drains everything engine holds into sink.
    ///
    ///Runs once, subsequent calls do nothing.
    fn finalize(&mut self) -> Result<(), Error> {
        if self.finalized {
            return Ok(());
        }
        self.finalized = true;

        self.flush_buffer()?;
        while !self.stream.is_drained() {
            let status = self.compress_stream(&[], true);
            if !status.is_ok() {
                tracing::error!("finalize failed with {:?}", status);
                return Err(Error::Engine {
                    op: "finalize",
                    status,
                    processed: 0,
                });
            }
            let produced = self.stream.produced;
            self.flush_buffer()?;

            if produced == 0 && !self.stream.is_drained() {
                return Err(Error::Stalled {
                    op: "finalize",
                    processed: 0,
                });
            }
        }
        self.flush_buffer()?;

        Ok(())
    }
}

impl<W: Write, E: Engine> StreamSink for Streaming<W, E> {
    type Sink = W;

    fn push(&mut self, buf: &[u8]) -> Result<usize, Error> {
        if self.finalized {
            return Err(closed_error());
        }

        let mut consumed = 0;
        while consumed < buf.len() {
            //Previous flush may have failed, engine must always get room.
            if self.buffer.is_full() {
                self.flush_buffer()?;
            }

            let end = cmp::min(buf.len(), consumed + self.slice_len);
            let status = self.compress_stream(&buf[consumed..end], false);
            consumed += self.stream.consumed;

            if !status.is_ok() {
                tracing::error!("compress_stream failed with {:?} after {} bytes", status, consumed);
                return Err(Error::Engine {
                    op: "compress_stream",
                    status,
                    processed: consumed,
                });
            }

            if self.buffer.is_full() {
                self.flush_buffer()?;
            } else if self.stream.consumed == 0 && self.stream.produced == 0 {
                return Err(Error::Stalled {
                    op: "compress_stream",
                    processed: consumed,
                });
            }
        }

        Ok(consumed)
    }

    #[inline(always)]
    fn owns_sink(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    fn close(mut self) -> Result<Option<W>, Error> {
        let finalized = self.finalize();
        if let Err(error) = &finalized {
            tracing::error!("finalization failed: {}", error);
        }

        let released = match self.sink.take() {
            Some(sink) => release(sink, self.ownership),
            None => Ok(None),
        };
        let ended = self.engine.end_stream(&mut self.stream).check("end_stream", 0);
        let teardown = self.engine.teardown().check("teardown", 0);
        let closed = self.engine.close().check("close", 0);

        finalized?;
        let sink = released?;
        ended?;
        teardown?;
        closed?;
        Ok(sink)
    }
}

impl<W: Write, E: Engine> Write for Streaming<W, E> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io_result(self.push(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_buffer()?;
        match self.sink.as_mut() {
            Some(sink) => sink.flush(),
            None => Err(closed_error().into()),
        }
    }
}

impl<W: Write, E: Engine> Drop for Streaming<W, E> {
    fn drop(&mut self) {
        if self.sink.is_none() {
            return;
        }

        if let Err(error) = self.finalize() {
            tracing::warn!("unable to finalize stream on drop: {}", error);
        }
        if let Some(sink) = self.sink.as_mut() {
            if let Err(error) = sink.flush() {
                tracing::warn!("unable to flush sink on drop: {}", error);
            }
        }
    }
}
