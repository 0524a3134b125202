//! Baseline gzip adapter
//!
//! Whole output is single gzip member produced by zlib with its default level, so it serves as
//! point of comparison for block based adapters.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use super::{closed_error, io_result, release, OpenMode, Options, Ownership, StreamSink};
use crate::buffer::Buffer;
use crate::encoder::{EncodeOp, EncodeStatus, Encoder, Interface, ZlibMode, ZlibOptions};
use crate::engine::Status;
use crate::error::Error;
use crate::metrics::Timings;

const BLOCK_SIZE: usize = 16 * 1024;

///Gzip writer
///
///Output is written to sink in blocks of 16 KiB.
///Compression level is fixed at zlib's default (`-1`), so level of [SessionParams](crate::SessionParams)
///does not apply, neither does `zsink pipe --kind gzip --level`.
///Session parameters and capacity of [Options] are ignored, only timings are honored.
///
///Dropping writer without close finishes member best effort.
pub struct GzipWriter<W: Write> {
    encoder: Encoder,
    buffer: Buffer,
    sink: Option<W>,
    ownership: Ownership,
    finished: bool,
    timings: Option<Timings>,
}

impl<W: Write> GzipWriter<W> {
    ///Creates writer over `sink` owned by caller.
    pub fn hook(sink: W, opts: &Options) -> Result<Self, Error> {
        Self::new(sink, Ownership::Hooked, opts)
    }

    fn new(sink: W, ownership: Ownership, opts: &Options) -> Result<Self, Error> {
        let encoder = Interface::zlib(ZlibOptions::new().mode(ZlibMode::Gzip).compression(-1)).ok_or(Error::Allocation {
            what: "gzip encoder",
            size: 0,
        })?;

        Ok(Self {
            encoder,
            buffer: Buffer::new(BLOCK_SIZE)?,
            sink: Some(sink),
            ownership,
            finished: false,
            timings: opts.get_record_timings().then(Timings::new),
        })
    }

    #[inline(always)]
    ///Returns sink
    ///
    ///Always present until writer is closed.
    pub fn get_ref(&self) -> Option<&W> {
        self.sink.as_ref()
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

    fn encode(&mut self, mut data: &[u8], op: EncodeOp) -> Result<usize, Error> {
        let mut consumed = 0;
        loop {
            let spare_len = self.buffer.remaining();
            let start = self.timings.as_ref().map(|_| Instant::now());
            let result = self.encoder.encode(data, self.buffer.spare_mut(), op);
            if let (Some(timings), Some(start)) = (self.timings.as_mut(), start) {
                timings.record(start.elapsed());
            }

            let input_len = data.len() - result.input_remain;
            let output_len = spare_len - result.output_remain;
            self.buffer.advance(output_len);
            data = &data[input_len..];
            consumed += input_len;

            match result.status {
                EncodeStatus::Error => {
                    tracing::error!("gzip encoder failed after {} bytes", consumed);
                    return Err(Error::Engine {
                        op: "gzip",
                        status: Status::Fail,
                        processed: consumed,
                    });
                },
                EncodeStatus::Finished => {
                    self.finished = true;
                    break Ok(consumed);
                },
                EncodeStatus::Continue | EncodeStatus::NeedOutput => (),
            }

            if self.buffer.is_full() {
                self.flush_buffer()?;
            } else if data.is_empty() && op == EncodeOp::Process {
                break Ok(consumed);
            } else if input_len == 0 && output_len == 0 {
                return Err(Error::Stalled {
                    op: "gzip",
                    processed: consumed,
                });
            }
        }
    }

    fn finish(&mut self) -> Result<(), Error> {
        if !self.finished {
            self.encode(&[], EncodeOp::Finish)?;
        }
        self.flush_buffer().map(|_| ())
    }
}

impl GzipWriter<fs::File> {
    ///Opens file at `path`, creating writer which owns it.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode, opts: &Options) -> Result<Self, Error> {
        let file = mode.open(path.as_ref())?;
        Self::new(file, Ownership::Owned, opts)
    }
}

impl<W: Write> StreamSink for GzipWriter<W> {
    type Sink = W;

    fn push(&mut self, buf: &[u8]) -> Result<usize, Error> {
        if self.finished {
            return Err(closed_error());
        }
        if buf.is_empty() {
            return Ok(0);
        }

        self.encode(buf, EncodeOp::Process)
    }

    #[inline(always)]
    fn owns_sink(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    fn close(mut self) -> Result<Option<W>, Error> {
        let finished = self.finish();
        if let Err(error) = &finished {
            tracing::error!("unable to finish gzip member: {}", error);
        }

        let released = match self.sink.take() {
            Some(sink) => release(sink, self.ownership),
            None => Ok(None),
        };

        finished?;
        released
    }
}

impl<W: Write> Write for GzipWriter<W> {
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

impl<W: Write> Drop for GzipWriter<W> {
    fn drop(&mut self) {
        if self.sink.is_none() {
            return;
        }

        if let Err(error) = self.finish() {
            tracing::warn!("unable to finish gzip member on drop: {}", error);
        }
    }
}
