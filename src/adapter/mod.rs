//! Compression adapters
//!
//! Adapters sit between producer writes and byte sink.
//! Each adapter owns its engine session and buffers, and is closed exactly once through
//! [StreamSink::close], which consumes it.
//!
//! Sink is either owned ([Ownership::Owned]), in which case close flushes and drops it, or only
//! borrowed from caller ([Ownership::Hooked]), in which case close flushes it and hands it back
//! untouched otherwise.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;
use crate::session::SessionParams;

pub mod oneshot;
pub mod streaming;
#[cfg(feature = "zlib")]
pub mod gzip;

pub use oneshot::OneShot;
pub use streaming::Streaming;
#[cfg(feature = "zlib")]
pub use gzip::GzipWriter;

const MB: usize = 1024 * 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
///Adapter options
pub struct Options {
    params: SessionParams,
    capacity: usize,
    max_input: usize,
    record_timings: bool,
}

impl Options {
    #[inline(always)]
    ///Creates default options
    pub const fn new() -> Self {
        Self {
            params: SessionParams::new(),
            capacity: 2 * MB,
            max_input: 512 * MB,
            record_timings: false,
        }
    }

    #[inline]
    ///Sets session parameters
    pub const fn params(mut self, params: SessionParams) -> Self {
        self.params = params;
        self
    }

    #[inline]
    ///Sets accumulation buffer capacity
    ///
    ///For one-shot adapter this is size of output slot, raised to engine's worst-case output for
    ///single block when smaller.
    ///
    ///Defaults to 2 MiB.
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    #[inline]
    ///Sets largest input accepted by single one-shot write.
    ///
    ///Defaults to 512 MiB.
    pub const fn max_input(mut self, max_input: usize) -> Self {
        self.max_input = max_input;
        self
    }

    #[inline]
    ///Enables recording of time spent in every engine call.
    pub const fn record_timings(mut self, record_timings: bool) -> Self {
        self.record_timings = record_timings;
        self
    }

    #[inline(always)]
    ///Returns session parameters
    pub const fn get_params(&self) -> &SessionParams {
        &self.params
    }

    #[inline(always)]
    ///Returns accumulation buffer capacity
    pub const fn get_capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    ///Returns one-shot input limit
    pub const fn get_max_input(&self) -> usize {
        self.max_input
    }

    #[inline(always)]
    ///Returns whether timings are recorded
    pub const fn get_record_timings(&self) -> bool {
        self.record_timings
    }
}

impl Default for Options {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
///How to open sink by path
pub enum OpenMode {
    ///Create or truncate.
    Write,
    ///Create or append to existing content.
    Append,
}

impl OpenMode {
    ///Opens file at `path`.
    pub fn open(self, path: &Path) -> Result<fs::File, Error> {
        let mut opts = fs::OpenOptions::new();
        match self {
            Self::Write => opts.write(true).create(true).truncate(true),
            Self::Append => opts.append(true).create(true),
        };

        opts.open(path).map_err(|source| Error::Open {
            path: path.to_owned(),
            source,
        })
    }
}

impl FromStr for OpenMode {
    type Err = Error;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "w" | "wb" => Ok(Self::Write),
            "a" | "ab" => Ok(Self::Append),
            _ => Err(Error::Params("open mode must be one of w, wb, a, ab")),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
///Who closes sink
pub enum Ownership {
    ///Adapter closes sink on close.
    Owned,
    ///Caller keeps sink, adapter hands it back on close.
    Hooked,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
///Adapter kind
pub enum Kind {
    ///[OneShot]
    OneShot,
    ///[Streaming]
    Streaming,
    ///[GzipWriter]
    Gzip,
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "oneshot" | "one-shot" => Ok(Self::OneShot),
            "streaming" | "stream" => Ok(Self::Streaming),
            "gzip" => Ok(Self::Gzip),
            _ => Err(Error::Params("adapter kind must be one of oneshot, streaming, gzip")),
        }
    }
}

///Compressing sink
pub trait StreamSink {
    ///Underlying sink
    type Sink;

    ///Compresses `buf`, returning number of bytes processed.
    ///
    ///Empty `buf` is no-op.
    fn push(&mut self, buf: &[u8]) -> Result<usize, Error>;

    ///Returns whether closing adapter closes sink.
    fn owns_sink(&self) -> bool;

    ///Finalizes compression and releases every resource.
    ///
    ///Returns sink back if it is hooked, `None` if it is owned and got closed.
    ///
    ///Every release step runs even after failure of previous one, first error is returned.
    ///Hooked sink is dropped when error is returned.
    fn close(self) -> Result<Option<Self::Sink>, Error>;
}

pub(crate) fn release<W: Write>(mut sink: W, ownership: Ownership) -> Result<Option<W>, Error> {
    sink.flush()?;
    match ownership {
        Ownership::Owned => {
            drop(sink);
            Ok(None)
        },
        Ownership::Hooked => Ok(Some(sink)),
    }
}

pub(crate) fn closed_error() -> Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "adapter is closed").into()
}

///Translates result of `push` into `io::Write` result.
///
///Progress made before failure is reported as success, so error is seen on the next call.
pub(crate) fn io_result(result: Result<usize, Error>) -> io::Result<usize> {
    match result {
        Ok(size) => Ok(size),
        Err(error) if error.processed() > 0 => {
            tracing::error!("write stopped after {} bytes: {}", error.processed(), error);
            Ok(error.processed())
        },
        Err(error) => Err(error.into()),
    }
}

///Adapter of any [Kind]
///
///## Example
///
///```rust,no_run
///use zsink::{StreamSink, Adapter, Kind, Options, OpenMode};
///
///let mut adapter = Adapter::open_by_path("data.gz", OpenMode::Write, Kind::Streaming, &Options::new()).expect("to open file");
///adapter.push(b"some data").expect("to compress");
///assert!(adapter.close().expect("to close").is_none());
///```
pub enum Adapter<W: Write> {
    ///One-shot adapter
    OneShot(OneShot<W>),
    ///Streaming adapter
    Streaming(Streaming<W>),
    #[cfg(feature = "zlib")]
    ///Gzip baseline adapter
    Gzip(GzipWriter<W>),
}

impl Adapter<fs::File> {
    ///Opens file at `path` and creates adapter owning it.
    pub fn open_by_path<P: AsRef<Path>>(path: P, mode: OpenMode, kind: Kind, opts: &Options) -> Result<Self, Error> {
        let path = path.as_ref();
        tracing::debug!("open {} ({:?}, {:?})", path.display(), mode, kind);
        match kind {
            Kind::OneShot => OneShot::open(path, mode, opts).map(Self::OneShot),
            Kind::Streaming => Streaming::open(path, mode, opts).map(Self::Streaming),
            #[cfg(feature = "zlib")]
            Kind::Gzip => GzipWriter::open(path, mode, opts).map(Self::Gzip),
            #[cfg(not(feature = "zlib"))]
            Kind::Gzip => Err(Error::Unsupported(crate::session::Format::Gzip)),
        }
    }
}

impl<W: Write> Adapter<W> {
    ///Creates adapter over already open `sink`, which is never closed by adapter.
    pub fn open_on_existing(sink: W, kind: Kind, opts: &Options) -> Result<Self, Error> {
        match kind {
            Kind::OneShot => OneShot::hook(sink, opts).map(Self::OneShot),
            Kind::Streaming => Streaming::hook(sink, opts).map(Self::Streaming),
            #[cfg(feature = "zlib")]
            Kind::Gzip => GzipWriter::hook(sink, opts).map(Self::Gzip),
            #[cfg(not(feature = "zlib"))]
            Kind::Gzip => Err(Error::Unsupported(crate::session::Format::Gzip)),
        }
    }

    #[inline]
    ///Returns kind of adapter
    pub fn kind(&self) -> Kind {
        match self {
            Self::OneShot(_) => Kind::OneShot,
            Self::Streaming(_) => Kind::Streaming,
            #[cfg(feature = "zlib")]
            Self::Gzip(_) => Kind::Gzip,
        }
    }

    #[inline]
    ///Returns timings recorded so far, if enabled.
    pub fn timings(&self) -> Option<&crate::metrics::Timings> {
        match self {
            Self::OneShot(adapter) => adapter.timings(),
            Self::Streaming(adapter) => adapter.timings(),
            #[cfg(feature = "zlib")]
            Self::Gzip(adapter) => adapter.timings(),
        }
    }
}

impl<W: Write> StreamSink for Adapter<W> {
    type Sink = W;

    #[inline]
    fn push(&mut self, buf: &[u8]) -> Result<usize, Error> {
        match self {
            Self::OneShot(adapter) => adapter.push(buf),
            Self::Streaming(adapter) => adapter.push(buf),
            #[cfg(feature = "zlib")]
            Self::Gzip(adapter) => adapter.push(buf),
        }
    }

    #[inline]
    fn owns_sink(&self) -> bool {
        match self {
            Self::OneShot(adapter) => adapter.owns_sink(),
            Self::Streaming(adapter) => adapter.owns_sink(),
            #[cfg(feature = "zlib")]
            Self::Gzip(adapter) => adapter.owns_sink(),
        }
    }

    #[inline]
    fn close(self) -> Result<Option<W>, Error> {
        match self {
            Self::OneShot(adapter) => adapter.close(),
            Self::Streaming(adapter) => adapter.close(),
            #[cfg(feature = "zlib")]
            Self::Gzip(adapter) => adapter.close(),
        }
    }
}

impl<W: Write> Write for Adapter<W> {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::OneShot(adapter) => adapter.write(buf),
            Self::Streaming(adapter) => adapter.write(buf),
            #[cfg(feature = "zlib")]
            Self::Gzip(adapter) => adapter.write(buf),
        }
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::OneShot(adapter) => adapter.flush(),
            Self::Streaming(adapter) => adapter.flush(),
            #[cfg(feature = "zlib")]
            Self::Gzip(adapter) => adapter.flush(),
        }
    }
}
