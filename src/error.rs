use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::engine::Status;
use crate::session::Format;

///Errors produced by sessions, buffers and adapters
#[derive(Debug, Error)]
pub enum Error {
    ///Buffer or session state could not be allocated.
    #[error("unable to allocate {what} ({size} bytes)")]
    Allocation {
        ///What was being allocated
        what: &'static str,
        ///Requested size
        size: usize,
    },
    ///Engine returned unexpected status.
    #[error("engine failed during {op} with status {status:?} after {processed} bytes")]
    Engine {
        ///Operation that failed
        op: &'static str,
        ///Status reported by engine
        status: Status,
        ///Input bytes consumed by the failing call before engine gave up
        processed: usize,
    },
    ///Engine reported success without consuming or producing anything.
    #[error("engine made no progress during {op} after {processed} bytes")]
    Stalled {
        ///Operation that stalled
        op: &'static str,
        ///Input bytes consumed by the call before it stalled
        processed: usize,
    },
    ///Sink accepted fewer bytes than requested.
    #[error("short write: sink accepted {written} of {expected} bytes")]
    ShortWrite {
        ///Bytes requested to be written
        expected: usize,
        ///Bytes sink actually accepted
        written: usize,
    },
    ///Single call input exceeds what the engine accepts.
    #[error("input of {size} bytes exceeds limit of {limit} bytes")]
    SizeLimitExceeded {
        ///Size of rejected input
        size: usize,
        ///Configured limit
        limit: usize,
    },
    ///Session parameters are out of range.
    #[error("invalid session parameter: {0}")]
    Params(&'static str),
    ///Format backend is not compiled in.
    #[error("format {0:?} is not enabled")]
    Unsupported(Format),
    ///Sink could not be opened.
    #[error("unable to open {}: {source}", path.display())]
    Open {
        ///Path of sink
        path: PathBuf,
        ///Underlying error
        #[source]
        source: io::Error,
    },
    ///Sink failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    #[inline]
    ///Returns number of input bytes consumed before the call failed.
    ///
    ///Only engine failures carry progress, everything else reports `0`.
    pub fn processed(&self) -> usize {
        match self {
            Self::Engine { processed, .. } | Self::Stalled { processed, .. } => *processed,
            _ => 0,
        }
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> Self {
        match error {
            Error::Io(error) => error,
            Error::Open { source, .. } => source,
            error @ Error::ShortWrite { .. } => io::Error::new(io::ErrorKind::WriteZero, error),
            error @ Error::SizeLimitExceeded { .. } => io::Error::new(io::ErrorKind::InvalidInput, error),
            error @ Error::Params(_) | error @ Error::Unsupported(_) => io::Error::new(io::ErrorKind::InvalidInput, error),
            error @ Error::Allocation { .. } => io::Error::new(io::ErrorKind::OutOfMemory, error),
            error => io::Error::new(io::ErrorKind::Other, error),
        }
    }
}
