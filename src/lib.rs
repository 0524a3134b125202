//!Buffered streaming compression for byte sinks.
//!
//!Adapters take writes of any size and cadence, compress them with [Session] and forward
//!compressed bytes to any [Write](std::io::Write) sink, draining everything engine holds when
//!they are closed.
//!
//!- [OneShot] compresses every write in full before returning.
//!- [Streaming] feeds stateful engine in bounded slices, accumulating output in [Buffer].
//!- [GzipWriter] is plain single member gzip baseline.
//!
//!Compressed output of [Session] is concatenation of independent members, one per block, which
//![Decoder::decode_all] reads back.
//!
//!## Features
//!
//!- `zlib` - Enables deflate, zlib and gzip formats. Default.
//!- `zlib-static` - Enables `zlib` with `static` feature.
//!- `zstd` - Enables zstd format.
//!- `cli` - Builds `zsink` binary.
//!
//!## Example
//!
//!```rust
//!use zsink::{StreamSink, Adapter, Kind, Options, Format};
//!use std::io::Write;
//!
//!let mut adapter = Adapter::open_on_existing(Vec::new(), Kind::Streaming, &Options::new()).expect("to create adapter");
//!write!(adapter, "{} bottles of beer", 99).expect("to write");
//!let compressed = adapter.close().expect("to close").expect("hooked sink is returned");
//!
//!let mut output = Vec::new();
//!Format::Gzip.decoder().expect("decoder").decode_all(&compressed, &mut output).expect("to decode");
//!assert_eq!(output, b"99 bottles of beer");
//!```

#![warn(missing_docs)]
#![allow(clippy::style)]
#![allow(clippy::derivable_impls)]

#[cfg(any(feature = "zlib", feature = "zstd"))]
mod mem;
pub mod decoder;
pub use decoder::{Decoder, Decode, DecodeStatus, DecodeError};
pub mod encoder;
pub use encoder::{Encoder, Encode, EncodeOp, EncodeStatus};
mod error;
pub use error::Error;
pub mod engine;
pub use engine::{Engine, Status, Stream, Compressed};
pub mod session;
pub use session::{Session, SessionParams, Format, Huffman};
pub mod buffer;
pub use buffer::Buffer;
pub mod metrics;
pub mod adapter;
pub use adapter::{StreamSink, Adapter, Kind, Options, OpenMode, Ownership, OneShot, Streaming};
#[cfg(feature = "zlib")]
pub use adapter::GzipWriter;
