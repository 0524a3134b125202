//! Software compression session
//!
//! [Session] cuts data into blocks of `hw_buff_sz` bytes and turns each block into an independent,
//! complete member of the selected [Format]. Compressed output is therefore a plain
//! concatenation of members, which [Decoder::decode_all](crate::decoder::Decoder::decode_all)
//! reads back.

use core::cmp;

use crate::decoder::Decoder;
use crate::encoder::{EncodeOp, EncodeStatus, Encoder};
use crate::engine::{Compressed, Engine, Status, Stream};
use crate::error::Error;

const KB: usize = 1024;
///Smallest accepted block size.
pub const MIN_BUFF_SZ: usize = KB;
///Largest accepted block size.
pub const MAX_BUFF_SZ: usize = 512 * KB;
///Largest accepted amount of staged stream input.
pub const MAX_STRM_BUFF_SZ: usize = 2 * KB * KB - 5 * KB;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
///Compressed data format
pub enum Format {
    ///Raw deflate members
    Deflate,
    ///zlib members
    Zlib,
    ///gzip members
    ///
    ///Default.
    Gzip,
    ///zstd frames
    Zstd,
}

impl Format {
    #[inline]
    ///Returns conventional file extension.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Deflate => "deflate",
            Self::Zlib => "zz",
            Self::Gzip => "gz",
            Self::Zstd => "zst",
        }
    }

    #[inline]
    ///Returns inclusive range of compression levels format understands.
    pub const fn levels(self) -> (i32, i32) {
        match self {
            Self::Deflate | Self::Zlib | Self::Gzip => (1, 9),
            Self::Zstd => (1, 22),
        }
    }

    #[allow(unused_variables)]
    pub(crate) fn encoder(self, level: i32, huffman: Huffman) -> Result<Encoder, Error> {
        let encoder = match self {
            #[cfg(feature = "zlib")]
            Self::Deflate | Self::Zlib | Self::Gzip => {
                use crate::encoder::{ZlibMode, ZlibOptions, ZlibStrategy};

                let mode = match self {
                    Self::Deflate => ZlibMode::Deflate,
                    Self::Zlib => ZlibMode::Zlib,
                    _ => ZlibMode::Gzip,
                };
                let strategy = match huffman {
                    Huffman::Dynamic => ZlibStrategy::Default,
                    Huffman::Static => ZlibStrategy::Fixed,
                };
                crate::encoder::Interface::zlib(ZlibOptions::new().mode(mode).strategy(strategy).compression(level as i8))
            },
            #[cfg(feature = "zstd")]
            Self::Zstd => crate::encoder::Interface::zstd(crate::encoder::ZstdOptions::new().level(level)),
            #[allow(unreachable_patterns)]
            _ => return Err(Error::Unsupported(self)),
        };

        encoder.ok_or(Error::Allocation {
            what: "encoder state",
            size: 0,
        })
    }

    ///Creates decoder able to read data written in this format.
    pub fn decoder(self) -> Result<Decoder, Error> {
        let decoder = match self {
            #[cfg(feature = "zlib")]
            Self::Deflate => crate::decoder::Interface::zlib(crate::decoder::ZlibMode::Deflate),
            #[cfg(feature = "zlib")]
            Self::Zlib => crate::decoder::Interface::zlib(crate::decoder::ZlibMode::Zlib),
            #[cfg(feature = "zlib")]
            Self::Gzip => crate::decoder::Interface::zlib(crate::decoder::ZlibMode::Gzip),
            #[cfg(feature = "zstd")]
            Self::Zstd => crate::decoder::Interface::zstd(),
            #[allow(unreachable_patterns)]
            _ => return Err(Error::Unsupported(self)),
        };

        decoder.ok_or(Error::Allocation {
            what: "decoder state",
            size: 0,
        })
    }
}

impl Default for Format {
    #[inline(always)]
    fn default() -> Self {
        Self::Gzip
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
///Huffman header kind
pub enum Huffman {
    ///Dynamic Huffman codes, computed per block.
    ///
    ///Default.
    Dynamic,
    ///Fixed Huffman codes only.
    Static,
}

impl Default for Huffman {
    #[inline(always)]
    fn default() -> Self {
        Self::Dynamic
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
///Session parameters.
///
///`SessionParams::new()` gives engine defaults: gzip, dynamic Huffman codes, level 1 and
///64 KiB for both block and stream buffer sizes.
pub struct SessionParams {
    format: Format,
    huffman: Huffman,
    level: i32,
    hw_buff_sz: usize,
    strm_buff_sz: usize,
}

impl SessionParams {
    #[inline(always)]
    ///Creates default parameters
    pub const fn new() -> Self {
        Self {
            format: Format::Gzip,
            huffman: Huffman::Dynamic,
            level: 1,
            hw_buff_sz: 64 * KB,
            strm_buff_sz: 64 * KB,
        }
    }

    #[inline]
    ///Sets output format
    pub const fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[inline]
    ///Sets Huffman header kind
    ///
    ///Only meaningful for deflate based formats.
    pub const fn huffman(mut self, huffman: Huffman) -> Self {
        self.huffman = huffman;
        self
    }

    #[inline]
    ///Sets compression level
    ///
    ///Defaults to 1, which is considerably faster than the rest for small loss of ratio.
    pub const fn level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    #[inline]
    ///Sets block size
    ///
    ///Must be power of two in range from 1 KiB to 512 KiB. Defaults to 64 KiB.
    ///
    ///Streaming adapter offers quarter of this size to engine per call.
    pub const fn hw_buff_sz(mut self, size: usize) -> Self {
        self.hw_buff_sz = size;
        self
    }

    #[inline]
    ///Sets how much stream input is staged before it gets compressed
    ///
    ///Must be in range from 1 KiB to 2 MiB - 5 KiB. Defaults to 64 KiB.
    pub const fn strm_buff_sz(mut self, size: usize) -> Self {
        self.strm_buff_sz = size;
        self
    }

    #[inline(always)]
    ///Returns format
    pub const fn get_format(&self) -> Format {
        self.format
    }

    #[inline(always)]
    ///Returns Huffman header kind
    pub const fn get_huffman(&self) -> Huffman {
        self.huffman
    }

    #[inline(always)]
    ///Returns compression level
    pub const fn get_level(&self) -> i32 {
        self.level
    }

    #[inline(always)]
    ///Returns block size
    pub const fn get_hw_buff_sz(&self) -> usize {
        self.hw_buff_sz
    }

    #[inline(always)]
    ///Returns stream staging size
    pub const fn get_strm_buff_sz(&self) -> usize {
        self.strm_buff_sz
    }

    ///Checks that every parameter is in range.
    pub fn validate(&self) -> Result<(), Error> {
        if !self.hw_buff_sz.is_power_of_two() || self.hw_buff_sz < MIN_BUFF_SZ || self.hw_buff_sz > MAX_BUFF_SZ {
            return Err(Error::Params("hw_buff_sz must be power of two between 1 KiB and 512 KiB"));
        }
        if self.strm_buff_sz < MIN_BUFF_SZ || self.strm_buff_sz > MAX_STRM_BUFF_SZ {
            return Err(Error::Params("strm_buff_sz must be between 1 KiB and 2 MiB - 5 KiB"));
        }
        let (min, max) = self.format.levels();
        if self.level < min || self.level > max {
            return Err(Error::Params("level is out of range for format"));
        }
        Ok(())
    }
}

impl Default for SessionParams {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Active,
    TornDown,
    Closed,
}

///Software compression session.
///
///## Example
///
///```rust
///use zsink::{Engine, Session, SessionParams, Status};
///
///let mut session = Session::new(SessionParams::new()).expect("to create session");
///let data = b"compress me, compress me, compress me";
///let mut output = vec![0; session.compress_bound(data.len())];
///
///let result = session.compress(data, &mut output);
///assert_eq!(result.status, Status::Ok);
///assert_eq!(result.consumed, data.len());
///assert!(result.produced > 0);
///```
pub struct Session {
    params: SessionParams,
    encoder: Encoder,
    staging: Vec<u8>,
    spill: Vec<u8>,
    spill_pos: usize,
    state: State,
}

impl Session {
    ///Creates session set up with `params`.
    pub fn new(params: SessionParams) -> Result<Self, Error> {
        params.validate()?;
        let encoder = params.format.encoder(params.level, params.huffman)?;

        let mut staging = Vec::new();
        staging.try_reserve_exact(params.strm_buff_sz).map_err(|_| Error::Allocation {
            what: "stream staging buffer",
            size: params.strm_buff_sz,
        })?;

        Ok(Self {
            params,
            encoder,
            staging,
            spill: Vec::new(),
            spill_pos: 0,
            state: State::Active,
        })
    }

    #[inline(always)]
    fn is_active(&self) -> bool {
        self.state == State::Active
    }

    #[inline(always)]
    fn spill_remain(&self) -> usize {
        self.spill.len() - self.spill_pos
    }

    //Compresses everything staged into spill, one member per block.
    fn compress_staging(&mut self) -> Status {
        for block in self.staging.chunks(self.params.hw_buff_sz) {
            let start = self.spill.len();
            let bound = self.encoder.bound(block.len());
            if self.spill.try_reserve(bound).is_err() {
                return Status::Fail;
            }
            self.spill.resize(start + bound, 0);

            match encode_member(&mut self.encoder, block, &mut self.spill[start..]) {
                Ok(size) => self.spill.truncate(start + size),
                Err(status) => {
                    self.spill.truncate(start);
                    return status;
                }
            }
        }

        self.staging.clear();
        Status::Ok
    }
}

//Encodes `block` as complete member, leaving encoder ready for the next one.
fn encode_member(encoder: &mut Encoder, block: &[u8], output: &mut [u8]) -> Result<usize, Status> {
    let result = encoder.encode(block, output, EncodeOp::Finish);
    let produced = output.len() - result.output_remain;
    let status = match result.status {
        EncodeStatus::Finished if result.input_remain == 0 => Ok(produced),
        EncodeStatus::NeedOutput => Err(Status::BufError),
        _ => Err(Status::Fail),
    };

    if encoder.reset() {
        status
    } else {
        Err(Status::Fail)
    }
}

impl Engine for Session {
    #[inline(always)]
    fn params(&self) -> &SessionParams {
        &self.params
    }

    #[inline]
    fn compress_bound(&self, len: usize) -> usize {
        let blocks = len / self.params.hw_buff_sz;
        let tail = len % self.params.hw_buff_sz;
        let mut bound = blocks * self.encoder.bound(self.params.hw_buff_sz);
        if tail > 0 {
            bound += self.encoder.bound(tail);
        }
        bound
    }

    fn compress(&mut self, input: &[u8], output: &mut [u8]) -> Compressed {
        let mut result = Compressed {
            consumed: 0,
            produced: 0,
            status: Status::Ok,
        };

        if !self.is_active() {
            result.status = Status::Fail;
            return result;
        }

        for block in input.chunks(self.params.hw_buff_sz) {
            let out = &mut output[result.produced..];
            //Member is never split across calls, so block is attempted only when it surely fits.
            let bound = self.encoder.bound(block.len());
            if out.len() < bound {
                result.status = Status::BufError;
                break;
            }

            match encode_member(&mut self.encoder, block, &mut out[..bound]) {
                Ok(size) => {
                    result.consumed += block.len();
                    result.produced += size;
                },
                Err(status) => {
                    result.status = status;
                    break;
                }
            }
        }

        result
    }

    fn compress_stream(&mut self, stream: &mut Stream, input: &[u8], output: &mut [u8], last: bool) -> Status {
        stream.consumed = 0;
        stream.produced = 0;

        if !self.is_active() {
            return Status::Fail;
        }

        let mut status = Status::Ok;
        loop {
            if self.spill_remain() > 0 {
                let len = cmp::min(self.spill_remain(), output.len() - stream.produced);
                let chunk = &self.spill[self.spill_pos..self.spill_pos + len];
                output[stream.produced..stream.produced + len].copy_from_slice(chunk);
                stream.produced += len;
                self.spill_pos += len;

                if self.spill_remain() > 0 {
                    break;
                }
            }
            self.spill.clear();
            self.spill_pos = 0;

            let room = self.params.strm_buff_sz - self.staging.len();
            let len = cmp::min(room, input.len() - stream.consumed);
            self.staging.extend_from_slice(&input[stream.consumed..stream.consumed + len]);
            stream.consumed += len;

            let is_full = self.staging.len() == self.params.strm_buff_sz;
            let is_final = last && stream.consumed == input.len() && !self.staging.is_empty();
            if !(is_full || is_final) {
                break;
            }

            status = self.compress_staging();
            if !status.is_ok() {
                break;
            }
        }

        stream.pending_in = self.staging.len();
        stream.pending_out = self.spill_remain();
        status
    }

    fn end_stream(&mut self, stream: &mut Stream) -> Status {
        let discarded = self.staging.len() + self.spill_remain();
        if discarded > 0 {
            tracing::warn!("end_stream: discarding {} pending bytes", discarded);
        }

        self.staging.clear();
        self.spill.clear();
        self.spill_pos = 0;
        *stream = Stream::new();
        Status::Ok
    }

    fn teardown(&mut self) -> Status {
        match self.state {
            State::Active => {
                self.state = State::TornDown;
                self.staging = Vec::new();
                self.spill = Vec::new();
                self.spill_pos = 0;
                if self.encoder.reset() {
                    Status::Ok
                } else {
                    Status::Fail
                }
            },
            State::TornDown => Status::Ok,
            State::Closed => Status::Fail,
        }
    }

    fn close(&mut self) -> Status {
        let status = match self.state {
            State::Active => self.teardown(),
            State::TornDown => Status::Ok,
            State::Closed => Status::Fail,
        };
        self.state = State::Closed;
        status
    }
}
