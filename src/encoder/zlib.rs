//! `zlib` backend

use libz_sys as sys;

use core::{cmp, mem, ptr};

use super::{Encode, EncodeOp, EncodeStatus, Encoder, Interface};
use crate::mem::{free, zalloc};

const DEF_MEM_LEVEL: u8 = 8;
//Largest wrapper is gzip: 10 bytes header and 8 bytes trailer.
const MAX_WRAPPER_LEN: usize = 18;

static ZLIB: Interface = Interface::new(
    reset_fn,
    encode_fn,
    bound_fn,
    drop_fn,
);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
///Compression strategy
pub enum ZlibStrategy {
    ///Default strategy.
    Default,
    ///Prevents using dynamic Huffman codes.
    Fixed,
}

impl ZlibStrategy {
    #[inline(always)]
    const fn into_sys(self) -> core::ffi::c_int {
        match self {
            Self::Default => sys::Z_DEFAULT_STRATEGY,
            Self::Fixed => sys::Z_FIXED,
        }
    }
}

impl Default for ZlibStrategy {
    #[inline(always)]
    fn default() -> Self {
        ZlibStrategy::Default
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i8)]
///Compression mode
pub enum ZlibMode {
    ///Uses raw deflate
    Deflate = -15,
    ///Uses zlib header
    Zlib = 15,
    ///Uses gzip header
    ///
    ///Default.
    Gzip = 15 + 16,
}

impl Default for ZlibMode {
    #[inline(always)]
    fn default() -> Self {
        ZlibMode::Gzip
    }
}

#[derive(Copy, Clone, Debug)]
///Zlib configuration for encoder.
pub struct ZlibOptions {
    ///Mode
    pub mode: ZlibMode,
    ///Strategy
    pub strategy: ZlibStrategy,
    pub(crate) compression: i8,
}

impl ZlibOptions {
    #[inline(always)]
    ///Creates new default options
    pub const fn new() -> Self {
        Self {
            mode: ZlibMode::Gzip,
            strategy: ZlibStrategy::Default,
            compression: 9,
        }
    }

    #[inline]
    ///Sets zlib mode
    pub const fn mode(mut self, new_mode: ZlibMode) -> Self {
        self.mode = new_mode;
        self
    }

    #[inline]
    ///Sets zlib strategy
    pub const fn strategy(mut self, new_strategy: ZlibStrategy) -> Self {
        self.strategy = new_strategy;
        self
    }

    #[inline]
    ///Sets zlib compression in range from 1 to 9
    ///
    ///Defaults to 9.
    ///
    ///Use `-1` for zlib default.
    pub const fn compression(mut self, compression: i8) -> Self {
        self.compression = compression;
        self
    }
}

impl Default for ZlibOptions {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

struct State {
    inner: sys::z_stream,
}

impl State {
    fn reset(&mut self) -> bool {
        unsafe {
            sys::deflateReset(&mut self.inner) == sys::Z_OK
        }
    }
}

impl Drop for State {
    #[inline(always)]
    fn drop(&mut self) {
        unsafe {
            sys::deflateEnd(&mut self.inner);
        }
    }
}

impl Interface {
    ///Creates encoder with `zlib` interface
    ///
    ///Returns `None` if unable to initialize it (likely due to lack of memory or invalid options)
    pub fn zlib(opts: ZlibOptions) -> Option<Encoder> {
        //z_stream must not move after init, zlib keeps pointer back to it.
        let mut instance = Box::new(State {
            inner: sys::z_stream {
                next_in: ptr::null_mut(),
                avail_in: 0,
                total_in: 0,
                next_out: ptr::null_mut(),
                avail_out: 0,
                total_out: 0,
                msg: ptr::null_mut(),
                state: ptr::null_mut(),
                zalloc,
                zfree: free,
                opaque: ptr::null_mut(),
                data_type: 0,
                adler: 0,
                reserved: 0,
            },
        });

        let result = unsafe {
            sys::deflateInit2_(
                &mut instance.inner,
                opts.compression as _,
                sys::Z_DEFLATED,
                opts.mode as _,
                DEF_MEM_LEVEL as _,
                opts.strategy.into_sys(),
                sys::zlibVersion(),
                mem::size_of::<sys::z_stream>() as _,
            )
        };

        if result == sys::Z_OK {
            let instance = ptr::NonNull::from(Box::leak(instance));
            Some(ZLIB.inner_encoder(instance.cast()))
        } else {
            //deflateEnd on never initialized stream is harmless
            drop(instance);
            None
        }
    }
}

unsafe fn encode_fn(state: ptr::NonNull<u8>, input: *const u8, input_len: usize, output: *mut u8, output_len: usize, op: EncodeOp) -> Encode {
    let flush = match op {
        EncodeOp::Process => sys::Z_NO_FLUSH,
        EncodeOp::Finish => sys::Z_FINISH,
    };

    let state = &mut *(state.as_ptr() as *mut State);

    //zlib counts in 32bit, anything above is reported back as remaining.
    let input_avail = cmp::min(input_len, u32::MAX as usize);
    let output_avail = cmp::min(output_len, u32::MAX as usize);

    state.inner.next_in = input as *mut _;
    state.inner.avail_in = input_avail as _;
    state.inner.next_out = output;
    state.inner.avail_out = output_avail as _;

    let result = sys::deflate(&mut state.inner, flush);

    Encode {
        input_remain: input_len - (input_avail - state.inner.avail_in as usize),
        output_remain: output_len - (output_avail - state.inner.avail_out as usize),
        status: match result {
            sys::Z_STREAM_END => EncodeStatus::Finished,
            //On finish zlib reports OK while it still needs room for the rest of member
            sys::Z_OK => match op {
                EncodeOp::Finish => EncodeStatus::NeedOutput,
                _ => EncodeStatus::Continue,
            },
            sys::Z_BUF_ERROR => EncodeStatus::NeedOutput,
            _ => EncodeStatus::Error,
        },
    }
}

#[inline]
fn bound_fn(len: usize) -> usize {
    //Conservative deflateBound(), valid for either strategy.
    len + ((len + 7) >> 3) + ((len + 63) >> 6) + 5 + MAX_WRAPPER_LEN
}

#[inline]
fn reset_fn(state: ptr::NonNull<u8>) -> Option<ptr::NonNull<u8>> {
    let result = unsafe {
        (*(state.as_ptr() as *mut State)).reset()
    };
    if result {
        Some(state)
    } else {
        None
    }
}

#[inline]
fn drop_fn(state: ptr::NonNull<u8>) {
    unsafe {
        drop(Box::from_raw(state.as_ptr() as *mut State));
    }
}
