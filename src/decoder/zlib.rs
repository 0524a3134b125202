//! `zlib` decoder

use libz_sys as sys;

use core::{cmp, mem, ptr};

use super::{Decode, DecodeError, DecodeStatus, Decoder, Interface};
use crate::mem::{free, zalloc};

static ZLIB: Interface = Interface::new(
    decode_fn,
    reset_fn,
    drop_fn,
);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i8)]
///Decompression mode
pub enum ZlibMode {
    ///Assumes raw deflate
    Deflate = -15,
    ///Assumes zlib header
    Zlib = 15,
    ///Assumes gzip header
    Gzip = 15 + 16,
    ///Automatically detect zlib or gzip header.
    ///
    ///Default value.
    Auto = 15 + 32,
}

impl Default for ZlibMode {
    #[inline(always)]
    fn default() -> Self {
        Self::Auto
    }
}

struct State {
    inner: sys::z_stream,
}

impl State {
    fn reset(&mut self) -> bool {
        unsafe {
            sys::inflateReset(&mut self.inner) == sys::Z_OK
        }
    }
}

impl Drop for State {
    #[inline(always)]
    fn drop(&mut self) {
        unsafe {
            sys::inflateEnd(&mut self.inner);
        }
    }
}

impl Interface {
    ///Creates decoder with `zlib` interface
    ///
    ///Returns `None` if unable to initialize it (likely due to lack of memory)
    pub fn zlib(mode: ZlibMode) -> Option<Decoder> {
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
            sys::inflateInit2_(&mut instance.inner, mode as _, sys::zlibVersion(), mem::size_of::<sys::z_stream>() as _)
        };

        if result == sys::Z_OK {
            let instance = ptr::NonNull::from(Box::leak(instance));
            Some(ZLIB.inner_decoder(instance.cast()))
        } else {
            None
        }
    }
}

unsafe fn decode_fn(state: ptr::NonNull<u8>, input: *const u8, input_len: usize, output: *mut u8, output_len: usize) -> Decode {
    let state = &mut *(state.as_ptr() as *mut State);

    let input_avail = cmp::min(input_len, u32::MAX as usize);
    let output_avail = cmp::min(output_len, u32::MAX as usize);

    state.inner.next_in = input as *mut _;
    state.inner.avail_in = input_avail as _;
    state.inner.next_out = output;
    state.inner.avail_out = output_avail as _;

    let result = sys::inflate(&mut state.inner, sys::Z_NO_FLUSH);

    let input_remain = input_len - (input_avail - state.inner.avail_in as usize);
    Decode {
        input_remain,
        output_remain: output_len - (output_avail - state.inner.avail_out as usize),
        status: match result {
            sys::Z_STREAM_END => Ok(DecodeStatus::Finished),
            //No progress possible: either input or output is exhausted
            sys::Z_OK | sys::Z_BUF_ERROR => match input_remain {
                0 => Ok(DecodeStatus::NeedInput),
                _ => Ok(DecodeStatus::NeedOutput),
            },
            other => Err(DecodeError(other)),
        },
    }
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
