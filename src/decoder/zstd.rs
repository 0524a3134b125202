//! `zstd` decoder

use zstd_sys as sys;

use core::ptr;

use super::{Decode, DecodeError, DecodeStatus, Decoder, Interface};
use crate::mem::{free, malloc};

static ZSTD: Interface = Interface::new(
    decode_fn,
    reset_fn,
    drop_fn,
);

impl Interface {
    #[inline]
    ///Creates decoder with `zstd` interface
    ///
    ///Returns `None` if unable to initialize it (likely due to lack of memory)
    pub fn zstd() -> Option<Decoder> {
        let allocator = sys::ZSTD_customMem {
            customAlloc: Some(malloc),
            customFree: Some(free),
            opaque: ptr::null_mut(),
        };
        let ctx = unsafe {
            sys::ZSTD_createDCtx_advanced(allocator)
        };
        ptr::NonNull::new(ctx).map(|ctx| ZSTD.inner_decoder(ctx.cast()))
    }
}

unsafe fn decode_fn(state: ptr::NonNull<u8>, input: *const u8, input_len: usize, output: *mut u8, output_len: usize) -> Decode {
    let mut input = sys::ZSTD_inBuffer_s {
        src: input as _,
        size: input_len,
        pos: 0,
    };
    let mut output = sys::ZSTD_outBuffer_s {
        dst: output as _,
        size: output_len,
        pos: 0,
    };
    let result = sys::ZSTD_decompressStream(state.cast().as_ptr(), &mut output, &mut input);

    Decode {
        input_remain: input.size - input.pos,
        output_remain: output.size - output.pos,
        status: match result {
            0 => Ok(DecodeStatus::Finished),
            size if sys::ZSTD_isError(size) != 0 => Err(DecodeError(size as _)),
            //Non-zero hint: frame is not complete yet.
            _ => if output.pos == output.size {
                Ok(DecodeStatus::NeedOutput)
            } else {
                Ok(DecodeStatus::NeedInput)
            },
        },
    }
}

#[inline]
fn reset_fn(state: ptr::NonNull<u8>) -> Option<ptr::NonNull<u8>> {
    let result = unsafe {
        sys::ZSTD_DCtx_reset(state.cast().as_ptr(), sys::ZSTD_ResetDirective::ZSTD_reset_session_only)
    };
    if result == 0 {
        Some(state)
    } else {
        None
    }
}

#[inline]
fn drop_fn(state: ptr::NonNull<u8>) {
    let result = unsafe {
        sys::ZSTD_freeDCtx(state.cast().as_ptr())
    };
    debug_assert_eq!(result, 0);
}
