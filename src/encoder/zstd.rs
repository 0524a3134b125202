//! `zstd` backend

use zstd_sys as sys;

use core::ptr;

use super::{Encode, EncodeOp, EncodeStatus, Encoder, Interface};
use crate::mem::{free, malloc};

static ZSTD: Interface = Interface::new(
    reset_fn,
    encode_fn,
    bound_fn,
    drop_fn,
);

extern "C" {
    fn ZSTD_getErrorCode(result: usize) -> i32;
}

impl EncodeOp {
    #[inline(always)]
    const fn into_zstd(self) -> sys::ZSTD_EndDirective {
        match self {
            Self::Process => sys::ZSTD_EndDirective::ZSTD_e_continue,
            Self::Finish => sys::ZSTD_EndDirective::ZSTD_e_end,
        }
    }
}

#[derive(Copy, Clone, Debug)]
///ZSTD options.
pub struct ZstdOptions {
    level: i32,
}

impl ZstdOptions {
    #[inline(always)]
    ///Creates new default value
    pub const fn new() -> Self {
        Self {
            level: sys::ZSTD_CLEVEL_DEFAULT as _,
        }
    }

    #[inline(always)]
    ///Sets level
    ///
    ///Negative values select the fast levels.
    pub const fn level(mut self, level: i32) -> Self {
        assert!(level <= sys::ZSTD_TARGETLENGTH_MAX as i32);
        assert!(level >= -(sys::ZSTD_TARGETLENGTH_MAX as i32));
        self.level = level;
        self
    }

    #[inline(always)]
    fn apply(&self, ctx: ptr::NonNull<sys::ZSTD_CCtx>) -> Option<ptr::NonNull<sys::ZSTD_CCtx>> {
        let result = unsafe {
            sys::ZSTD_isError(sys::ZSTD_CCtx_setParameter(ctx.as_ptr(), sys::ZSTD_cParameter::ZSTD_c_compressionLevel, self.level))
        };

        if result == 0 {
            Some(ctx)
        } else {
            unsafe {
                sys::ZSTD_freeCCtx(ctx.as_ptr());
            }
            None
        }
    }
}

impl Default for ZstdOptions {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Interface {
    #[inline]
    ///Creates encoder with `zstd` interface
    ///
    ///Returns `None` if unable to initialize it (likely due to lack of memory)
    pub fn zstd(opts: ZstdOptions) -> Option<Encoder> {
        let allocator = sys::ZSTD_customMem {
            customAlloc: Some(malloc),
            customFree: Some(free),
            opaque: ptr::null_mut(),
        };
        let ctx = unsafe {
            sys::ZSTD_createCCtx_advanced(allocator)
        };
        ptr::NonNull::new(ctx).and_then(|ctx| opts.apply(ctx)).map(|ctx| ZSTD.inner_encoder(ctx.cast()))
    }
}

unsafe fn encode_fn(state: ptr::NonNull<u8>, input: *const u8, input_len: usize, output: *mut u8, output_len: usize, op: EncodeOp) -> Encode {
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
    let result = sys::ZSTD_compressStream2(state.cast().as_ptr(), &mut output, &mut input, op.into_zstd());

    Encode {
        input_remain: input.size - input.pos,
        output_remain: output.size - output.pos,
        status: match result {
            //Nothing left to flush, so frame is complete if finish was requested.
            0 => match op {
                EncodeOp::Finish => EncodeStatus::Finished,
                _ => EncodeStatus::Continue,
            },
            size if sys::ZSTD_isError(size) == 0 => {
                if output.pos == output.size {
                    EncodeStatus::NeedOutput
                } else {
                    EncodeStatus::Continue
                }
            },
            size => match ZSTD_getErrorCode(size) {
                //dstSize_tooSmall and srcSize_wrong
                70 | 80 => EncodeStatus::NeedOutput,
                _ => EncodeStatus::Error,
            },
        },
    }
}

#[inline]
fn bound_fn(len: usize) -> usize {
    unsafe {
        sys::ZSTD_compressBound(len)
    }
}

#[inline]
fn reset_fn(state: ptr::NonNull<u8>) -> Option<ptr::NonNull<u8>> {
    let result = unsafe {
        sys::ZSTD_CCtx_reset(state.cast().as_ptr(), sys::ZSTD_ResetDirective::ZSTD_reset_session_only)
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
        sys::ZSTD_freeCCtx(state.cast().as_ptr())
    };
    debug_assert_eq!(result, 0);
}
