//! Encoder backends
//!
//! This is the raw codec layer sitting under [Session](crate::session::Session).
//! Backends know nothing about blocks, streams or sinks; they compress whatever input they are
//! given into whatever output they are given and report how far they got.

use core::ptr;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
///Encoder operation
pub enum EncodeOp {
    ///Just compress as usual.
    Process,
    ///Finish compression.
    ///
    ///After issuing FINISH, no new data should be added until encoder is reset.
    Finish,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
///Encode status
pub enum EncodeStatus {
    ///Encoded, carry on.
    Continue,
    ///Encoded at least partially, but needs more space to write.
    NeedOutput,
    ///Result after `EncodeOp::Finish` issued
    Finished,
    ///Failed to encode.
    Error,
}

#[derive(Debug)]
///Encode output
pub struct Encode {
    ///Number of bytes left unprocessed in `input`
    pub input_remain: usize,
    ///Number of bytes left unprocessed in `output`
    pub output_remain: usize,
    ///Status after `encode`
    pub status: EncodeStatus,
}

///Encoder interface
///
///Set of function pointers, first argument of which is always backend state.
pub struct Interface {
    //returns new/updated instance, MUST be replaced
    reset_fn: fn(ptr::NonNull<u8>) -> Option<ptr::NonNull<u8>>,
    encode_fn: unsafe fn(ptr::NonNull<u8>, *const u8, usize, *mut u8, usize, EncodeOp) -> Encode,
    bound_fn: fn(usize) -> usize,
    drop_fn: fn(ptr::NonNull<u8>),
}

impl Interface {
    ///Creates new `Interface` with provided functions to build vtable.
    ///
    ///- `bound_fn` must return the worst-case size of a complete member produced from `N` input
    ///bytes, including any header and trailer.
    ///
    ///It is caller responsibility to pass correct function pointers
    pub(crate) const fn new(
        reset_fn: fn(ptr::NonNull<u8>) -> Option<ptr::NonNull<u8>>,
        encode_fn: unsafe fn(ptr::NonNull<u8>, *const u8, usize, *mut u8, usize, EncodeOp) -> Encode,
        bound_fn: fn(usize) -> usize,
        drop_fn: fn(ptr::NonNull<u8>),
    ) -> Self {
        Self {
            reset_fn,
            encode_fn,
            bound_fn,
            drop_fn,
        }
    }

    #[inline(always)]
    pub(crate) fn inner_encoder(&'static self, instance: ptr::NonNull<u8>) -> Encoder {
        Encoder {
            instance,
            interface: self,
        }
    }
}

///Encoder
///
///Use [Interface] to instantiate encoder.
///
///Under hood, in order to avoid generics, implemented as vtable with series of function pointers.
///
///## Example
///
///```rust
///use zsink::encoder::{Interface, ZlibOptions, EncodeOp, EncodeStatus};
///
///let mut encoder = Interface::zlib(ZlibOptions::new()).expect("to create zlib encoder");
///let data = b"one member per block";
///let mut output = vec![0; encoder.bound(data.len())];
///
///let result = encoder.encode(data, &mut output, EncodeOp::Finish);
///assert_eq!(result.status, EncodeStatus::Finished);
///assert_eq!(result.input_remain, 0);
///output.truncate(output.len() - result.output_remain);
///
///assert!(encoder.reset());
///```
pub struct Encoder {
    instance: ptr::NonNull<u8>,
    interface: &'static Interface,
}

impl Encoder {
    #[inline(always)]
    ///Encodes `input` into `output`.
    pub fn encode(&mut self, input: &[u8], output: &mut [u8], op: EncodeOp) -> Encode {
        let input_len = input.len();
        let output_len = output.len();
        unsafe {
            (self.interface.encode_fn)(self.instance, input.as_ptr(), input_len, output.as_mut_ptr(), output_len, op)
        }
    }

    #[inline(always)]
    ///Returns worst-case size of complete member for `input_len` bytes.
    ///
    ///Output of this size is always enough for single `EncodeOp::Finish` call on fresh state.
    pub fn bound(&self, input_len: usize) -> usize {
        (self.interface.bound_fn)(input_len)
    }

    #[inline(always)]
    ///Resets `Encoder` state to initial, making it ready for new member.
    ///
    ///Returns `true` if successfully reset, otherwise `false`
    pub fn reset(&mut self) -> bool {
        match (self.interface.reset_fn)(self.instance) {
            Some(ptr) => {
                self.instance = ptr;
                true
            },
            None => false,
        }
    }
}

unsafe impl Send for Encoder {}

impl Drop for Encoder {
    #[inline]
    fn drop(&mut self) {
        (self.interface.drop_fn)(self.instance);
    }
}

#[cfg(feature = "zlib")]
mod zlib;
#[cfg(feature = "zlib")]
pub use zlib::{ZlibMode, ZlibOptions, ZlibStrategy};
#[cfg(feature = "zstd")]
mod zstd;
#[cfg(feature = "zstd")]
pub use zstd::ZstdOptions;
