//! Decoder
//!
//! Counterpart of [encoder](crate::encoder), used to read back what the adapters wrote.
use core::ptr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
///Decoding error
pub struct DecodeError(i32);

impl DecodeError {
    ///Creates error which means no error.
    ///
    ///Specifically its code is 0
    pub const fn no_error() -> Self {
        Self(0)
    }

    ///Creates error reported when input ends in the middle of member.
    pub const fn truncated() -> Self {
        Self(i32::MIN)
    }

    ///Creates error reported when decoder cannot be reset for the next member.
    pub const fn reset_failed() -> Self {
        Self(i32::MIN + 1)
    }

    #[inline(always)]
    ///Returns raw integer
    pub const fn as_raw(&self) -> i32 {
        self.0
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            0 => fmt.write_str("no error"),
            i32::MIN => fmt.write_str("input is truncated"),
            code if code == i32::MIN + 1 => fmt.write_str("unable to reset decoder"),
            code => write!(fmt, "decoder failed with code {code}"),
        }
    }
}

impl std::error::Error for DecodeError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
///Result of decoding
pub enum DecodeStatus {
    ///Cannot finish due to lack of input data
    NeedInput,
    ///Need to flush data somewhere before continuing
    NeedOutput,
    ///Successfully finished decoding of current member.
    Finished,
}

///Decode output
pub struct Decode {
    ///Number of bytes left unprocessed in `input`
    pub input_remain: usize,
    ///Number of bytes left unprocessed in `output`
    pub output_remain: usize,
    ///Result of decoding
    pub status: Result<DecodeStatus, DecodeError>,
}

///Decoder interface
pub struct Interface {
    decode_fn: unsafe fn(ptr::NonNull<u8>, *const u8, usize, *mut u8, usize) -> Decode,
    //returns new/updated instance, MUST be replaced
    reset_fn: fn(ptr::NonNull<u8>) -> Option<ptr::NonNull<u8>>,
    drop_fn: fn(ptr::NonNull<u8>),
}

impl Interface {
    ///Creates new `Interface` with provided functions to build vtable.
    ///
    ///It is caller responsibility to pass correct function pointers
    pub(crate) const fn new(
        decode_fn: unsafe fn(ptr::NonNull<u8>, *const u8, usize, *mut u8, usize) -> Decode,
        reset_fn: fn(ptr::NonNull<u8>) -> Option<ptr::NonNull<u8>>,
        drop_fn: fn(ptr::NonNull<u8>),
    ) -> Self {
        Self {
            decode_fn,
            reset_fn,
            drop_fn,
        }
    }

    #[inline(always)]
    pub(crate) fn inner_decoder(&'static self, instance: ptr::NonNull<u8>) -> Decoder {
        Decoder {
            instance,
            interface: self,
        }
    }
}

///Decoder
///
///Use [Interface] to instantiate decoder.
///
///Under hood, in order to avoid generics, implemented as vtable with series of function pointers.
pub struct Decoder {
    instance: ptr::NonNull<u8>,
    interface: &'static Interface,
}

impl Decoder {
    #[inline(always)]
    ///Decodes `input` into `output`.
    pub fn decode(&mut self, input: &[u8], output: &mut [u8]) -> Decode {
        let input_len = input.len();
        let output_len = output.len();
        unsafe {
            (self.interface.decode_fn)(self.instance, input.as_ptr(), input_len, output.as_mut_ptr(), output_len)
        }
    }

    ///Decodes every member found in `input`, appending result to `output`.
    ///
    ///Adapters emit one complete member per compressed block, so decoder is reset each time
    ///member ends and decoding carries on with the rest of input.
    ///
    ///Returns `DecodeError::truncated()` if `input` ends inside of member.
    ///
    ///## Example
    ///
    ///```rust
    ///use zsink::{StreamSink, Adapter, Kind, Options, Format};
    ///
    ///let mut adapter = Adapter::open_on_existing(Vec::new(), Kind::Streaming, &Options::new()).expect("to create adapter");
    ///adapter.push(b"first write, ").expect("to write");
    ///adapter.push(b"second write").expect("to write");
    ///let compressed = adapter.close().expect("to close").expect("hooked sink is returned");
    ///
    ///let mut decoder = Format::Gzip.decoder().expect("to create decoder");
    ///let mut output = Vec::new();
    ///decoder.decode_all(&compressed, &mut output).expect("to decode");
    ///assert_eq!(output, b"first write, second write");
    ///```
    pub fn decode_all(&mut self, mut input: &[u8], output: &mut Vec<u8>) -> Result<(), DecodeError> {
        const RESERVE_MIN: usize = 1024;

        let mut in_member = false;
        loop {
            if input.is_empty() && !in_member {
                break Ok(());
            }

            output.reserve(core::cmp::max(input.len() * 2, RESERVE_MIN));
            let len = output.len();
            let spare_len = output.capacity() - len;
            output.resize(len + spare_len, 0);
            let result = self.decode(input, &mut output[len..]);
            output.truncate(len + spare_len - result.output_remain);

            let consumed = input.len() - result.input_remain;
            input = &input[consumed..];
            in_member = true;

            match result.status? {
                DecodeStatus::Finished => {
                    in_member = false;
                    if !self.reset() {
                        break Err(DecodeError::reset_failed());
                    }
                },
                DecodeStatus::NeedOutput => continue,
                //Output got filled exactly, decoder may still hold data.
                DecodeStatus::NeedInput if result.output_remain == 0 => continue,
                DecodeStatus::NeedInput => if input.is_empty() {
                    break Err(DecodeError::truncated());
                },
            }
        }
    }

    #[inline(always)]
    ///Resets `Decoder` state to initial.
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

unsafe impl Send for Decoder {}

impl Drop for Decoder {
    #[inline]
    fn drop(&mut self) {
        (self.interface.drop_fn)(self.instance);
    }
}

#[cfg(feature = "zlib")]
mod zlib;
#[cfg(feature = "zlib")]
pub use zlib::ZlibMode;
#[cfg(feature = "zstd")]
mod zstd;
