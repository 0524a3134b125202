//!Allocation hooks handed to the C compression libraries.
//!
//!Every block carries a header with its requested size, so `free` can rebuild the layout that
//!Rust's global allocator needs.

use core::ffi::{c_uint, c_void};
use core::ptr;
use std::alloc::{self, Layout};

//Also the header size, which keeps the returned pointer aligned.
const ALIGN: usize = 16;

#[inline(always)]
fn layout(size: usize) -> Option<Layout> {
    let total = size.checked_add(ALIGN)?;
    Layout::from_size_align(total, ALIGN).ok()
}

///`malloc` with opaque state, as expected by `ZSTD_customMem`
pub(crate) unsafe extern "C" fn malloc(_: *mut c_void, size: usize) -> *mut c_void {
    let layout = match layout(size) {
        Some(layout) => layout,
        None => return ptr::null_mut(),
    };

    let base = alloc::alloc(layout);
    if base.is_null() {
        return ptr::null_mut();
    }

    ptr::write(base as *mut usize, size);
    base.add(ALIGN) as _
}

///`zalloc` as expected by `z_stream`
#[allow(unused)]
pub(crate) unsafe extern "C" fn zalloc(opaque: *mut c_void, items: c_uint, size: c_uint) -> *mut c_void {
    match (items as usize).checked_mul(size as usize) {
        Some(0) | None => ptr::null_mut(),
        Some(total) => malloc(opaque, total),
    }
}

///`free` counterpart of [malloc] and [zalloc]
pub(crate) unsafe extern "C" fn free(_: *mut c_void, mem: *mut c_void) {
    if mem.is_null() {
        return;
    }

    let base = (mem as *mut u8).sub(ALIGN);
    let size = ptr::read(base as *const usize);
    alloc::dealloc(base, Layout::from_size_align_unchecked(size + ALIGN, ALIGN));
}
