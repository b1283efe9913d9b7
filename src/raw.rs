//! Raw aligned allocation primitive.
//!
//! Thin wrappers over the platform aligned allocator. Failure is signalled only
//! through a null return; the typed layer in [`allocator`](crate::allocator)
//! turns null into [`AllocError`](crate::AllocError).

use core::ffi::c_void;
use core::ptr;

/// Allocates `size` bytes whose start address is a multiple of `align`.
///
/// `align` must be a power of two at least as large as a pointer (asserted;
/// violating it is a caller bug, not a runtime condition). A zero `size`
/// short-circuits to null: the platform call is implementation-defined for
/// zero-size requests, so null is the only outcome callers may rely on.
/// Any nonzero platform status also yields null.
pub(crate) fn allocate_aligned(size: usize, align: usize) -> *mut u8 {
    assert!(
        align >= core::mem::size_of::<*const ()>(),
        "alignment {align} is below the pointer width"
    );
    if size == 0 {
        return ptr::null_mut();
    }
    let mut block: *mut c_void = ptr::null_mut();
    // SAFETY: `block` is a valid out-pointer, and `align` satisfies the
    // power-of-two / pointer-multiple requirement of posix_memalign.
    let rc = unsafe { libc::posix_memalign(&mut block, align, size) };
    if rc != 0 {
        ptr::null_mut()
    } else {
        block.cast()
    }
}

/// Releases a block previously returned by [`allocate_aligned`].
///
/// A null `ptr` is a safe no-op, per the platform `free` contract.
///
/// # Safety
/// `ptr` must be null or a pointer obtained from [`allocate_aligned`] that has
/// not already been released.
pub(crate) unsafe fn deallocate_aligned(ptr: *mut u8) {
    unsafe { libc::free(ptr.cast()) }
}
