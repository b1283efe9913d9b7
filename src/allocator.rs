//! # **Allocator Module** - *Typed, Tier-Parameterized Aligned Allocator*
//!
//! [`AlignedAllocator<T, ALIGN>`] translates element counts into byte sizes,
//! delegates the byte-level work to the raw platform primitive, and turns
//! failures into [`AllocError`] values.
//!
//! ## Purpose
//! Integrates with [`AlignedVec<T, ALIGN>`](crate::AlignedVec) (and any other
//! `allocator_api` container) to guarantee starting-pointer alignment for all
//! allocations it manages, including allocations due to growth, mutation,
//! extension, and insertion - in all scenarios except zero-sized types (ZSTs)
//! and capacity 0.
//!
//! ## Behaviour
//! The allocator is a zero-sized value: its entire identity lives in its type
//! parameters. Two instances with the same alignment tier compare equal
//! regardless of element type, which lets containers move-assign and swap
//! across rebound allocators freely.
//!
//! ### Padding
//! This allocator does ***not* pad data automatically** - its purpose is to
//! ensure starting alignment for the memory allocation. When framing multiple
//! buffers back to back for later zero-copy access, manual padding may be
//! required so every sub-buffer also starts on a tier boundary.

use core::alloc::{AllocError as RawAllocError, Allocator, Layout};
use core::marker::PhantomData;
use core::mem::size_of;
use core::ptr::{self, NonNull};
use std::fmt;

use crate::alignment::PTR_ALIGN;
use crate::error::AllocError;
use crate::raw;

/// # AlignedAllocator
///
/// Stateless allocator enforcing an `ALIGN`-byte boundary on every block.
///
/// `ALIGN` must be a power of two no smaller than the pointer width; the three
/// named tiers are [`PTR_ALIGN`], [`SSE_ALIGN`](crate::alignment::SSE_ALIGN)
/// and [`AVX_ALIGN`](crate::alignment::AVX_ALIGN). The constraint is checked
/// at compile time on first use of the instantiation.
///
/// The allocator owns nothing and tracks nothing: every successful
/// [`allocate`](Self::allocate) must be matched by exactly one
/// [`deallocate`](Self::deallocate) with the same pointer before the memory is
/// considered returned. Dropping the allocator itself has no side effects.
pub struct AlignedAllocator<T, const ALIGN: usize = { PTR_ALIGN }> {
    _elem: PhantomData<T>,
}

impl<T, const ALIGN: usize> AlignedAllocator<T, ALIGN> {
    /// Tier contract, checked once per instantiation at compile time.
    const TIER_OK: () = assert!(
        ALIGN.is_power_of_two() && ALIGN >= size_of::<*const ()>(),
        "ALIGN must be a power of two no smaller than the pointer width",
    );

    /// ZSTs never reach the platform allocator; dividing by 1 keeps the
    /// capacity formula total.
    const ELEM_SIZE: usize = if size_of::<T>() == 0 { 1 } else { size_of::<T>() };

    /// Largest element count that can be requested without overflowing the
    /// byte-size computation. Subtracting the alignment first guards the
    /// internal size-plus-alignment bookkeeping that a plain
    /// `usize::MAX / size_of::<T>()` bound would not cover.
    pub const MAX_COUNT: usize = {
        let max = (usize::MAX - ALIGN) / Self::ELEM_SIZE;
        assert!(max < usize::MAX);
        max
    };

    #[inline]
    pub const fn new() -> Self {
        const { Self::TIER_OK };
        Self { _elem: PhantomData }
    }

    /// Maximum number of `T` elements a single [`allocate`](Self::allocate)
    /// call may request, exactly `(usize::MAX - ALIGN) / size_of::<T>()`.
    #[inline]
    pub const fn max_size(&self) -> usize {
        Self::MAX_COUNT
    }

    /// Address of an element, identical to the built-in address-of.
    #[inline]
    pub fn address(&self, x: &T) -> *const T {
        x
    }

    /// Mutable counterpart of [`address`](Self::address).
    #[inline]
    pub fn address_mut(&self, x: &mut T) -> *mut T {
        x
    }

    /// Allocates storage for `n` elements of `T` on an `ALIGN`-byte boundary.
    ///
    /// A zero-count request (or any request for a zero-sized `T`) owns no
    /// storage and succeeds with a dangling, well-aligned pointer, the same
    /// convention std's `Vec` uses for empty buffers. Such a pointer must not
    /// be dereferenced and is released by passing the same count back to
    /// [`deallocate`](Self::deallocate).
    ///
    /// # Errors
    /// [`AllocError::CapacityExceeded`] when `n > max_size()`, raised before
    /// any platform call; [`AllocError::AllocationFailed`] when the platform
    /// cannot satisfy a nonzero-size request.
    pub fn allocate(&self, n: usize) -> Result<NonNull<T>, AllocError> {
        const { Self::TIER_OK };
        if n > Self::MAX_COUNT {
            return Err(AllocError::CapacityExceeded { requested: n, max: Self::MAX_COUNT });
        }
        // Cannot overflow: n <= (usize::MAX - ALIGN) / size_of::<T>().
        let bytes = n * size_of::<T>();
        if bytes == 0 {
            return Ok(NonNull::dangling());
        }
        match NonNull::new(raw::allocate_aligned(bytes, ALIGN)) {
            Some(block) => Ok(block.cast()),
            None => Err(AllocError::AllocationFailed { bytes, align: ALIGN }),
        }
    }

    /// Legacy hint-taking variant, retained for interface parity only.
    /// Calling it is a contract violation.
    #[deprecated(note = "hinted allocation is unsupported; call `allocate`")]
    pub fn allocate_with_hint(&self, _n: usize, _hint: *const ()) -> Result<NonNull<T>, AllocError> {
        unimplemented!("hinted allocation is unsupported")
    }

    /// Releases a block previously returned by [`allocate`](Self::allocate).
    ///
    /// `n` is never used for sizing (the platform free does not need it); it
    /// only identifies the zero-count case, which owns no storage and is a
    /// no-op to release.
    ///
    /// # Safety
    /// `ptr` must have been returned by `allocate(n)` on an allocator of the
    /// same tier and not yet deallocated.
    pub unsafe fn deallocate(&self, ptr: NonNull<T>, n: usize) {
        if n == 0 || size_of::<T>() == 0 {
            return;
        }
        unsafe { raw::deallocate_aligned(ptr.as_ptr().cast()) }
    }

    /// Writes `value` into uninitialized storage at `ptr`. No allocation
    /// occurs here.
    ///
    /// # Safety
    /// `ptr` must be valid for writes of `U` and properly aligned; the storage
    /// must not already hold an initialized `U` (it would be leaked, not
    /// dropped).
    pub unsafe fn construct<U>(&self, ptr: *mut U, value: U) {
        unsafe { ptr.write(value) }
    }

    /// Drops the value at `ptr` in place. The storage becomes uninitialized
    /// again but is not released.
    ///
    /// # Safety
    /// `ptr` must point to an initialized `U`, valid for reads and writes.
    pub unsafe fn destroy<U>(&self, ptr: *mut U) {
        unsafe { ptr::drop_in_place(ptr) }
    }

    /// Produces the equivalent allocator for element type `U` on the same
    /// tier. Zero-cost and infallible: there is no state to carry over.
    #[inline]
    pub const fn rebind<U>(self) -> AlignedAllocator<U, ALIGN> {
        AlignedAllocator::new()
    }
}

// Manual impls keep `T` free of bounds: the allocator holds no `T`.
impl<T, const ALIGN: usize> Clone for AlignedAllocator<T, ALIGN> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const ALIGN: usize> Copy for AlignedAllocator<T, ALIGN> {}

impl<T, const ALIGN: usize> Default for AlignedAllocator<T, ALIGN> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const ALIGN: usize> fmt::Debug for AlignedAllocator<T, ALIGN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedAllocator").field("align", &ALIGN).finish()
    }
}

/// Allocators compare by tier alone, across any pair of element types. All
/// instances of a tier draw from the same platform primitive, so same-tier
/// instances are interchangeable.
impl<T, U, const A: usize, const B: usize> PartialEq<AlignedAllocator<U, B>>
    for AlignedAllocator<T, A>
{
    #[inline]
    fn eq(&self, _other: &AlignedAllocator<U, B>) -> bool {
        A == B
    }
}

impl<T, const ALIGN: usize> Eq for AlignedAllocator<T, ALIGN> {}

/// Never reduce a requested alignment; only raise it to the tier.
#[inline]
fn raise_align(layout: Layout, align: usize) -> Layout {
    if layout.align() < align {
        Layout::from_size_align(layout.size(), align).expect("invalid aligned layout")
    } else {
        layout
    }
}

unsafe impl<T, const ALIGN: usize> Allocator for AlignedAllocator<T, ALIGN> {
    /// Allocates memory with at least `ALIGN`-byte alignment.
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, RawAllocError> {
        let layout = raise_align(layout, ALIGN);
        if layout.size() == 0 {
            // SAFETY: the alignment is nonzero, so the address is too.
            let dangling =
                unsafe { NonNull::new_unchecked(ptr::without_provenance_mut::<u8>(layout.align())) };
            return Ok(NonNull::slice_from_raw_parts(dangling, 0));
        }
        NonNull::new(raw::allocate_aligned(layout.size(), layout.align()))
            .map(|block| NonNull::slice_from_raw_parts(block, layout.size()))
            .ok_or(RawAllocError)
    }

    /// Allocates zero-initialised memory with `ALIGN`-byte alignment.
    #[inline]
    fn allocate_zeroed(&self, layout: Layout) -> Result<NonNull<[u8]>, RawAllocError> {
        let block = Allocator::allocate(self, layout)?;
        if block.len() > 0 {
            // SAFETY: freshly allocated block of exactly `block.len()` bytes.
            unsafe { block.as_non_null_ptr().as_ptr().write_bytes(0, block.len()) };
        }
        Ok(block)
    }

    /// Deallocates memory previously allocated through this tier.
    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // Zero-size "allocations" were dangling; nothing to release.
        if layout.size() == 0 {
            return;
        }
        unsafe { raw::deallocate_aligned(ptr.as_ptr()) }
    }

    /// Grows an allocation while preserving tier alignment.
    ///
    /// Blocks from the platform aligned allocator cannot be `realloc`ed
    /// without losing their alignment, so growth is allocate-copy-free.
    unsafe fn grow(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<[u8]>, RawAllocError> {
        debug_assert!(new.size() >= old.size());
        let block = Allocator::allocate(self, new)?;
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), block.as_non_null_ptr().as_ptr(), old.size());
            Allocator::deallocate(self, ptr, old);
        }
        Ok(block)
    }

    /// Grows an allocation and zero-initialises the newly added region.
    unsafe fn grow_zeroed(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<[u8]>, RawAllocError> {
        debug_assert!(new.size() >= old.size());
        let block = Allocator::allocate_zeroed(self, new)?;
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), block.as_non_null_ptr().as_ptr(), old.size());
            Allocator::deallocate(self, ptr, old);
        }
        Ok(block)
    }

    /// Shrinks an allocation while preserving tier alignment.
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old: Layout,
        new: Layout,
    ) -> Result<NonNull<[u8]>, RawAllocError> {
        debug_assert!(new.size() <= old.size());
        let block = Allocator::allocate(self, new)?;
        unsafe {
            ptr::copy_nonoverlapping(ptr.as_ptr(), block.as_non_null_ptr().as_ptr(), new.size());
            Allocator::deallocate(self, ptr, old);
        }
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{is_aligned, AVX_ALIGN, PTR_ALIGN, SSE_ALIGN};

    fn check_allocate_aligned<T, const ALIGN: usize>() {
        let a = AlignedAllocator::<T, ALIGN>::new();
        let ptr = a.allocate(1).expect("allocate failed");
        assert!(is_aligned(ptr.as_ptr() as usize, ALIGN), "{ptr:p} not {ALIGN}-byte aligned");
        unsafe { a.deallocate(ptr, 1) };
    }

    fn check_max_size<T, const ALIGN: usize>() {
        let a = AlignedAllocator::<T, ALIGN>::new();
        assert_eq!(a.max_size(), (usize::MAX - ALIGN) / core::mem::size_of::<T>());
    }

    fn check_over_capacity<T, const ALIGN: usize>() {
        let a = AlignedAllocator::<T, ALIGN>::new();
        let err = a.allocate(usize::MAX).unwrap_err();
        assert_eq!(
            err,
            crate::AllocError::CapacityExceeded { requested: usize::MAX, max: a.max_size() }
        );
    }

    #[test]
    fn normal_allocations_are_aligned() {
        check_allocate_aligned::<i8, PTR_ALIGN>();
        check_allocate_aligned::<u16, PTR_ALIGN>();
        check_allocate_aligned::<i32, PTR_ALIGN>();
        check_allocate_aligned::<u64, PTR_ALIGN>();
        check_allocate_aligned::<f32, PTR_ALIGN>();
        check_allocate_aligned::<f64, PTR_ALIGN>();
    }

    #[test]
    fn sse_allocations_are_aligned() {
        check_allocate_aligned::<i8, SSE_ALIGN>();
        check_allocate_aligned::<u16, SSE_ALIGN>();
        check_allocate_aligned::<i32, SSE_ALIGN>();
        check_allocate_aligned::<u64, SSE_ALIGN>();
        check_allocate_aligned::<f32, SSE_ALIGN>();
        check_allocate_aligned::<f64, SSE_ALIGN>();
    }

    #[test]
    fn avx_allocations_are_aligned() {
        check_allocate_aligned::<i8, AVX_ALIGN>();
        check_allocate_aligned::<u16, AVX_ALIGN>();
        check_allocate_aligned::<i32, AVX_ALIGN>();
        check_allocate_aligned::<u64, AVX_ALIGN>();
        check_allocate_aligned::<f32, AVX_ALIGN>();
        check_allocate_aligned::<f64, AVX_ALIGN>();
    }

    #[test]
    fn max_size_matches_formula() {
        check_max_size::<i8, PTR_ALIGN>();
        check_max_size::<u16, PTR_ALIGN>();
        check_max_size::<u32, SSE_ALIGN>();
        check_max_size::<u64, SSE_ALIGN>();
        check_max_size::<f32, AVX_ALIGN>();
        check_max_size::<f64, AVX_ALIGN>();
    }

    #[test]
    fn over_capacity_is_caught_before_the_platform_call() {
        check_over_capacity::<u8, PTR_ALIGN>();
        check_over_capacity::<u32, SSE_ALIGN>();
        check_over_capacity::<u64, AVX_ALIGN>();
    }

    #[test]
    fn just_over_max_size_is_over_capacity() {
        let a = AlignedAllocator::<u64, SSE_ALIGN>::new();
        let err = a.allocate(a.max_size() + 1).unwrap_err();
        assert!(matches!(err, crate::AllocError::CapacityExceeded { .. }));
    }

    #[test]
    fn exhaustion_reports_allocation_failed() {
        // Within capacity, but far beyond any machine's address space.
        let a = AlignedAllocator::<u8, SSE_ALIGN>::new();
        let bytes = usize::MAX / 2;
        assert!(bytes <= a.max_size());
        let err = a.allocate(bytes).unwrap_err();
        assert_eq!(err, crate::AllocError::AllocationFailed { bytes, align: SSE_ALIGN });
    }

    #[test]
    fn zero_count_succeeds_without_storage() {
        let a = AlignedAllocator::<u32, AVX_ALIGN>::new();
        let ptr = a.allocate(0).expect("zero-count allocate must not fail");
        // No storage was obtained; releasing it is a no-op.
        unsafe { a.deallocate(ptr, 0) };
    }

    #[test]
    fn zst_allocations_never_touch_the_heap() {
        let a = AlignedAllocator::<(), SSE_ALIGN>::new();
        let ptr = a.allocate(1024).expect("ZST allocate must not fail");
        unsafe { a.deallocate(ptr, 1024) };
    }

    #[test]
    fn same_tier_allocators_are_equal() {
        assert_eq!(AlignedAllocator::<i32, SSE_ALIGN>::new(), AlignedAllocator::<f32, SSE_ALIGN>::new());
        assert_eq!(AlignedAllocator::<i32, SSE_ALIGN>::new(), AlignedAllocator::<i32, SSE_ALIGN>::new());
        assert_eq!(AlignedAllocator::<u8, AVX_ALIGN>::new(), AlignedAllocator::<u64, AVX_ALIGN>::new());
    }

    #[test]
    fn different_tier_allocators_are_unequal() {
        assert_ne!(AlignedAllocator::<i32, PTR_ALIGN>::new(), AlignedAllocator::<f32, AVX_ALIGN>::new());
        assert_ne!(AlignedAllocator::<i32, PTR_ALIGN>::new(), AlignedAllocator::<i32, AVX_ALIGN>::new());
    }

    #[test]
    fn address_is_identity() {
        let a = AlignedAllocator::<u64, SSE_ALIGN>::new();
        let mut x = 7u64;
        assert_eq!(a.address(&x), &x as *const u64);
        assert_eq!(a.address_mut(&mut x), &mut x as *mut u64);
    }

    #[test]
    fn rebind_preserves_the_tier() {
        let a = AlignedAllocator::<i32, AVX_ALIGN>::new();
        let b: AlignedAllocator<f64, AVX_ALIGN> = a.rebind();
        assert_eq!(a, b);
    }

    #[test]
    #[allow(deprecated)]
    #[should_panic(expected = "hinted allocation is unsupported")]
    fn hinted_allocate_is_a_contract_violation() {
        let a = AlignedAllocator::<u8, SSE_ALIGN>::new();
        let _ = a.allocate_with_hint(1, core::ptr::null());
    }

    #[test]
    fn construct_and_destroy_round_trip() {
        // AVX end to end: one 4-byte element on a 32-byte boundary.
        let a = AlignedAllocator::<u32, AVX_ALIGN>::new();
        let ptr = a.allocate(1).expect("allocate failed");
        assert!(is_aligned(ptr.as_ptr() as usize, 32));
        unsafe {
            a.construct(ptr.as_ptr(), 0xDEAD_BEEFu32);
            assert_eq!(ptr.as_ptr().read(), 0xDEAD_BEEF);
            a.destroy(ptr.as_ptr());
            a.deallocate(ptr, 1);
        }
    }

    #[test]
    fn destroy_runs_the_destructor() {
        use std::rc::Rc;
        let a = AlignedAllocator::<Rc<u8>, SSE_ALIGN>::new();
        let value = Rc::new(9u8);
        let ptr = a.allocate(1).expect("allocate failed");
        unsafe {
            a.construct(ptr.as_ptr(), Rc::clone(&value));
            assert_eq!(Rc::strong_count(&value), 2);
            a.destroy(ptr.as_ptr());
            assert_eq!(Rc::strong_count(&value), 1);
            a.deallocate(ptr, 1);
        }
    }

    #[test]
    fn layout_allocate_and_deallocate_alignment() {
        let a = AlignedAllocator::<u8, AVX_ALIGN>::new();
        let layout = Layout::from_size_align(4096, 1).unwrap();
        let block = Allocator::allocate(&a, layout).expect("allocate failed");
        assert!(is_aligned(block.as_non_null_ptr().as_ptr() as usize, 32));
        unsafe { Allocator::deallocate(&a, block.as_non_null_ptr(), layout) };
    }

    #[test]
    fn layout_allocate_zeroed() {
        let a = AlignedAllocator::<u8, SSE_ALIGN>::new();
        let layout = Layout::from_size_align(64, 1).unwrap();
        let block = Allocator::allocate_zeroed(&a, layout).expect("allocate_zeroed failed");
        assert!(is_aligned(block.as_non_null_ptr().as_ptr() as usize, 16));
        let data = unsafe { std::slice::from_raw_parts(block.as_non_null_ptr().as_ptr(), 64) };
        assert!(data.iter().all(|&b| b == 0));
        unsafe { Allocator::deallocate(&a, block.as_non_null_ptr(), layout) };
    }

    #[test]
    fn layout_grow_preserves_alignment_and_contents() {
        let a = AlignedAllocator::<u8, AVX_ALIGN>::new();
        let small = Layout::from_size_align(32, 1).unwrap();
        let big = Layout::from_size_align(256, 1).unwrap();
        let block = Allocator::allocate(&a, small).unwrap();
        unsafe {
            block.as_non_null_ptr().as_ptr().write_bytes(0xAB, 32);
            let grown = Allocator::grow(&a, block.as_non_null_ptr(), small, big).unwrap();
            assert!(is_aligned(grown.as_non_null_ptr().as_ptr() as usize, 32));
            let data = std::slice::from_raw_parts(grown.as_non_null_ptr().as_ptr(), 32);
            assert!(data.iter().all(|&b| b == 0xAB));
            Allocator::deallocate(&a, grown.as_non_null_ptr(), big);
        }
    }

    #[test]
    fn layout_grow_zeroed_zeroes_the_new_region() {
        let a = AlignedAllocator::<u8, SSE_ALIGN>::new();
        let small = Layout::from_size_align(16, 1).unwrap();
        let big = Layout::from_size_align(128, 1).unwrap();
        let block = Allocator::allocate(&a, small).unwrap();
        unsafe {
            block.as_non_null_ptr().as_ptr().write_bytes(0xFF, 16);
            let grown = Allocator::grow_zeroed(&a, block.as_non_null_ptr(), small, big).unwrap();
            let data = std::slice::from_raw_parts(grown.as_non_null_ptr().as_ptr(), 128);
            assert!(data[..16].iter().all(|&b| b == 0xFF));
            assert!(data[16..].iter().all(|&b| b == 0));
            Allocator::deallocate(&a, grown.as_non_null_ptr(), big);
        }
    }

    #[test]
    fn layout_shrink_preserves_alignment() {
        let a = AlignedAllocator::<u8, AVX_ALIGN>::new();
        let big = Layout::from_size_align(256, 1).unwrap();
        let small = Layout::from_size_align(64, 1).unwrap();
        let block = Allocator::allocate(&a, big).unwrap();
        unsafe {
            let shrunk = Allocator::shrink(&a, block.as_non_null_ptr(), big, small).unwrap();
            assert!(is_aligned(shrunk.as_non_null_ptr().as_ptr() as usize, 32));
            Allocator::deallocate(&a, shrunk.as_non_null_ptr(), small);
        }
    }
}
