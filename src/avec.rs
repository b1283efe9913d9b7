//! # **AlignedVec** - *Vector with Tiered SIMD Alignment*
//!
//! Vector type backed by [`AlignedAllocator`], guaranteeing the starting
//! address of the allocation sits on the allocator's tier boundary.
//!
//! Provides the same API as `Vec`, plus tier aliases [`SseVec`] and [`AvxVec`].

use std::borrow::{Borrow, BorrowMut};
use std::fmt::{Debug, Display, Formatter, Result};
use std::ops::{Deref, DerefMut};
use std::slice::{Iter, IterMut};
use std::vec::Vec;

#[cfg(feature = "parallel_proc")]
use rayon::iter::{IntoParallelRefIterator, IntoParallelRefMutIterator};

use crate::alignment::{AVX_ALIGN, PTR_ALIGN, SSE_ALIGN};
use crate::allocator::AlignedAllocator;

/// # AlignedVec
///
/// A drop-in replacement for `Vec` whose backing storage starts on an
/// `ALIGN`-byte boundary, via [`AlignedAllocator`]. Alignment is preserved
/// across growth, mutation, extension and insertion - in all scenarios except
/// zero-sized types (ZSTs) and capacity 0, where no allocation exists at all.
///
/// ## Behaviour - Padding
/// Only the first element of the allocation is guaranteed to be aligned. A
/// buffer mixing headers and data pages needs manual zero-byte padding if an
/// interior section must itself fall on a tier boundary.
///
/// ## Notes
/// - All `Vec` APIs remain available - `AlignedVec` is a tuple wrapper over
///   `Vec<T, AlignedAllocator<T, ALIGN>>`.
/// - When passing to APIs expecting a plain `Vec`, use `.0` to extract the
///   inner vector.
#[repr(transparent)]
pub struct AlignedVec<T, const ALIGN: usize = { PTR_ALIGN }>(
    pub Vec<T, AlignedAllocator<T, ALIGN>>,
);

/// Vector on 16-byte SSE-aligned storage.
pub type SseVec<T> = AlignedVec<T, SSE_ALIGN>;

/// Vector on 32-byte AVX-aligned storage.
pub type AvxVec<T> = AlignedVec<T, AVX_ALIGN>;

impl<T, const ALIGN: usize> AlignedVec<T, ALIGN> {
    /// Creates an empty vector. No allocation occurs until the first push.
    #[inline]
    pub fn new() -> Self {
        Self(Vec::new_in(AlignedAllocator::new()))
    }

    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        Self(Vec::with_capacity_in(cap, AlignedAllocator::new()))
    }

    /// Takes ownership of a raw allocation.
    ///
    /// # Safety
    /// - `ptr` must have been allocated by an [`AlignedAllocator`] of the same tier
    /// - `ptr` must be valid for reads and writes for `len * size_of::<T>()` bytes
    /// - `len` must be less than or equal to `capacity`
    /// - The memory must not be aliased elsewhere
    #[inline]
    pub unsafe fn from_raw_parts(ptr: *mut T, len: usize, capacity: usize) -> Self {
        debug_assert!(
            capacity == 0 || (ptr as usize) % ALIGN == 0,
            "AlignedVec::from_raw_parts: pointer is not {ALIGN}-byte aligned"
        );

        let vec = unsafe { Vec::from_raw_parts_in(ptr, len, capacity, AlignedAllocator::new()) };
        Self(vec)
    }
}

// Only require Send+Sync for parallel iterator methods
#[cfg(feature = "parallel_proc")]
impl<T: Sync + Send, const ALIGN: usize> AlignedVec<T, ALIGN> {
    #[inline]
    pub fn par_iter(&self) -> rayon::slice::Iter<'_, T> {
        self.0.par_iter()
    }

    #[inline]
    pub fn par_iter_mut(&mut self) -> rayon::slice::IterMut<'_, T> {
        self.0.par_iter_mut()
    }
}

impl<T: Copy, const ALIGN: usize> AlignedVec<T, ALIGN> {
    #[inline]
    pub fn from_slice(slice: &[T]) -> Self {
        let mut v = Self::with_capacity(slice.len());
        // SAFETY: allocated enough capacity, and both
        // pointers are non-overlapping.
        unsafe {
            std::ptr::copy_nonoverlapping(slice.as_ptr(), v.0.as_mut_ptr(), slice.len());
            v.0.set_len(slice.len());
        }
        v
    }
}

impl<T: Clone, const ALIGN: usize> AlignedVec<T, ALIGN> {
    #[inline]
    pub fn from_slice_clone(slice: &[T]) -> Self {
        let mut v = Self::with_capacity(slice.len());
        v.0.extend_from_slice(slice);
        v
    }
}

impl<T, const ALIGN: usize> Default for AlignedVec<T, ALIGN> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const ALIGN: usize> Deref for AlignedVec<T, ALIGN> {
    type Target = Vec<T, AlignedAllocator<T, ALIGN>>;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T, const ALIGN: usize> DerefMut for AlignedVec<T, ALIGN> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T: Clone, const ALIGN: usize> Clone for AlignedVec<T, ALIGN> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: Debug, const ALIGN: usize> Debug for AlignedVec<T, ALIGN> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        self.0.fmt(f)
    }
}

impl<T: PartialEq, const ALIGN: usize> PartialEq for AlignedVec<T, ALIGN> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Display, const ALIGN: usize> Display for AlignedVec<T, ALIGN> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "[")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{item}")?;
        }
        write!(f, "]")
    }
}

impl<T, const ALIGN: usize> IntoIterator for AlignedVec<T, ALIGN> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T, AlignedAllocator<T, ALIGN>>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T, const ALIGN: usize> IntoIterator for &'a AlignedVec<T, ALIGN> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
impl<'a, T, const ALIGN: usize> IntoIterator for &'a mut AlignedVec<T, ALIGN> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

impl<T, const ALIGN: usize> Extend<T> for AlignedVec<T, ALIGN> {
    #[inline]
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<T, const ALIGN: usize> FromIterator<T> for AlignedVec<T, ALIGN> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let iterator = iter.into_iter();
        let mut v = if let Some(exact) = iterator.size_hint().1 {
            Vec::with_capacity_in(exact, AlignedAllocator::new())
        } else {
            Vec::with_capacity_in(iterator.size_hint().0, AlignedAllocator::new())
        };
        v.extend(iterator);
        Self(v)
    }
}

impl<T, const ALIGN: usize> From<Vec<T, AlignedAllocator<T, ALIGN>>> for AlignedVec<T, ALIGN> {
    #[inline]
    fn from(v: Vec<T, AlignedAllocator<T, ALIGN>>) -> Self {
        Self(v)
    }
}

impl<T, const ALIGN: usize> From<AlignedVec<T, ALIGN>> for Vec<T, AlignedAllocator<T, ALIGN>> {
    #[inline]
    fn from(v: AlignedVec<T, ALIGN>) -> Self {
        v.0
    }
}

impl<T, const ALIGN: usize> From<Vec<T>> for AlignedVec<T, ALIGN> {
    #[inline]
    fn from(v: Vec<T>) -> Self {
        let mut vec = Vec::with_capacity_in(v.len(), AlignedAllocator::new());
        vec.extend(v);
        Self(vec)
    }
}

impl<T, const ALIGN: usize> From<&[T]> for AlignedVec<T, ALIGN>
where
    T: Clone,
{
    #[inline]
    fn from(s: &[T]) -> Self {
        let mut v = Vec::with_capacity_in(s.len(), AlignedAllocator::new());
        v.extend_from_slice(s);
        Self(v)
    }
}

impl<T, const ALIGN: usize> AsRef<[T]> for AlignedVec<T, ALIGN> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.0.as_ref()
    }
}
impl<T, const ALIGN: usize> AsMut<[T]> for AlignedVec<T, ALIGN> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.0.as_mut()
    }
}

impl<T, const ALIGN: usize> Borrow<[T]> for AlignedVec<T, ALIGN> {
    #[inline]
    fn borrow(&self) -> &[T] {
        self.0.borrow()
    }
}
impl<T, const ALIGN: usize> BorrowMut<[T]> for AlignedVec<T, ALIGN> {
    #[inline]
    fn borrow_mut(&mut self) -> &mut [T] {
        self.0.borrow_mut()
    }
}

/// Builds an [`AlignedVec`] on the default (pointer-width) tier, with the
/// same forms as `vec![]`. Use the tier aliases and `from_slice` /
/// `with_capacity` for SSE or AVX storage.
#[macro_export]
macro_rules! avec {
    () => {
        $crate::AlignedVec::<_, { $crate::alignment::PTR_ALIGN }>::new()
    };

    ($elem:expr; $n:expr) => {{
        let mut v = $crate::AlignedVec::<_, { $crate::alignment::PTR_ALIGN }>::with_capacity($n);
        v.0.resize($n, $elem);
        v
    }};

    ($($x:expr),+ $(,)?) => {{
        let mut v = $crate::AlignedVec::<_, { $crate::alignment::PTR_ALIGN }>::with_capacity(
            0 $(+ { let _ = &$x; 1 })*,
        );
        $(v.push($x);)+
        v
    }};
}


#[cfg(test)]
#[cfg(feature = "parallel_proc")]
mod parallel_tests {
    use rayon::iter::ParallelIterator;

    use super::*;

    #[test]
    fn test_par_iter() {
        let v: AvxVec<u32> = AlignedVec::from_slice(&[1, 2, 3, 4, 5]);
        let sum: u32 = v.par_iter().sum();
        assert_eq!(sum, 15);
    }
}
