//! # **Alignment Module** - *Named Alignment Tiers*
//!
//! The named byte-alignment tiers an [`AlignedAllocator`](crate::AlignedAllocator)
//! can enforce, plus a small address-check helper used throughout the tests.

/// Pointer-width alignment, the platform's natural minimum for aligned allocation.
pub const PTR_ALIGN: usize = core::mem::size_of::<*const ()>();

/// 16-byte alignment for 128-bit SSE registers.
pub const SSE_ALIGN: usize = 16;

/// 32-byte alignment for 256-bit AVX registers.
pub const AVX_ALIGN: usize = 32;

/// # Alignment
///
/// A named, fixed power-of-two byte-alignment tier.
///
/// The tier an allocator enforces is a compile-time constant (`const ALIGN: usize`
/// on [`AlignedAllocator`](crate::AlignedAllocator)); this enum is the vocabulary
/// for the three supported tiers and the source of their numeric values.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Pointer-width alignment (`PTR_ALIGN`).
    Normal,
    /// 16-byte SSE alignment.
    Sse,
    /// 32-byte AVX alignment.
    Avx,
}

impl Alignment {
    /// Numeric byte value of the tier.
    #[inline]
    pub const fn bytes(self) -> usize {
        match self {
            Alignment::Normal => PTR_ALIGN,
            Alignment::Sse => SSE_ALIGN,
            Alignment::Avx => AVX_ALIGN,
        }
    }
}

/// Whether `addr` sits on an `align`-byte boundary.
#[inline]
pub const fn is_aligned(addr: usize, align: usize) -> bool {
    addr % align == 0
}
