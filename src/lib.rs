//! # aligned-alloc
//!
//! Tiered SIMD-aligned heap allocation for Rust.
//!
//! ## Summary
//! [`AlignedAllocator<T, ALIGN>`](AlignedAllocator) hands out heap blocks whose starting
//! address is a multiple of a compile-time alignment tier, so that vectorized load/store
//! instructions (SSE, AVX) can operate on the data without penalty or fault.
//! [`AlignedVec<T, ALIGN>`](AlignedVec) is a drop-in `Vec` replacement backed by that allocator.
//!
//! Three named tiers are provided via [`Alignment`]: `Normal` (pointer width), `Sse` (16 bytes)
//! and `Avx` (32 bytes). The allocator itself is generic over the alignment value, so any power
//! of two at least as large as a pointer works.
//!
//! Benefits will vary based on one's target architecture.

#![feature(allocator_api)]
#![feature(slice_ptr_get)]

pub mod alignment;
pub mod allocator;
pub mod avec;
pub mod error;
mod raw;

pub use alignment::Alignment;
pub use allocator::AlignedAllocator;
pub use avec::{AlignedVec, AvxVec, SseVec};
pub use error::AllocError;
