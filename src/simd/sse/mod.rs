//! SSE2 kernels for the 128-bit vector types, with SSSE3, SSE4.1 and SSE4.2
//! paths selected by `target_feature`.
//!
//! SSE2 lacks most of the integer instructions the vector API needs, so a
//! large part of this module is emulation:
//!
//! - 8-bit shifts and multiplies go through 16-bit lanes and byte masks
//! - popcount is a SWAR reduction, or a `pshufb` nibble lookup with SSSE3
//! - 32-bit `countl_zero` reads the exponent of a float conversion
//! - 32-bit multiplies and `mul_hi` are assembled from `pmuludq`
//!
//! The vector types share their layout with `__m128i`, so kernels move
//! between the two by transmuting.
#![allow(unused_unsafe)]

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::kernels::MaskKernels;
use crate::simd::mask::{Mask16x8, Mask32x4, Mask64x2, Mask8x16};
use crate::simd::vector::{I16x8, I32x4, I64x2, I8x16, U16x8, U32x4, U64x2, U8x16};

mod int16;
mod int32;
mod int64;
mod int8;

/// Types with the exact layout of an SSE register.
pub(crate) trait Xmm: Copy {
    fn xmm(self) -> __m128i;
    fn from_xmm(r: __m128i) -> Self;
}

macro_rules! impl_xmm {
    ($($ty:ty),*) => {$(
        impl Xmm for $ty {
            #[inline(always)]
            fn xmm(self) -> __m128i {
                unsafe { std::mem::transmute::<$ty, __m128i>(self) }
            }

            #[inline(always)]
            fn from_xmm(r: __m128i) -> Self {
                unsafe { std::mem::transmute::<__m128i, $ty>(r) }
            }
        }
    )*};
}

impl_xmm!(U8x16, I8x16, U16x8, I16x8, U32x4, I32x4, U64x2, I64x2);
impl_xmm!(Mask8x16, Mask16x8, Mask32x4, Mask64x2);

/// Reinterprets between two register-shaped types.
#[inline(always)]
pub(crate) fn cast<A: Xmm, B: Xmm>(a: A) -> B {
    B::from_xmm(a.xmm())
}

// ------------------------------------------------------------------------------------------------
// Shared register helpers
// ------------------------------------------------------------------------------------------------

#[inline(always)]
pub(super) fn ones() -> __m128i {
    unsafe { _mm_set1_epi32(-1) }
}

#[inline(always)]
pub(super) fn not(x: __m128i) -> __m128i {
    unsafe { _mm_xor_si128(x, ones()) }
}

/// Shift count operand for the `sll`/`srl`/`sra` family.
#[inline(always)]
pub(super) fn count(s: u32) -> __m128i {
    unsafe { _mm_cvtsi32_si128(s as i32) }
}

/// `a` where the mask is set, `b` elsewhere.
#[inline(always)]
pub(super) fn select(m: __m128i, a: __m128i, b: __m128i) -> __m128i {
    #[cfg(target_feature = "sse4.1")]
    unsafe {
        _mm_blendv_epi8(b, a, m)
    }
    #[cfg(not(target_feature = "sse4.1"))]
    unsafe {
        _mm_or_si128(_mm_and_si128(m, a), _mm_andnot_si128(m, b))
    }
}

/// Per-byte population count.
#[inline(always)]
pub(super) fn popcount_epi8(x: __m128i) -> __m128i {
    #[cfg(target_feature = "ssse3")]
    unsafe {
        let table = _mm_setr_epi8(0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4);
        let nibble = _mm_set1_epi8(0x0F);

        let lo = _mm_and_si128(x, nibble);
        let hi = _mm_and_si128(_mm_srli_epi16(x, 4), nibble);

        _mm_add_epi8(_mm_shuffle_epi8(table, lo), _mm_shuffle_epi8(table, hi))
    }
    #[cfg(not(target_feature = "ssse3"))]
    unsafe {
        // bits shifted across byte boundaries land in positions the masks clear
        let m1 = _mm_set1_epi8(0x55);
        let m2 = _mm_set1_epi8(0x33);
        let m4 = _mm_set1_epi8(0x0F);

        let x = _mm_sub_epi8(x, _mm_and_si128(_mm_srli_epi16(x, 1), m1));
        let x = _mm_add_epi8(_mm_and_si128(x, m2), _mm_and_si128(_mm_srli_epi16(x, 2), m2));
        _mm_and_si128(_mm_add_epi8(x, _mm_srli_epi16(x, 4)), m4)
    }
}

#[inline(always)]
pub(super) fn popcount_epi16(x: __m128i) -> __m128i {
    unsafe {
        let bytes = popcount_epi8(x);
        _mm_and_si128(
            _mm_add_epi16(bytes, _mm_srli_epi16(bytes, 8)),
            _mm_set1_epi16(0x00FF),
        )
    }
}

#[inline(always)]
pub(super) fn popcount_epi32(x: __m128i) -> __m128i {
    unsafe {
        let words = popcount_epi16(x);
        _mm_and_si128(
            _mm_add_epi32(words, _mm_srli_epi32(words, 16)),
            _mm_set1_epi32(0xFF),
        )
    }
}

#[inline(always)]
pub(super) fn popcount_epi64(x: __m128i) -> __m128i {
    unsafe { _mm_sad_epu8(popcount_epi8(x), _mm_setzero_si128()) }
}

/// Flips the sign bit of every byte so signed compares order unsigned values.
#[inline(always)]
pub(super) fn bias_epi8(x: __m128i) -> __m128i {
    unsafe { _mm_xor_si128(x, _mm_set1_epi8(i8::MIN)) }
}

#[inline(always)]
pub(super) fn bias_epi16(x: __m128i) -> __m128i {
    unsafe { _mm_xor_si128(x, _mm_set1_epi16(i16::MIN)) }
}

#[inline(always)]
pub(super) fn bias_epi32(x: __m128i) -> __m128i {
    unsafe { _mm_xor_si128(x, _mm_set1_epi32(i32::MIN)) }
}

#[cfg(target_feature = "sse4.2")]
#[inline(always)]
pub(super) fn bias_epi64(x: __m128i) -> __m128i {
    unsafe { _mm_xor_si128(x, _mm_set1_epi64x(i64::MIN)) }
}

// ------------------------------------------------------------------------------------------------
// Masks
// ------------------------------------------------------------------------------------------------

impl MaskKernels for Mask8x16 {
    #[inline(always)]
    fn count(self) -> usize {
        let bits = unsafe { _mm_movemask_epi8(self.xmm()) };
        bits.count_ones() as usize
    }

    #[inline(always)]
    fn any(self) -> bool {
        unsafe { _mm_movemask_epi8(self.xmm()) != 0 }
    }

    #[inline(always)]
    fn all(self) -> bool {
        unsafe { _mm_movemask_epi8(self.xmm()) == 0xFFFF }
    }
}

impl MaskKernels for Mask16x8 {
    #[inline(always)]
    fn count(self) -> usize {
        // two movemask bits per lane
        let bits = unsafe { _mm_movemask_epi8(self.xmm()) };
        bits.count_ones() as usize / 2
    }

    #[inline(always)]
    fn any(self) -> bool {
        unsafe { _mm_movemask_epi8(self.xmm()) != 0 }
    }

    #[inline(always)]
    fn all(self) -> bool {
        unsafe { _mm_movemask_epi8(self.xmm()) == 0xFFFF }
    }
}

impl MaskKernels for Mask32x4 {
    #[inline(always)]
    fn count(self) -> usize {
        let bits = unsafe { _mm_movemask_ps(_mm_castsi128_ps(self.xmm())) };
        bits.count_ones() as usize
    }

    #[inline(always)]
    fn any(self) -> bool {
        unsafe { _mm_movemask_ps(_mm_castsi128_ps(self.xmm())) != 0 }
    }

    #[inline(always)]
    fn all(self) -> bool {
        unsafe { _mm_movemask_ps(_mm_castsi128_ps(self.xmm())) == 0xF }
    }
}

impl MaskKernels for Mask64x2 {
    #[inline(always)]
    fn count(self) -> usize {
        let bits = unsafe { _mm_movemask_pd(_mm_castsi128_pd(self.xmm())) };
        bits.count_ones() as usize
    }

    #[inline(always)]
    fn any(self) -> bool {
        unsafe { _mm_movemask_pd(_mm_castsi128_pd(self.xmm())) != 0 }
    }

    #[inline(always)]
    fn all(self) -> bool {
        unsafe { _mm_movemask_pd(_mm_castsi128_pd(self.xmm())) == 0x3 }
    }
}
