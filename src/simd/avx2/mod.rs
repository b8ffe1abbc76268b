//! AVX2 kernels for the 256-bit vector types.
//!
//! AVX2 has native 256-bit forms for almost every integer operation the
//! vector API uses. The gaps are the same ones SSE has:
//!
//! - 8-bit shifts and multiplies go through 16-bit lanes
//! - 64-bit multiplies, arithmetic shifts and unsigned compares are emulated
//! - popcount and 8-bit `countl_zero` use `vpshufb` nibble tables
//!
//! Byte shuffles, unpacks and packs operate within each 128-bit half, so the
//! lookup tables repeat per half and pack sequences keep the lane order.
//!
//! The 128-bit types use these same instructions through the VEX encoded
//! `_mm_*` forms in the `sse` backend; only variable shifts and gathers are
//! new for them.
#![allow(unused_unsafe)]

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use crate::simd::kernels::MaskKernels;
use crate::simd::mask::{Mask16x16, Mask32x8, Mask64x4, Mask8x32};
use crate::simd::vector::{I16x16, I32x8, I64x4, I8x32, U16x16, U32x8, U64x4, U8x32};

mod convert;
mod int16;
mod int32;
mod int64;
mod int8;

/// Types with the exact layout of an AVX register.
pub(crate) trait Ymm: Copy {
    fn ymm(self) -> __m256i;
    fn from_ymm(r: __m256i) -> Self;
}

macro_rules! impl_ymm {
    ($($ty:ty),*) => {$(
        impl Ymm for $ty {
            #[inline(always)]
            fn ymm(self) -> __m256i {
                unsafe { std::mem::transmute::<$ty, __m256i>(self) }
            }

            #[inline(always)]
            fn from_ymm(r: __m256i) -> Self {
                unsafe { std::mem::transmute::<__m256i, $ty>(r) }
            }
        }
    )*};
}

impl_ymm!(U8x32, I8x32, U16x16, I16x16, U32x8, I32x8, U64x4, I64x4);
impl_ymm!(Mask8x32, Mask16x16, Mask32x8, Mask64x4);

#[inline(always)]
pub(crate) fn cast<A: Ymm, B: Ymm>(a: A) -> B {
    B::from_ymm(a.ymm())
}

// ------------------------------------------------------------------------------------------------
// Shared register helpers
// ------------------------------------------------------------------------------------------------

#[inline(always)]
pub(super) fn ones() -> __m256i {
    unsafe { _mm256_set1_epi32(-1) }
}

#[inline(always)]
pub(super) fn not(x: __m256i) -> __m256i {
    unsafe { _mm256_xor_si256(x, ones()) }
}

/// Shift count operand for the `sll`/`srl`/`sra` family.
#[inline(always)]
pub(super) fn count(s: u32) -> __m128i {
    unsafe { _mm_cvtsi32_si128(s as i32) }
}

#[inline(always)]
pub(super) fn select(m: __m256i, a: __m256i, b: __m256i) -> __m256i {
    unsafe { _mm256_blendv_epi8(b, a, m) }
}

/// Looks up each nibble of every byte in a 16-entry table.
#[inline(always)]
pub(super) fn nibble_lookup(table: [i8; 16], x: __m256i) -> (__m256i, __m256i) {
    unsafe {
        let table = _mm256_broadcastsi128_si256(std::mem::transmute::<[i8; 16], __m128i>(table));
        let nibble = _mm256_set1_epi8(0x0F);

        let lo = _mm256_and_si256(x, nibble);
        let hi = _mm256_and_si256(_mm256_srli_epi16(x, 4), nibble);

        (_mm256_shuffle_epi8(table, lo), _mm256_shuffle_epi8(table, hi))
    }
}

#[inline(always)]
pub(super) fn popcount_epi8(x: __m256i) -> __m256i {
    let (lo, hi) = nibble_lookup([0, 1, 1, 2, 1, 2, 2, 3, 1, 2, 2, 3, 2, 3, 3, 4], x);
    unsafe { _mm256_add_epi8(lo, hi) }
}

#[inline(always)]
pub(super) fn popcount_epi16(x: __m256i) -> __m256i {
    unsafe {
        let bytes = popcount_epi8(x);
        _mm256_and_si256(
            _mm256_add_epi16(bytes, _mm256_srli_epi16(bytes, 8)),
            _mm256_set1_epi16(0x00FF),
        )
    }
}

#[inline(always)]
pub(super) fn popcount_epi32(x: __m256i) -> __m256i {
    unsafe {
        let words = popcount_epi16(x);
        _mm256_and_si256(
            _mm256_add_epi32(words, _mm256_srli_epi32(words, 16)),
            _mm256_set1_epi32(0xFF),
        )
    }
}

#[inline(always)]
pub(super) fn popcount_epi64(x: __m256i) -> __m256i {
    unsafe { _mm256_sad_epu8(popcount_epi8(x), _mm256_setzero_si256()) }
}

/// Reverses the bytes of every lane with a per-half shuffle.
#[inline(always)]
pub(super) fn shuffle_bytes(x: __m256i, order: [i8; 16]) -> __m256i {
    unsafe {
        let order = _mm256_broadcastsi128_si256(std::mem::transmute::<[i8; 16], __m128i>(order));
        _mm256_shuffle_epi8(x, order)
    }
}

#[inline(always)]
pub(super) fn bias_epi8(x: __m256i) -> __m256i {
    unsafe { _mm256_xor_si256(x, _mm256_set1_epi8(i8::MIN)) }
}

#[inline(always)]
pub(super) fn bias_epi64(x: __m256i) -> __m256i {
    unsafe { _mm256_xor_si256(x, _mm256_set1_epi64x(i64::MIN)) }
}

// ------------------------------------------------------------------------------------------------
// Masks
// ------------------------------------------------------------------------------------------------

impl MaskKernels for Mask8x32 {
    #[inline(always)]
    fn count(self) -> usize {
        let bits = unsafe { _mm256_movemask_epi8(self.ymm()) };
        bits.count_ones() as usize
    }

    #[inline(always)]
    fn any(self) -> bool {
        unsafe { _mm256_testz_si256(self.ymm(), self.ymm()) == 0 }
    }

    #[inline(always)]
    fn all(self) -> bool {
        unsafe { _mm256_movemask_epi8(self.ymm()) == -1 }
    }
}

impl MaskKernels for Mask16x16 {
    #[inline(always)]
    fn count(self) -> usize {
        // two movemask bits per lane
        let bits = unsafe { _mm256_movemask_epi8(self.ymm()) };
        bits.count_ones() as usize / 2
    }

    #[inline(always)]
    fn any(self) -> bool {
        unsafe { _mm256_testz_si256(self.ymm(), self.ymm()) == 0 }
    }

    #[inline(always)]
    fn all(self) -> bool {
        unsafe { _mm256_movemask_epi8(self.ymm()) == -1 }
    }
}

impl MaskKernels for Mask32x8 {
    #[inline(always)]
    fn count(self) -> usize {
        let bits = unsafe { _mm256_movemask_ps(_mm256_castsi256_ps(self.ymm())) };
        bits.count_ones() as usize
    }

    #[inline(always)]
    fn any(self) -> bool {
        unsafe { _mm256_testz_si256(self.ymm(), self.ymm()) == 0 }
    }

    #[inline(always)]
    fn all(self) -> bool {
        unsafe { _mm256_movemask_ps(_mm256_castsi256_ps(self.ymm())) == 0xFF }
    }
}

impl MaskKernels for Mask64x4 {
    #[inline(always)]
    fn count(self) -> usize {
        let bits = unsafe { _mm256_movemask_pd(_mm256_castsi256_pd(self.ymm())) };
        bits.count_ones() as usize
    }

    #[inline(always)]
    fn any(self) -> bool {
        unsafe { _mm256_testz_si256(self.ymm(), self.ymm()) == 0 }
    }

    #[inline(always)]
    fn all(self) -> bool {
        unsafe { _mm256_movemask_pd(_mm256_castsi256_pd(self.ymm())) == 0xF }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_reductions() {
        let mut lanes = [false; 32];
        lanes[31] = true;
        lanes[3] = true;
        let m = Mask8x32::from_array(lanes);
        assert_eq!(MaskKernels::count(m), 2);
        assert!(MaskKernels::any(m));
        assert!(!MaskKernels::all(m));
        assert!(MaskKernels::all(Mask64x4::splat(true)));
        assert!(!MaskKernels::any(Mask32x8::splat(false)));
        assert_eq!(MaskKernels::count(Mask16x16::splat(true)), 16);
    }

    #[test]
    fn test_popcount_halves_match() {
        let v = U64x4::from_array([u64::MAX, 0, 0x0F0F, 1 << 63]);
        assert_eq!(
            U64x4::from_ymm(popcount_epi64(v.ymm())).to_array(),
            [64, 0, 8, 1]
        );
    }
}
