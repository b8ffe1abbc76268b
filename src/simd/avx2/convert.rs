//! Width conversions between the 128-bit and 256-bit shapes.
//!
//! Widening is a single `vpmovsx`/`vpmovzx`. Narrowing splits the register
//! into its halves and packs them; the packs saturate, so vectors are masked
//! down to the low bits first while canonical masks pack as they are.

#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::Ymm;
use crate::simd::kernels::{Convert, MaskConvert};
use crate::simd::mask::{Mask16x16, Mask16x8, Mask32x4, Mask32x8, Mask64x4, Mask8x16};
use crate::simd::sse::Xmm;
use crate::simd::vector::{
    I16x16, I16x8, I32x4, I32x8, I64x4, I8x16, U16x16, U16x8, U32x4, U32x8, U64x4, U8x16,
};

macro_rules! widen {
    ($trait:ident: $($from:ty => $to:ty: $op:ident),* $(,)?) => {$(
        impl $trait<$to> for $from {
            #[inline(always)]
            fn convert(self) -> $to {
                <$to>::from_ymm(unsafe { $op(self.xmm()) })
            }
        }
    )*};
}

widen!(Convert:
    U8x16 => U16x16: _mm256_cvtepu8_epi16,
    I8x16 => I16x16: _mm256_cvtepi8_epi16,
    U8x16 => I16x16: _mm256_cvtepu8_epi16,
    U16x8 => U32x8: _mm256_cvtepu16_epi32,
    I16x8 => I32x8: _mm256_cvtepi16_epi32,
    U16x8 => I32x8: _mm256_cvtepu16_epi32,
    U32x4 => U64x4: _mm256_cvtepu32_epi64,
    I32x4 => I64x4: _mm256_cvtepi32_epi64,
    U32x4 => I64x4: _mm256_cvtepu32_epi64,
);

// All-ones lanes sign extend to all-ones lanes.
widen!(MaskConvert:
    Mask8x16 => Mask16x16: _mm256_cvtepi8_epi16,
    Mask16x8 => Mask32x8: _mm256_cvtepi16_epi32,
    Mask32x4 => Mask64x4: _mm256_cvtepi32_epi64,
);

#[inline(always)]
fn halves(x: __m256i) -> (__m128i, __m128i) {
    unsafe { (_mm256_castsi256_si128(x), _mm256_extracti128_si256::<1>(x)) }
}

#[inline(always)]
fn truncate_epi16(x: __m256i) -> __m128i {
    let (lo, hi) = halves(unsafe { _mm256_and_si256(x, _mm256_set1_epi16(0x00FF)) });
    unsafe { _mm_packus_epi16(lo, hi) }
}

#[inline(always)]
fn truncate_epi32(x: __m256i) -> __m128i {
    let (lo, hi) = halves(unsafe { _mm256_and_si256(x, _mm256_set1_epi32(0xFFFF)) });
    unsafe { _mm_packus_epi32(lo, hi) }
}

/// Gathers the even 32-bit words, which hold the low half of each 64-bit lane.
#[inline(always)]
fn truncate_epi64(x: __m256i) -> __m128i {
    unsafe {
        let even = _mm256_permutevar8x32_epi32(x, _mm256_setr_epi32(0, 2, 4, 6, 0, 2, 4, 6));
        _mm256_castsi256_si128(even)
    }
}

#[inline(always)]
fn pack_mask_epi16(x: __m256i) -> __m128i {
    let (lo, hi) = halves(x);
    unsafe { _mm_packs_epi16(lo, hi) }
}

#[inline(always)]
fn pack_mask_epi32(x: __m256i) -> __m128i {
    let (lo, hi) = halves(x);
    unsafe { _mm_packs_epi32(lo, hi) }
}

macro_rules! narrow {
    ($trait:ident: $($from:ty => $to:ty: $op:ident),* $(,)?) => {$(
        impl $trait<$to> for $from {
            #[inline(always)]
            fn convert(self) -> $to {
                <$to>::from_xmm($op(self.ymm()))
            }
        }
    )*};
}

narrow!(Convert:
    U16x16 => U8x16: truncate_epi16,
    I16x16 => I8x16: truncate_epi16,
    U32x8 => U16x8: truncate_epi32,
    I32x8 => I16x8: truncate_epi32,
    U64x4 => U32x4: truncate_epi64,
    I64x4 => I32x4: truncate_epi64,
);

narrow!(MaskConvert:
    Mask16x16 => Mask8x16: pack_mask_epi16,
    Mask32x8 => Mask16x8: pack_mask_epi32,
    Mask64x4 => Mask32x4: truncate_epi64,
);
