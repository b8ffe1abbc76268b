//! NEON kernels for the 128-bit vector types on AArch64.
//!
//! NEON covers most of the vector API directly: register shifts take signed
//! per-lane counts (negative counts shift right), compares produce all-ones
//! lanes, and `cnt`/`clz`/`rev` handle the bit utilities. 64-bit lanes lack
//! multiplies, `min`/`max` and `clz`, so those go through compares or the
//! generic smear kernels.
//!
//! Every vector and mask type shares its layout with a `*x*_t` register and
//! moves between the two by transmuting.
#![allow(unused_unsafe)]

use std::arch::aarch64::*;

use crate::simd::kernels::MaskKernels;
use crate::simd::mask::{Mask16x8, Mask32x4, Mask64x2, Mask8x16};
use crate::simd::vector::{I16x8, I32x4, I64x2, I8x16, U16x8, U32x4, U64x2, U8x16};

mod ints;

/// Types with the exact layout of a NEON register.
pub(crate) trait Neon: Copy {
    /// Register type with the same lane shape.
    type Reg: Copy;

    fn reg(self) -> Self::Reg;
    fn from_reg(r: Self::Reg) -> Self;

    fn bytes(self) -> uint8x16_t;
    fn from_bytes(r: uint8x16_t) -> Self;
}

macro_rules! impl_neon {
    ($($ty:ty => $reg:ty),* $(,)?) => {$(
        impl Neon for $ty {
            type Reg = $reg;

            #[inline(always)]
            fn reg(self) -> $reg {
                unsafe { std::mem::transmute::<$ty, $reg>(self) }
            }

            #[inline(always)]
            fn from_reg(r: $reg) -> Self {
                unsafe { std::mem::transmute::<$reg, $ty>(r) }
            }

            #[inline(always)]
            fn bytes(self) -> uint8x16_t {
                unsafe { std::mem::transmute::<$ty, uint8x16_t>(self) }
            }

            #[inline(always)]
            fn from_bytes(r: uint8x16_t) -> Self {
                unsafe { std::mem::transmute::<uint8x16_t, $ty>(r) }
            }
        }
    )*};
}

impl_neon!(
    U8x16 => uint8x16_t,
    I8x16 => int8x16_t,
    U16x8 => uint16x8_t,
    I16x8 => int16x8_t,
    U32x4 => uint32x4_t,
    I32x4 => int32x4_t,
    U64x2 => uint64x2_t,
    I64x2 => int64x2_t,
    Mask8x16 => uint8x16_t,
    Mask16x8 => uint16x8_t,
    Mask32x4 => uint32x4_t,
    Mask64x2 => uint64x2_t,
);

#[inline(always)]
pub(crate) fn cast<A: Neon, B: Neon>(a: A) -> B {
    B::from_bytes(a.bytes())
}

// ------------------------------------------------------------------------------------------------
// Shift counts
// ------------------------------------------------------------------------------------------------
//
// Register shifts read only the low byte of each count as a signed value, so
// counts are clamped to the lane width before use.

#[inline(always)]
pub(super) fn counts_8(counts: uint8x16_t) -> int8x16_t {
    unsafe { vreinterpretq_s8_u8(vminq_u8(counts, vdupq_n_u8(8))) }
}

#[inline(always)]
pub(super) fn counts_16(counts: uint8x16_t) -> int16x8_t {
    unsafe {
        let c = vreinterpretq_u16_u8(counts);
        vreinterpretq_s16_u16(vminq_u16(c, vdupq_n_u16(16)))
    }
}

#[inline(always)]
pub(super) fn counts_32(counts: uint8x16_t) -> int32x4_t {
    unsafe {
        let c = vreinterpretq_u32_u8(counts);
        vreinterpretq_s32_u32(vminq_u32(c, vdupq_n_u32(32)))
    }
}

#[inline(always)]
pub(super) fn counts_64(counts: uint8x16_t) -> int64x2_t {
    unsafe {
        let c = vreinterpretq_u64_u8(counts);
        let limit = vdupq_n_u64(64);
        vreinterpretq_s64_u64(vbslq_u64(vcgtq_u64(c, limit), limit, c))
    }
}

// ------------------------------------------------------------------------------------------------
// Population counts
// ------------------------------------------------------------------------------------------------

#[inline(always)]
pub(super) fn popcount_16(x: uint8x16_t) -> uint8x16_t {
    unsafe { vreinterpretq_u8_u16(vpaddlq_u8(vcntq_u8(x))) }
}

#[inline(always)]
pub(super) fn popcount_32(x: uint8x16_t) -> uint8x16_t {
    unsafe { vreinterpretq_u8_u32(vpaddlq_u16(vpaddlq_u8(vcntq_u8(x)))) }
}

#[inline(always)]
pub(super) fn popcount_64(x: uint8x16_t) -> uint8x16_t {
    unsafe { vreinterpretq_u8_u64(vpaddlq_u32(vpaddlq_u16(vpaddlq_u8(vcntq_u8(x))))) }
}

// ------------------------------------------------------------------------------------------------
// Masks
// ------------------------------------------------------------------------------------------------

macro_rules! mask_kernels {
    ($($mask:ty => $bytes_per_lane:literal),* $(,)?) => {$(
        impl MaskKernels for $mask {
            #[inline(always)]
            fn count(self) -> usize {
                // every byte of a set lane is 0xFF
                let set_bytes = unsafe { vaddvq_u8(vshrq_n_u8::<7>(self.bytes())) };
                usize::from(set_bytes) / $bytes_per_lane
            }

            #[inline(always)]
            fn any(self) -> bool {
                unsafe { vmaxvq_u8(self.bytes()) != 0 }
            }

            #[inline(always)]
            fn all(self) -> bool {
                unsafe { vminvq_u8(self.bytes()) == u8::MAX }
            }
        }
    )*};
}

mask_kernels!(Mask8x16 => 1, Mask16x8 => 2, Mask32x4 => 4, Mask64x2 => 8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_count_per_width() {
        let m = Mask8x16::from_array([
            true, true, false, true, false, false, false, false, false, false, false, false,
            false, false, false, true,
        ]);
        assert_eq!(MaskKernels::count(m), 4);
        assert_eq!(MaskKernels::count(Mask16x8::splat(true)), 8);
        assert_eq!(MaskKernels::count(Mask64x2::from_array([false, true])), 1);
        assert!(MaskKernels::all(Mask32x4::splat(true)));
        assert!(!MaskKernels::any(Mask32x4::splat(false)));
    }

    #[test]
    fn test_count_clamping() {
        let c = U64x2::from_array([1 << 40, 3]);
        let clamped: I64x2 = I64x2::from_reg(counts_64(c.bytes()));
        assert_eq!(clamped.to_array(), [64, 3]);

        let c = U32x4::from_array([256, 31, 32, u32::MAX]);
        let clamped = I32x4::from_reg(counts_32(c.bytes()));
        assert_eq!(clamped.to_array(), [32, 31, 32, 32]);
    }
}
