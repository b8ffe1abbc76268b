#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{bias_epi16, cast, count, not, popcount_epi16, select, Xmm};
use crate::simd::kernels::{
    floor_from_rounded_average, midpoint_from_floor, popcount_countr_zero, shift_rotl,
    shift_rotr, smear_bit_ceil, smear_bit_floor, smear_countl_zero, Kernels,
};
use crate::simd::mask::Mask16x8;
use crate::simd::vector::{I16x8, U16x8};

#[inline(always)]
fn byteswap_epi16(x: __m128i) -> __m128i {
    #[cfg(target_feature = "ssse3")]
    unsafe {
        let order = _mm_setr_epi8(1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14);
        _mm_shuffle_epi8(x, order)
    }
    #[cfg(not(target_feature = "ssse3"))]
    unsafe {
        _mm_or_si128(_mm_slli_epi16(x, 8), _mm_srli_epi16(x, 8))
    }
}

macro_rules! common_kernels {
    () => {
        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_add_epi16(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_sub_epi16(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_mullo_epi16(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn neg(self) -> Self {
            Self::from_xmm(unsafe { _mm_sub_epi16(_mm_setzero_si128(), self.xmm()) })
        }

        #[inline(always)]
        fn and(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_and_si128(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn or(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_or_si128(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn xor(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_xor_si128(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn not(self) -> Self {
            Self::from_xmm(not(self.xmm()))
        }

        // sll with a count of 16 or more clears the lane
        #[inline(always)]
        fn shl(self, s: u32) -> Self {
            Self::from_xmm(unsafe { _mm_sll_epi16(self.xmm(), count(s)) })
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> Mask16x8 {
            Mask16x8::from_xmm(unsafe { _mm_cmpeq_epi16(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn blend(m: Mask16x8, a: Self, b: Self) -> Self {
            Self::from_xmm(select(m.xmm(), a.xmm(), b.xmm()))
        }

        #[inline(always)]
        fn broadcast(m: Mask16x8) -> Self {
            cast(m)
        }

        #[inline(always)]
        fn popcount(self) -> Self {
            Self::from_xmm(popcount_epi16(self.xmm()))
        }

        #[inline(always)]
        fn countr_zero(self) -> Self {
            popcount_countr_zero(self)
        }

        #[inline(always)]
        fn byteswap(self) -> Self {
            Self::from_xmm(byteswap_epi16(self.xmm()))
        }
    };
}

impl Kernels for U16x8 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_xmm(unsafe { _mm_srl_epi16(self.xmm(), count(s)) })
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask16x8 {
        Mask16x8::from_xmm(unsafe {
            _mm_cmplt_epi16(bias_epi16(self.xmm()), bias_epi16(rhs.xmm()))
        })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        {
            Self::from_xmm(unsafe { _mm_min_epu16(self.xmm(), rhs.xmm()) })
        }
        #[cfg(not(target_feature = "sse4.1"))]
        unsafe {
            let biased = _mm_min_epi16(bias_epi16(self.xmm()), bias_epi16(rhs.xmm()));
            Self::from_xmm(bias_epi16(biased))
        }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        {
            Self::from_xmm(unsafe { _mm_max_epu16(self.xmm(), rhs.xmm()) })
        }
        #[cfg(not(target_feature = "sse4.1"))]
        unsafe {
            let biased = _mm_max_epi16(bias_epi16(self.xmm()), bias_epi16(rhs.xmm()));
            Self::from_xmm(bias_epi16(biased))
        }
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_xmm(unsafe { _mm_mulhi_epu16(self.xmm(), rhs.xmm()) })
    }

    #[inline(always)]
    fn average(self, rhs: Self) -> Self {
        let rounded = Self::from_xmm(unsafe { _mm_avg_epu16(self.xmm(), rhs.xmm()) });
        floor_from_rounded_average(rounded, self, rhs)
    }

    #[inline(always)]
    fn midpoint(self, rhs: Self) -> Self {
        midpoint_from_floor(Kernels::average(self, rhs), self, rhs)
    }

    #[inline(always)]
    fn abs(self) -> Self {
        self
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        smear_countl_zero(self)
    }

    #[inline(always)]
    fn bit_floor(self) -> Self {
        smear_bit_floor(self)
    }

    #[inline(always)]
    fn bit_ceil(self) -> Self {
        smear_bit_ceil(self)
    }

    #[inline(always)]
    fn rotl(self, s: u32) -> Self {
        shift_rotl(self, s)
    }

    #[inline(always)]
    fn rotr(self, s: u32) -> Self {
        shift_rotr(self, s)
    }
}

impl Kernels for I16x8 {
    common_kernels!();

    // sra with a count of 16 or more fills with the sign
    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_xmm(unsafe { _mm_sra_epi16(self.xmm(), count(s)) })
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask16x8 {
        Mask16x8::from_xmm(unsafe { _mm_cmplt_epi16(self.xmm(), rhs.xmm()) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::from_xmm(unsafe { _mm_min_epi16(self.xmm(), rhs.xmm()) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_xmm(unsafe { _mm_max_epi16(self.xmm(), rhs.xmm()) })
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_xmm(unsafe { _mm_mulhi_epi16(self.xmm(), rhs.xmm()) })
    }

    #[inline(always)]
    fn abs(self) -> Self {
        #[cfg(target_feature = "ssse3")]
        {
            Self::from_xmm(unsafe { _mm_abs_epi16(self.xmm()) })
        }
        #[cfg(not(target_feature = "ssse3"))]
        unsafe {
            let x = self.xmm();
            let sign = _mm_srai_epi16(x, 15);
            Self::from_xmm(_mm_sub_epi16(_mm_xor_si128(x, sign), sign))
        }
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        cast(Kernels::countl_zero(cast::<Self, U16x8>(self)))
    }

    #[inline(always)]
    fn rotl(self, s: u32) -> Self {
        cast(Kernels::rotl(cast::<Self, U16x8>(self), s))
    }

    #[inline(always)]
    fn rotr(self, s: u32) -> Self {
        cast(Kernels::rotr(cast::<Self, U16x8>(self), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_order_uses_bias() {
        let a = U16x8::from_array([0, 1, 0x7FFF, 0x8000, 0xFFFF, 5, 40000, 2]);
        let b = U16x8::from_array([1, 0, 0x8000, 0x7FFF, 0, 5, 30000, 60000]);
        let lt = Kernels::cmp_lt(a, b);
        assert_eq!(
            lt.to_array(),
            [true, false, true, false, false, false, false, true]
        );
        assert_eq!(
            Kernels::min(a, b).to_array(),
            [0, 0, 0x7FFF, 0x7FFF, 0, 5, 30000, 2]
        );
        assert_eq!(
            Kernels::max(a, b).to_array(),
            [1, 1, 0x8000, 0x8000, 0xFFFF, 5, 40000, 60000]
        );
    }

    #[test]
    fn test_shift_counts_past_width() {
        let v = I16x8::splat(-2);
        assert_eq!(Kernels::shr(v, 16), I16x8::splat(-1));
        assert_eq!(Kernels::shl(v, 16), I16x8::default());
        assert_eq!(Kernels::shr(U16x8::splat(0x8000), 99), U16x8::default());
    }

    #[test]
    fn test_byteswap() {
        let v = U16x8::from_array([0x1234, 0xABCD, 0, 0xFF00, 1, 2, 3, 4]);
        assert_eq!(
            Kernels::byteswap(v).to_array(),
            [0x3412, 0xCDAB, 0, 0x00FF, 0x100, 0x200, 0x300, 0x400]
        );
    }
}
