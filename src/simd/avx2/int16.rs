#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{cast, count, not, popcount_epi16, select, shuffle_bytes, Ymm};
use crate::simd::kernels::{
    floor_from_rounded_average, midpoint_from_floor, popcount_countr_zero, shift_rotl,
    shift_rotr, smear_bit_ceil, smear_bit_floor, smear_countl_zero, Kernels,
};
use crate::simd::mask::Mask16x16;
use crate::simd::vector::{I16x16, U16x16};

const BYTESWAP_16: [i8; 16] = [1, 0, 3, 2, 5, 4, 7, 6, 9, 8, 11, 10, 13, 12, 15, 14];

macro_rules! common_kernels {
    () => {
        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_add_epi16(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_sub_epi16(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_mullo_epi16(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn neg(self) -> Self {
            Self::from_ymm(unsafe { _mm256_sub_epi16(_mm256_setzero_si256(), self.ymm()) })
        }

        #[inline(always)]
        fn and(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_and_si256(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn or(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_or_si256(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn xor(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_xor_si256(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn not(self) -> Self {
            Self::from_ymm(not(self.ymm()))
        }

        #[inline(always)]
        fn shl(self, s: u32) -> Self {
            Self::from_ymm(unsafe { _mm256_sll_epi16(self.ymm(), count(s)) })
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> Mask16x16 {
            Mask16x16::from_ymm(unsafe { _mm256_cmpeq_epi16(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn blend(m: Mask16x16, a: Self, b: Self) -> Self {
            Self::from_ymm(select(m.ymm(), a.ymm(), b.ymm()))
        }

        #[inline(always)]
        fn broadcast(m: Mask16x16) -> Self {
            cast(m)
        }

        #[inline(always)]
        fn popcount(self) -> Self {
            Self::from_ymm(popcount_epi16(self.ymm()))
        }

        #[inline(always)]
        fn countr_zero(self) -> Self {
            popcount_countr_zero(self)
        }

        #[inline(always)]
        fn byteswap(self) -> Self {
            Self::from_ymm(shuffle_bytes(self.ymm(), BYTESWAP_16))
        }
    };
}

impl Kernels for U16x16 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_ymm(unsafe { _mm256_srl_epi16(self.ymm(), count(s)) })
    }

    // a < b exactly when max(a, b) differs from a
    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask16x16 {
        let max = Kernels::max(self, rhs);
        !Kernels::cmp_eq(max, self)
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_min_epu16(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_max_epu16(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_mulhi_epu16(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn average(self, rhs: Self) -> Self {
        let rounded = Self::from_ymm(unsafe { _mm256_avg_epu16(self.ymm(), rhs.ymm()) });
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

impl Kernels for I16x16 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_ymm(unsafe { _mm256_sra_epi16(self.ymm(), count(s)) })
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask16x16 {
        Mask16x16::from_ymm(unsafe { _mm256_cmpgt_epi16(rhs.ymm(), self.ymm()) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_min_epi16(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_max_epi16(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_mulhi_epi16(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_ymm(unsafe { _mm256_abs_epi16(self.ymm()) })
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        cast(Kernels::countl_zero(cast::<Self, U16x16>(self)))
    }

    #[inline(always)]
    fn rotl(self, s: u32) -> Self {
        cast(Kernels::rotl(cast::<Self, U16x16>(self), s))
    }

    #[inline(always)]
    fn rotr(self, s: u32) -> Self {
        cast(Kernels::rotr(cast::<Self, U16x16>(self), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsigned_compare_through_max() {
        let mut a = [0u16; 16];
        let mut b = [0u16; 16];
        for i in 0..16 {
            a[i] = (i as u16).wrapping_mul(4099);
            b[i] = (i as u16).wrapping_mul(0x9E37);
        }
        let lt = Kernels::cmp_lt(U16x16::from_array(a), U16x16::from_array(b)).to_array();
        for i in 0..16 {
            assert_eq!(lt[i], a[i] < b[i]);
        }
    }

    #[test]
    fn test_byteswap_both_halves() {
        let v = I16x16::splat(0x1234);
        assert_eq!(Kernels::byteswap(v), I16x16::splat(0x3412));
    }
}
