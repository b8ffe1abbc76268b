#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{bias_epi8, cast, count, nibble_lookup, not, popcount_epi8, select, Ymm};
use crate::simd::kernels::{
    floor_from_rounded_average, midpoint_from_floor, popcount_countr_zero, shift_rotl,
    shift_rotr, smear_bit_ceil, smear_bit_floor, Kernels,
};
use crate::simd::mask::Mask8x32;
use crate::simd::vector::{I8x32, U8x32};

#[inline(always)]
fn shl_epi8(x: __m256i, s: u32) -> __m256i {
    if s >= 8 {
        return unsafe { _mm256_setzero_si256() };
    }
    unsafe {
        let kept = _mm256_set1_epi8((0xFFu8 << s) as i8);
        _mm256_and_si256(_mm256_sll_epi16(x, count(s)), kept)
    }
}

#[inline(always)]
fn srl_epi8(x: __m256i, s: u32) -> __m256i {
    if s >= 8 {
        return unsafe { _mm256_setzero_si256() };
    }
    unsafe {
        let kept = _mm256_set1_epi8((0xFFu8 >> s) as i8);
        _mm256_and_si256(_mm256_srl_epi16(x, count(s)), kept)
    }
}

#[inline(always)]
fn sra_epi8(x: __m256i, s: u32) -> __m256i {
    let s = s.min(7);
    unsafe {
        let lo = _mm256_sra_epi16(_mm256_unpacklo_epi8(x, x), count(s + 8));
        let hi = _mm256_sra_epi16(_mm256_unpackhi_epi8(x, x), count(s + 8));
        _mm256_packs_epi16(lo, hi)
    }
}

#[inline(always)]
fn mullo_epi8(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let even = _mm256_mullo_epi16(a, b);
        let odd = _mm256_mullo_epi16(_mm256_srli_epi16(a, 8), _mm256_srli_epi16(b, 8));
        _mm256_or_si256(
            _mm256_and_si256(even, _mm256_set1_epi16(0x00FF)),
            _mm256_slli_epi16(odd, 8),
        )
    }
}

#[inline(always)]
fn mulhi_epu8(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let zero = _mm256_setzero_si256();
        let lo = _mm256_mullo_epi16(
            _mm256_unpacklo_epi8(a, zero),
            _mm256_unpacklo_epi8(b, zero),
        );
        let hi = _mm256_mullo_epi16(
            _mm256_unpackhi_epi8(a, zero),
            _mm256_unpackhi_epi8(b, zero),
        );
        _mm256_packus_epi16(_mm256_srli_epi16(lo, 8), _mm256_srli_epi16(hi, 8))
    }
}

#[inline(always)]
fn mulhi_epi8(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let lo = _mm256_mullo_epi16(
            _mm256_srai_epi16(_mm256_unpacklo_epi8(a, a), 8),
            _mm256_srai_epi16(_mm256_unpacklo_epi8(b, b), 8),
        );
        let hi = _mm256_mullo_epi16(
            _mm256_srai_epi16(_mm256_unpackhi_epi8(a, a), 8),
            _mm256_srai_epi16(_mm256_unpackhi_epi8(b, b), 8),
        );
        _mm256_packs_epi16(_mm256_srai_epi16(lo, 8), _mm256_srai_epi16(hi, 8))
    }
}

#[inline(always)]
fn countl_zero_epi8(x: __m256i) -> __m256i {
    let (lo, hi) = nibble_lookup([4, 3, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0], x);
    unsafe {
        let hi_zero = _mm256_cmpeq_epi8(
            _mm256_and_si256(x, _mm256_set1_epi8(0xF0u8 as i8)),
            _mm256_setzero_si256(),
        );
        _mm256_add_epi8(hi, _mm256_and_si256(hi_zero, lo))
    }
}

macro_rules! common_kernels {
    () => {
        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_add_epi8(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_sub_epi8(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self::from_ymm(mullo_epi8(self.ymm(), rhs.ymm()))
        }

        #[inline(always)]
        fn neg(self) -> Self {
            Self::from_ymm(unsafe { _mm256_sub_epi8(_mm256_setzero_si256(), self.ymm()) })
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
            Self::from_ymm(shl_epi8(self.ymm(), s))
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> Mask8x32 {
            Mask8x32::from_ymm(unsafe { _mm256_cmpeq_epi8(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn blend(m: Mask8x32, a: Self, b: Self) -> Self {
            Self::from_ymm(select(m.ymm(), a.ymm(), b.ymm()))
        }

        #[inline(always)]
        fn broadcast(m: Mask8x32) -> Self {
            cast(m)
        }

        #[inline(always)]
        fn popcount(self) -> Self {
            Self::from_ymm(popcount_epi8(self.ymm()))
        }

        #[inline(always)]
        fn countl_zero(self) -> Self {
            Self::from_ymm(countl_zero_epi8(self.ymm()))
        }

        #[inline(always)]
        fn countr_zero(self) -> Self {
            popcount_countr_zero(self)
        }

        #[inline(always)]
        fn byteswap(self) -> Self {
            self
        }
    };
}

impl Kernels for U8x32 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_ymm(srl_epi8(self.ymm(), s))
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask8x32 {
        Mask8x32::from_ymm(unsafe {
            _mm256_cmpgt_epi8(bias_epi8(rhs.ymm()), bias_epi8(self.ymm()))
        })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_min_epu8(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_max_epu8(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_ymm(mulhi_epu8(self.ymm(), rhs.ymm()))
    }

    #[inline(always)]
    fn average(self, rhs: Self) -> Self {
        let rounded = Self::from_ymm(unsafe { _mm256_avg_epu8(self.ymm(), rhs.ymm()) });
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

impl Kernels for I8x32 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_ymm(sra_epi8(self.ymm(), s))
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask8x32 {
        Mask8x32::from_ymm(unsafe { _mm256_cmpgt_epi8(rhs.ymm(), self.ymm()) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_min_epi8(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_max_epi8(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_ymm(mulhi_epi8(self.ymm(), rhs.ymm()))
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_ymm(unsafe { _mm256_abs_epi8(self.ymm()) })
    }

    #[inline(always)]
    fn rotl(self, s: u32) -> Self {
        cast(Kernels::rotl(cast::<Self, U8x32>(self), s))
    }

    #[inline(always)]
    fn rotr(self, s: u32) -> Self {
        cast(Kernels::rotr(cast::<Self, U8x32>(self), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countl_zero_table() {
        let mut lanes = [0u8; 32];
        for (i, lane) in lanes.iter_mut().enumerate() {
            *lane = (i as u8).wrapping_mul(37) ^ (1 << (i % 8));
        }
        let v = U8x32::from_array(lanes);
        let counts = Kernels::countl_zero(v).to_array();
        for (count, x) in counts.iter().zip(lanes) {
            assert_eq!(u32::from(*count), x.leading_zeros());
        }
        assert_eq!(Kernels::countl_zero(U8x32::default()), U8x32::splat(8));
    }

    #[test]
    fn test_pack_keeps_lane_order() {
        let mut lanes = [0i8; 32];
        for (i, lane) in lanes.iter_mut().enumerate() {
            *lane = i as i8 - 16;
        }
        let v = I8x32::from_array(lanes);
        let shifted = Kernels::shr(v, 1).to_array();
        for (out, x) in shifted.iter().zip(lanes) {
            assert_eq!(*out, x >> 1);
        }

        let hi = Kernels::mul_hi(v, I8x32::splat(100)).to_array();
        for (out, x) in hi.iter().zip(lanes) {
            assert_eq!(*out, ((i16::from(x) * 100) >> 8) as i8);
        }
    }
}
