#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{cast, count, not, popcount_epi64, select, Xmm};
#[cfg(target_feature = "sse4.2")]
use super::bias_epi64;
use crate::simd::kernels::{
    midpoint_from_floor, popcount_countr_zero, shift_rotl, shift_rotr, smear_bit_ceil,
    smear_bit_floor, smear_countl_zero, Kernels,
};
use crate::simd::mask::Mask64x2;
use crate::simd::vector::{I64x2, U64x2};

/// Low 64 bits of the products, from three 32-bit multiplies.
#[inline(always)]
fn mullo_epi64(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let lo = _mm_mul_epu32(a, b);
        let cross_a = _mm_mul_epu32(_mm_srli_epi64(a, 32), b);
        let cross_b = _mm_mul_epu32(a, _mm_srli_epi64(b, 32));
        _mm_add_epi64(lo, _mm_slli_epi64(_mm_add_epi64(cross_a, cross_b), 32))
    }
}

#[inline(always)]
fn cmpeq_epi64(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(target_feature = "sse4.1")]
    unsafe {
        _mm_cmpeq_epi64(a, b)
    }
    #[cfg(not(target_feature = "sse4.1"))]
    unsafe {
        let halves = _mm_cmpeq_epi32(a, b);
        _mm_and_si128(halves, _mm_shuffle_epi32(halves, 0xB1))
    }
}

#[inline(always)]
fn byteswap_epi64(x: __m128i) -> __m128i {
    #[cfg(target_feature = "ssse3")]
    unsafe {
        let order = _mm_setr_epi8(7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8);
        _mm_shuffle_epi8(x, order)
    }
    #[cfg(not(target_feature = "ssse3"))]
    unsafe {
        let words = _mm_shufflehi_epi16(_mm_shufflelo_epi16(x, 0x1B), 0x1B);
        _mm_or_si128(_mm_slli_epi16(words, 8), _mm_srli_epi16(words, 8))
    }
}

macro_rules! common_kernels {
    () => {
        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_add_epi64(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_sub_epi64(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self::from_xmm(mullo_epi64(self.xmm(), rhs.xmm()))
        }

        #[inline(always)]
        fn neg(self) -> Self {
            Self::from_xmm(unsafe { _mm_sub_epi64(_mm_setzero_si128(), self.xmm()) })
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

        #[inline(always)]
        fn shl(self, s: u32) -> Self {
            Self::from_xmm(unsafe { _mm_sll_epi64(self.xmm(), count(s)) })
        }

        #[cfg(avx2)]
        #[inline(always)]
        fn shlv(self, counts: Self) -> Self {
            Self::from_xmm(unsafe { _mm_sllv_epi64(self.xmm(), counts.xmm()) })
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> Mask64x2 {
            Mask64x2::from_xmm(cmpeq_epi64(self.xmm(), rhs.xmm()))
        }

        #[inline(always)]
        fn blend(m: Mask64x2, a: Self, b: Self) -> Self {
            Self::from_xmm(select(m.xmm(), a.xmm(), b.xmm()))
        }

        #[inline(always)]
        fn broadcast(m: Mask64x2) -> Self {
            cast(m)
        }

        #[inline(always)]
        fn popcount(self) -> Self {
            Self::from_xmm(popcount_epi64(self.xmm()))
        }

        #[inline(always)]
        fn countr_zero(self) -> Self {
            popcount_countr_zero(self)
        }

        #[inline(always)]
        fn byteswap(self) -> Self {
            Self::from_xmm(byteswap_epi64(self.xmm()))
        }

        #[cfg(avx2)]
        #[inline(always)]
        unsafe fn gather(base: *const Self::Lane, indices: I64x2, n: usize) -> Self {
            let live = n.min(2) as i64;
            unsafe {
                let lanes = _mm_set_epi64x(1, 0);
                let mask = _mm_cmpgt_epi64(_mm_set1_epi64x(live), lanes);
                Self::from_xmm(_mm_mask_i64gather_epi64::<8>(
                    _mm_setzero_si128(),
                    base as *const i64,
                    indices.xmm(),
                    mask,
                ))
            }
        }
    };
}

impl Kernels for U64x2 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_xmm(unsafe { _mm_srl_epi64(self.xmm(), count(s)) })
    }

    #[cfg(avx2)]
    #[inline(always)]
    fn shrv(self, counts: Self) -> Self {
        Self::from_xmm(unsafe { _mm_srlv_epi64(self.xmm(), counts.xmm()) })
    }

    #[cfg(target_feature = "sse4.2")]
    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask64x2 {
        Mask64x2::from_xmm(unsafe {
            _mm_cmpgt_epi64(bias_epi64(rhs.xmm()), bias_epi64(self.xmm()))
        })
    }

    #[cfg(target_feature = "sse4.2")]
    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Kernels::blend(Kernels::cmp_lt(self, rhs), self, rhs)
    }

    #[cfg(target_feature = "sse4.2")]
    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Kernels::blend(Kernels::cmp_lt(self, rhs), rhs, self)
    }

    #[inline(always)]
    fn average(self, rhs: Self) -> Self {
        let shared = Kernels::and(self, rhs);
        Kernels::add(shared, Kernels::shr(Kernels::xor(self, rhs), 1))
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

impl Kernels for I64x2 {
    common_kernels!();

    #[cfg(target_feature = "sse4.2")]
    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask64x2 {
        Mask64x2::from_xmm(unsafe { _mm_cmpgt_epi64(rhs.xmm(), self.xmm()) })
    }

    #[cfg(target_feature = "sse4.2")]
    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Kernels::blend(Kernels::cmp_lt(self, rhs), self, rhs)
    }

    #[cfg(target_feature = "sse4.2")]
    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Kernels::blend(Kernels::cmp_lt(self, rhs), rhs, self)
    }

    #[cfg(target_feature = "sse4.2")]
    #[inline(always)]
    fn abs(self) -> Self {
        unsafe {
            let x = self.xmm();
            let sign = _mm_cmpgt_epi64(_mm_setzero_si128(), x);
            Self::from_xmm(_mm_sub_epi64(_mm_xor_si128(x, sign), sign))
        }
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        cast(Kernels::countl_zero(cast::<Self, U64x2>(self)))
    }

    #[inline(always)]
    fn rotl(self, s: u32) -> Self {
        cast(Kernels::rotl(cast::<Self, U64x2>(self), s))
    }

    #[inline(always)]
    fn rotr(self, s: u32) -> Self {
        cast(Kernels::rotr(cast::<Self, U64x2>(self), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emulated_multiply() {
        let a = U64x2::from_array([u64::MAX, 0x1234_5678_9ABC_DEF0]);
        let b = U64x2::from_array([u64::MAX, 0x0FED_CBA9_8765_4321]);
        let expected = [
            u64::MAX.wrapping_mul(u64::MAX),
            0x1234_5678_9ABC_DEF0u64.wrapping_mul(0x0FED_CBA9_8765_4321),
        ];
        assert_eq!(Kernels::mul(a, b).to_array(), expected);

        let a = I64x2::from_array([-3, i64::MIN]);
        let b = I64x2::from_array([7, -1]);
        assert_eq!(Kernels::mul(a, b).to_array(), [-21, i64::MIN]);
    }

    #[test]
    fn test_equality_needs_both_halves() {
        let a = U64x2::from_array([0x0000_0001_0000_0000, 5]);
        let b = U64x2::from_array([0x0000_0002_0000_0000, 5]);
        assert_eq!(Kernels::cmp_eq(a, b).to_array(), [false, true]);
    }

    #[test]
    fn test_order_and_byteswap() {
        let a = U64x2::from_array([u64::MAX, 1]);
        let b = U64x2::from_array([0, 2]);
        assert_eq!(Kernels::cmp_lt(a, b).to_array(), [false, true]);
        assert_eq!(Kernels::min(a, b).to_array(), [0, 1]);

        let v = U64x2::from_array([0x0102_0304_0506_0708, 0xFF]);
        assert_eq!(
            Kernels::byteswap(v).to_array(),
            [0x0807_0605_0403_0201, 0xFF00_0000_0000_0000]
        );
    }
}
