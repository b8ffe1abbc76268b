#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{bias_epi32, cast, count, not, popcount_epi32, select, Xmm};
use crate::simd::kernels::{
    midpoint_from_floor, popcount_countr_zero, shift_rotl, shift_rotr, smear_bit_ceil,
    smear_bit_floor, Kernels,
};
use crate::simd::mask::Mask32x4;
use crate::simd::vector::{I32x4, U32x4};

#[inline(always)]
fn mullo_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(target_feature = "sse4.1")]
    unsafe {
        _mm_mullo_epi32(a, b)
    }
    #[cfg(not(target_feature = "sse4.1"))]
    unsafe {
        let even = _mm_mul_epu32(a, b);
        let odd = _mm_mul_epu32(_mm_srli_epi64(a, 32), _mm_srli_epi64(b, 32));
        _mm_unpacklo_epi32(
            _mm_shuffle_epi32(even, 0x08),
            _mm_shuffle_epi32(odd, 0x08),
        )
    }
}

/// High halves of the unsigned 64-bit products.
#[inline(always)]
fn mulhi_epu32(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let even = _mm_mul_epu32(a, b);
        let odd = _mm_mul_epu32(_mm_srli_epi64(a, 32), _mm_srli_epi64(b, 32));
        _mm_or_si128(
            _mm_srli_epi64(even, 32),
            _mm_and_si128(odd, _mm_set_epi32(-1, 0, -1, 0)),
        )
    }
}

#[inline(always)]
fn mulhi_epi32(a: __m128i, b: __m128i) -> __m128i {
    #[cfg(target_feature = "sse4.1")]
    unsafe {
        let even = _mm_mul_epi32(a, b);
        let odd = _mm_mul_epi32(_mm_srli_epi64(a, 32), _mm_srli_epi64(b, 32));
        _mm_or_si128(
            _mm_srli_epi64(even, 32),
            _mm_and_si128(odd, _mm_set_epi32(-1, 0, -1, 0)),
        )
    }
    #[cfg(not(target_feature = "sse4.1"))]
    unsafe {
        // hi_s(a, b) = hi_u(a, b) - (a < 0 ? b : 0) - (b < 0 ? a : 0)
        let a_sign = _mm_srai_epi32(a, 31);
        let b_sign = _mm_srai_epi32(b, 31);
        let hi = mulhi_epu32(a, b);
        let hi = _mm_sub_epi32(hi, _mm_and_si128(a_sign, b));
        _mm_sub_epi32(hi, _mm_and_si128(b_sign, a))
    }
}

/// Leading zeros from the exponent of a float conversion.
///
/// Clearing every bit below the leading one keeps the conversion exact, so
/// the biased exponent is `127 + bit_width - 1`. Zero converts to 0.5, whose
/// exponent gives a count of 32.
#[inline(always)]
fn countl_zero_epi32(x: __m128i) -> __m128i {
    unsafe {
        let x = _mm_andnot_si128(_mm_srli_epi32(x, 1), x);
        let f = _mm_add_ps(_mm_cvtepi32_ps(x), _mm_set1_ps(0.5));
        let exponent = _mm_srli_epi32(_mm_castps_si128(f), 23);
        _mm_subs_epu16(_mm_set1_epi32(158), exponent)
    }
}

#[inline(always)]
fn byteswap_epi32(x: __m128i) -> __m128i {
    #[cfg(target_feature = "ssse3")]
    unsafe {
        let order = _mm_setr_epi8(3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, 15, 14, 13, 12);
        _mm_shuffle_epi8(x, order)
    }
    #[cfg(not(target_feature = "ssse3"))]
    unsafe {
        let words = _mm_shufflehi_epi16(_mm_shufflelo_epi16(x, 0xB1), 0xB1);
        _mm_or_si128(_mm_slli_epi16(words, 8), _mm_srli_epi16(words, 8))
    }
}

macro_rules! common_kernels {
    () => {
        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_add_epi32(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_sub_epi32(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self::from_xmm(mullo_epi32(self.xmm(), rhs.xmm()))
        }

        #[inline(always)]
        fn neg(self) -> Self {
            Self::from_xmm(unsafe { _mm_sub_epi32(_mm_setzero_si128(), self.xmm()) })
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
            Self::from_xmm(unsafe { _mm_sll_epi32(self.xmm(), count(s)) })
        }

        #[cfg(avx2)]
        #[inline(always)]
        fn shlv(self, counts: Self) -> Self {
            Self::from_xmm(unsafe { _mm_sllv_epi32(self.xmm(), counts.xmm()) })
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> Mask32x4 {
            Mask32x4::from_xmm(unsafe { _mm_cmpeq_epi32(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn blend(m: Mask32x4, a: Self, b: Self) -> Self {
            Self::from_xmm(select(m.xmm(), a.xmm(), b.xmm()))
        }

        #[inline(always)]
        fn broadcast(m: Mask32x4) -> Self {
            cast(m)
        }

        #[inline(always)]
        fn popcount(self) -> Self {
            Self::from_xmm(popcount_epi32(self.xmm()))
        }

        #[inline(always)]
        fn countl_zero(self) -> Self {
            Self::from_xmm(countl_zero_epi32(self.xmm()))
        }

        #[inline(always)]
        fn countr_zero(self) -> Self {
            popcount_countr_zero(self)
        }

        #[inline(always)]
        fn byteswap(self) -> Self {
            Self::from_xmm(byteswap_epi32(self.xmm()))
        }

        #[cfg(avx2)]
        #[inline(always)]
        unsafe fn gather(base: *const Self::Lane, indices: I32x4, n: usize) -> Self {
            let live = n.min(4) as i32;
            unsafe {
                let lanes = _mm_setr_epi32(0, 1, 2, 3);
                let mask = _mm_cmpgt_epi32(_mm_set1_epi32(live), lanes);
                Self::from_xmm(_mm_mask_i32gather_epi32::<4>(
                    _mm_setzero_si128(),
                    base as *const i32,
                    indices.xmm(),
                    mask,
                ))
            }
        }
    };
}

impl Kernels for U32x4 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_xmm(unsafe { _mm_srl_epi32(self.xmm(), count(s)) })
    }

    #[cfg(avx2)]
    #[inline(always)]
    fn shrv(self, counts: Self) -> Self {
        Self::from_xmm(unsafe { _mm_srlv_epi32(self.xmm(), counts.xmm()) })
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask32x4 {
        Mask32x4::from_xmm(unsafe {
            _mm_cmplt_epi32(bias_epi32(self.xmm()), bias_epi32(rhs.xmm()))
        })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        {
            Self::from_xmm(unsafe { _mm_min_epu32(self.xmm(), rhs.xmm()) })
        }
        #[cfg(not(target_feature = "sse4.1"))]
        {
            Kernels::blend(Kernels::cmp_lt(self, rhs), self, rhs)
        }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        {
            Self::from_xmm(unsafe { _mm_max_epu32(self.xmm(), rhs.xmm()) })
        }
        #[cfg(not(target_feature = "sse4.1"))]
        {
            Kernels::blend(Kernels::cmp_lt(self, rhs), rhs, self)
        }
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_xmm(mulhi_epu32(self.xmm(), rhs.xmm()))
    }

    // (a & b) + ((a ^ b) >> 1)
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

impl Kernels for I32x4 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_xmm(unsafe { _mm_sra_epi32(self.xmm(), count(s)) })
    }

    #[cfg(avx2)]
    #[inline(always)]
    fn shrv(self, counts: Self) -> Self {
        Self::from_xmm(unsafe { _mm_srav_epi32(self.xmm(), counts.xmm()) })
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask32x4 {
        Mask32x4::from_xmm(unsafe { _mm_cmplt_epi32(self.xmm(), rhs.xmm()) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        {
            Self::from_xmm(unsafe { _mm_min_epi32(self.xmm(), rhs.xmm()) })
        }
        #[cfg(not(target_feature = "sse4.1"))]
        {
            Kernels::blend(Kernels::cmp_lt(self, rhs), self, rhs)
        }
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        {
            Self::from_xmm(unsafe { _mm_max_epi32(self.xmm(), rhs.xmm()) })
        }
        #[cfg(not(target_feature = "sse4.1"))]
        {
            Kernels::blend(Kernels::cmp_lt(self, rhs), rhs, self)
        }
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_xmm(mulhi_epi32(self.xmm(), rhs.xmm()))
    }

    #[inline(always)]
    fn abs(self) -> Self {
        #[cfg(target_feature = "ssse3")]
        {
            Self::from_xmm(unsafe { _mm_abs_epi32(self.xmm()) })
        }
        #[cfg(not(target_feature = "ssse3"))]
        unsafe {
            let x = self.xmm();
            let sign = _mm_srai_epi32(x, 31);
            Self::from_xmm(_mm_sub_epi32(_mm_xor_si128(x, sign), sign))
        }
    }

    #[inline(always)]
    fn rotl(self, s: u32) -> Self {
        cast(Kernels::rotl(cast::<Self, U32x4>(self), s))
    }

    #[inline(always)]
    fn rotr(self, s: u32) -> Self {
        cast(Kernels::rotr(cast::<Self, U32x4>(self), s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countl_zero_float_trick() {
        let values = [
            0u32,
            1,
            2,
            3,
            0x7F,
            0x80,
            0xFFFF,
            0x0100_0000,
            0x01FF_FFFF,
            0x00FF_FFFF,
            0x7FFF_FFFF,
            0x8000_0000,
            u32::MAX,
            0x4000_0001,
            0x0000_FFFF,
            12345,
        ];
        for chunk in values.chunks(4) {
            let v = U32x4::from_array([chunk[0], chunk[1], chunk[2], chunk[3]]);
            let counts = Kernels::countl_zero(v).to_array();
            for (count, x) in counts.iter().zip(chunk) {
                assert_eq!(*count, x.leading_zeros(), "countl_zero({x:#x})");
            }
        }
    }

    #[test]
    fn test_mul_hi() {
        let a = U32x4::from_array([u32::MAX, 0x8000_0000, 3, 0x1234_5678]);
        let b = U32x4::from_array([u32::MAX, 2, 5, 0x9ABC_DEF0]);
        let hi = Kernels::mul_hi(a, b).to_array();
        for i in 0..4 {
            let wide = u64::from(a.to_array()[i]) * u64::from(b.to_array()[i]);
            assert_eq!(hi[i], (wide >> 32) as u32);
        }

        let a = I32x4::from_array([i32::MIN, -1, 7, -123_456_789]);
        let b = I32x4::from_array([i32::MIN, 1, -9, 987_654_321]);
        let hi = Kernels::mul_hi(a, b).to_array();
        for i in 0..4 {
            let wide = i64::from(a.to_array()[i]) * i64::from(b.to_array()[i]);
            assert_eq!(hi[i], (wide >> 32) as i32);
        }
    }

    #[test]
    fn test_mullo_and_byteswap() {
        let a = U32x4::from_array([0xFFFF_FFFF, 0x1234_5678, 65536, 7]);
        let b = U32x4::from_array([0xFFFF_FFFF, 0x10, 65536, 6]);
        assert_eq!(Kernels::mul(a, b).to_array(), [1, 0x2345_6780, 0, 42]);
        assert_eq!(
            Kernels::byteswap(a).to_array(),
            [0xFFFF_FFFF, 0x7856_3412, 0x0000_0100, 0x0700_0000]
        );
    }
}
