#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{bias_epi8, cast, count, not, popcount_epi8, select, Xmm};
use crate::simd::kernels::{
    floor_from_rounded_average, midpoint_from_floor, popcount_countr_zero, shift_rotl,
    shift_rotr, smear_bit_ceil, smear_bit_floor, Kernels,
};
use crate::simd::mask::Mask8x16;
use crate::simd::vector::{I8x16, U8x16};

#[inline(always)]
fn shl_epi8(x: __m128i, s: u32) -> __m128i {
    if s >= 8 {
        return unsafe { _mm_setzero_si128() };
    }
    unsafe {
        let kept = _mm_set1_epi8((0xFFu8 << s) as i8);
        _mm_and_si128(_mm_sll_epi16(x, count(s)), kept)
    }
}

#[inline(always)]
fn srl_epi8(x: __m128i, s: u32) -> __m128i {
    if s >= 8 {
        return unsafe { _mm_setzero_si128() };
    }
    unsafe {
        let kept = _mm_set1_epi8((0xFFu8 >> s) as i8);
        _mm_and_si128(_mm_srl_epi16(x, count(s)), kept)
    }
}

/// Arithmetic shift through sign-extended 16-bit lanes.
#[inline(always)]
fn sra_epi8(x: __m128i, s: u32) -> __m128i {
    let s = s.min(7);
    unsafe {
        let lo = _mm_sra_epi16(_mm_unpacklo_epi8(x, x), count(s + 8));
        let hi = _mm_sra_epi16(_mm_unpackhi_epi8(x, x), count(s + 8));
        _mm_packs_epi16(lo, hi)
    }
}

/// Multiplies even and odd bytes in separate 16-bit products.
#[inline(always)]
fn mullo_epi8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let even = _mm_mullo_epi16(a, b);
        let odd = _mm_mullo_epi16(_mm_srli_epi16(a, 8), _mm_srli_epi16(b, 8));
        _mm_or_si128(
            _mm_and_si128(even, _mm_set1_epi16(0x00FF)),
            _mm_slli_epi16(odd, 8),
        )
    }
}

#[inline(always)]
fn mulhi_epu8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let zero = _mm_setzero_si128();
        let lo = _mm_mullo_epi16(_mm_unpacklo_epi8(a, zero), _mm_unpacklo_epi8(b, zero));
        let hi = _mm_mullo_epi16(_mm_unpackhi_epi8(a, zero), _mm_unpackhi_epi8(b, zero));
        _mm_packus_epi16(_mm_srli_epi16(lo, 8), _mm_srli_epi16(hi, 8))
    }
}

#[inline(always)]
fn mulhi_epi8(a: __m128i, b: __m128i) -> __m128i {
    unsafe {
        let lo = _mm_mullo_epi16(
            _mm_srai_epi16(_mm_unpacklo_epi8(a, a), 8),
            _mm_srai_epi16(_mm_unpacklo_epi8(b, b), 8),
        );
        let hi = _mm_mullo_epi16(
            _mm_srai_epi16(_mm_unpackhi_epi8(a, a), 8),
            _mm_srai_epi16(_mm_unpackhi_epi8(b, b), 8),
        );
        _mm_packs_epi16(_mm_srai_epi16(lo, 8), _mm_srai_epi16(hi, 8))
    }
}

/// Leading zeros per byte from a 16-entry nibble table.
#[cfg(target_feature = "ssse3")]
#[inline(always)]
fn countl_zero_epi8(x: __m128i) -> __m128i {
    unsafe {
        let table = _mm_setr_epi8(4, 3, 2, 2, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0);
        let nibble = _mm_set1_epi8(0x0F);

        let lo = _mm_and_si128(x, nibble);
        let hi = _mm_and_si128(_mm_srli_epi16(x, 4), nibble);

        let hi_zero = _mm_cmpeq_epi8(hi, _mm_setzero_si128());
        let lo_count = _mm_and_si128(hi_zero, _mm_shuffle_epi8(table, lo));
        _mm_add_epi8(_mm_shuffle_epi8(table, hi), lo_count)
    }
}

// Operations whose instructions ignore signedness
macro_rules! common_kernels {
    () => {
        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_add_epi8(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self::from_xmm(unsafe { _mm_sub_epi8(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self::from_xmm(mullo_epi8(self.xmm(), rhs.xmm()))
        }

        #[inline(always)]
        fn neg(self) -> Self {
            Self::from_xmm(unsafe { _mm_sub_epi8(_mm_setzero_si128(), self.xmm()) })
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
            Self::from_xmm(shl_epi8(self.xmm(), s))
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> Mask8x16 {
            Mask8x16::from_xmm(unsafe { _mm_cmpeq_epi8(self.xmm(), rhs.xmm()) })
        }

        #[inline(always)]
        fn blend(m: Mask8x16, a: Self, b: Self) -> Self {
            Self::from_xmm(select(m.xmm(), a.xmm(), b.xmm()))
        }

        #[inline(always)]
        fn broadcast(m: Mask8x16) -> Self {
            cast(m)
        }

        #[inline(always)]
        fn byteswap(self) -> Self {
            self
        }
    };
}

impl Kernels for U8x16 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_xmm(srl_epi8(self.xmm(), s))
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask8x16 {
        Mask8x16::from_xmm(unsafe { _mm_cmplt_epi8(bias_epi8(self.xmm()), bias_epi8(rhs.xmm())) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::from_xmm(unsafe { _mm_min_epu8(self.xmm(), rhs.xmm()) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_xmm(unsafe { _mm_max_epu8(self.xmm(), rhs.xmm()) })
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_xmm(mulhi_epu8(self.xmm(), rhs.xmm()))
    }

    #[inline(always)]
    fn average(self, rhs: Self) -> Self {
        let rounded = Self::from_xmm(unsafe { _mm_avg_epu8(self.xmm(), rhs.xmm()) });
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
    fn popcount(self) -> Self {
        Self::from_xmm(popcount_epi8(self.xmm()))
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        #[cfg(target_feature = "ssse3")]
        {
            Self::from_xmm(countl_zero_epi8(self.xmm()))
        }
        #[cfg(not(target_feature = "ssse3"))]
        {
            crate::simd::kernels::smear_countl_zero(self)
        }
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        popcount_countr_zero(self)
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

impl Kernels for I8x16 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_xmm(sra_epi8(self.xmm(), s))
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask8x16 {
        Mask8x16::from_xmm(unsafe { _mm_cmplt_epi8(self.xmm(), rhs.xmm()) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        #[cfg(target_feature = "sse4.1")]
        {
            Self::from_xmm(unsafe { _mm_min_epi8(self.xmm(), rhs.xmm()) })
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
            Self::from_xmm(unsafe { _mm_max_epi8(self.xmm(), rhs.xmm()) })
        }
        #[cfg(not(target_feature = "sse4.1"))]
        {
            Kernels::blend(Kernels::cmp_lt(self, rhs), rhs, self)
        }
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        Self::from_xmm(mulhi_epi8(self.xmm(), rhs.xmm()))
    }

    #[inline(always)]
    fn abs(self) -> Self {
        #[cfg(target_feature = "ssse3")]
        {
            Self::from_xmm(unsafe { _mm_abs_epi8(self.xmm()) })
        }
        #[cfg(not(target_feature = "ssse3"))]
        unsafe {
            let x = self.xmm();
            let sign = _mm_cmplt_epi8(x, _mm_setzero_si128());
            Self::from_xmm(_mm_sub_epi8(_mm_xor_si128(x, sign), sign))
        }
    }

    #[inline(always)]
    fn popcount(self) -> Self {
        Self::from_xmm(popcount_epi8(self.xmm()))
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        cast(Kernels::countl_zero(cast::<Self, U8x16>(self)))
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        popcount_countr_zero(self)
    }

    #[inline(always)]
    fn rotl(self, s: u32) -> Self {
        cast(Kernels::rotl(cast::<Self, U8x16>(self), s))
    }

    #[inline(always)]
    fn rotr(self, s: u32) -> Self {
        cast(Kernels::rotr(cast::<Self, U8x16>(self), s))
    }
}
