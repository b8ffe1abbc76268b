#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{bias_epi64, cast, count, not, popcount_epi64, select, shuffle_bytes, Ymm};
use crate::simd::kernels::{
    midpoint_from_floor, popcount_countr_zero, smear_bit_ceil, smear_bit_floor,
    smear_countl_zero, Kernels,
};
use crate::simd::mask::Mask64x4;
use crate::simd::vector::{I64x4, U64x4};

const BYTESWAP_64: [i8; 16] = [7, 6, 5, 4, 3, 2, 1, 0, 15, 14, 13, 12, 11, 10, 9, 8];

#[inline(always)]
fn mullo_epi64(a: __m256i, b: __m256i) -> __m256i {
    unsafe {
        let lo = _mm256_mul_epu32(a, b);
        let cross_a = _mm256_mul_epu32(_mm256_srli_epi64(a, 32), b);
        let cross_b = _mm256_mul_epu32(a, _mm256_srli_epi64(b, 32));
        _mm256_add_epi64(lo, _mm256_slli_epi64(_mm256_add_epi64(cross_a, cross_b), 32))
    }
}

#[inline(always)]
fn rotlv_epi64(x: __m256i, counts: __m256i) -> __m256i {
    unsafe {
        let left = _mm256_and_si256(counts, _mm256_set1_epi64x(63));
        let right = _mm256_sub_epi64(_mm256_set1_epi64x(64), left);
        _mm256_or_si256(_mm256_sllv_epi64(x, left), _mm256_srlv_epi64(x, right))
    }
}

macro_rules! common_kernels {
    () => {
        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_add_epi64(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_sub_epi64(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self::from_ymm(mullo_epi64(self.ymm(), rhs.ymm()))
        }

        #[inline(always)]
        fn neg(self) -> Self {
            Self::from_ymm(unsafe { _mm256_sub_epi64(_mm256_setzero_si256(), self.ymm()) })
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
            Self::from_ymm(unsafe { _mm256_sll_epi64(self.ymm(), count(s)) })
        }

        #[inline(always)]
        fn shlv(self, counts: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_sllv_epi64(self.ymm(), counts.ymm()) })
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> Mask64x4 {
            Mask64x4::from_ymm(unsafe { _mm256_cmpeq_epi64(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn blend(m: Mask64x4, a: Self, b: Self) -> Self {
            Self::from_ymm(select(m.ymm(), a.ymm(), b.ymm()))
        }

        #[inline(always)]
        fn broadcast(m: Mask64x4) -> Self {
            cast(m)
        }

        #[inline(always)]
        fn min(self, rhs: Self) -> Self {
            Kernels::blend(Kernels::cmp_lt(self, rhs), self, rhs)
        }

        #[inline(always)]
        fn max(self, rhs: Self) -> Self {
            Kernels::blend(Kernels::cmp_lt(self, rhs), rhs, self)
        }

        #[inline(always)]
        fn popcount(self) -> Self {
            Self::from_ymm(popcount_epi64(self.ymm()))
        }

        #[inline(always)]
        fn countr_zero(self) -> Self {
            popcount_countr_zero(self)
        }

        #[inline(always)]
        fn byteswap(self) -> Self {
            Self::from_ymm(shuffle_bytes(self.ymm(), BYTESWAP_64))
        }

        #[inline(always)]
        fn rotl(self, s: u32) -> Self {
            let s = s % 64;
            if s == 0 {
                return self;
            }
            unsafe {
                let x = self.ymm();
                Self::from_ymm(_mm256_or_si256(
                    _mm256_sll_epi64(x, count(s)),
                    _mm256_srl_epi64(x, count(64 - s)),
                ))
            }
        }

        #[inline(always)]
        fn rotr(self, s: u32) -> Self {
            Kernels::rotl(self, 64 - s % 64)
        }

        #[inline(always)]
        fn rotlv(self, counts: Self) -> Self {
            Self::from_ymm(rotlv_epi64(self.ymm(), counts.ymm()))
        }

        #[inline(always)]
        fn rotrv(self, counts: Self) -> Self {
            Self::from_ymm(rotlv_epi64(self.ymm(), Kernels::neg(counts).ymm()))
        }

        #[inline(always)]
        unsafe fn gather(base: *const Self::Lane, indices: I64x4, n: usize) -> Self {
            let live = n.min(4) as i64;
            unsafe {
                let lanes = _mm256_setr_epi64x(0, 1, 2, 3);
                let mask = _mm256_cmpgt_epi64(_mm256_set1_epi64x(live), lanes);
                Self::from_ymm(_mm256_mask_i64gather_epi64::<8>(
                    _mm256_setzero_si256(),
                    base as *const i64,
                    indices.ymm(),
                    mask,
                ))
            }
        }
    };
}

impl Kernels for U64x4 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_ymm(unsafe { _mm256_srl_epi64(self.ymm(), count(s)) })
    }

    #[inline(always)]
    fn shrv(self, counts: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_srlv_epi64(self.ymm(), counts.ymm()) })
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask64x4 {
        Mask64x4::from_ymm(unsafe {
            _mm256_cmpgt_epi64(bias_epi64(rhs.ymm()), bias_epi64(self.ymm()))
        })
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
}

impl Kernels for I64x4 {
    common_kernels!();

    /// Logical shift with the sign bits or'ed back in.
    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        let s = s.min(63);
        unsafe {
            let x = self.ymm();
            let sign = _mm256_cmpgt_epi64(_mm256_setzero_si256(), x);
            let fill = _mm256_sll_epi64(sign, count(64 - s));
            Self::from_ymm(_mm256_or_si256(_mm256_srl_epi64(x, count(s)), fill))
        }
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask64x4 {
        Mask64x4::from_ymm(unsafe { _mm256_cmpgt_epi64(rhs.ymm(), self.ymm()) })
    }

    #[inline(always)]
    fn abs(self) -> Self {
        unsafe {
            let x = self.ymm();
            let sign = _mm256_cmpgt_epi64(_mm256_setzero_si256(), x);
            Self::from_ymm(_mm256_sub_epi64(_mm256_xor_si256(x, sign), sign))
        }
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        cast(Kernels::countl_zero(cast::<Self, U64x4>(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic_shift_emulation() {
        let v = I64x4::from_array([i64::MIN, -5, 5, i64::MAX]);
        for s in [0u32, 1, 31, 32, 63, 64, 1000] {
            let shifted = Kernels::shr(v, s).to_array();
            for (out, x) in shifted.iter().zip(v.to_array()) {
                assert_eq!(*out, x >> s.min(63), "{x} >> {s}");
            }
        }
    }

    #[test]
    fn test_compare_and_select() {
        let a = U64x4::from_array([0, u64::MAX, 1 << 63, 7]);
        let b = U64x4::from_array([1, 0, (1 << 63) - 1, 7]);
        assert_eq!(
            Kernels::cmp_lt(a, b).to_array(),
            [true, false, false, false]
        );
        assert_eq!(Kernels::max(a, b).to_array(), [1, u64::MAX, 1 << 63, 7]);

        let a = I64x4::from_array([i64::MIN, -1, 0, 3]);
        assert_eq!(Kernels::abs(a).to_array(), [i64::MIN, 1, 0, 3]);
    }
}
