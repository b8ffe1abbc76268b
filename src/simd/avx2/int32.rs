#[cfg(target_arch = "x86")]
use std::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

use super::{cast, count, not, popcount_epi32, select, shuffle_bytes, Ymm};
use crate::simd::kernels::{
    midpoint_from_floor, popcount_countr_zero, smear_bit_ceil, smear_bit_floor, Kernels,
};
use crate::simd::mask::Mask32x8;
use crate::simd::vector::{I32x8, U32x8};

const BYTESWAP_32: [i8; 16] = [3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, 15, 14, 13, 12];

/// Interleaves the high halves of the even and odd 64-bit products.
#[inline(always)]
fn high_halves(even: __m256i, odd: __m256i) -> __m256i {
    unsafe {
        _mm256_blend_epi32::<0b1010_1010>(_mm256_srli_epi64(even, 32), odd)
    }
}

/// See the SSE version for the derivation.
#[inline(always)]
fn countl_zero_epi32(x: __m256i) -> __m256i {
    unsafe {
        let x = _mm256_andnot_si256(_mm256_srli_epi32(x, 1), x);
        let f = _mm256_add_ps(_mm256_cvtepi32_ps(x), _mm256_set1_ps(0.5));
        let exponent = _mm256_srli_epi32(_mm256_castps_si256(f), 23);
        _mm256_subs_epu16(_mm256_set1_epi32(158), exponent)
    }
}

/// Rotates by per-lane counts modulo 32.
#[inline(always)]
fn rotlv_epi32(x: __m256i, counts: __m256i) -> __m256i {
    unsafe {
        let left = _mm256_and_si256(counts, _mm256_set1_epi32(31));
        let right = _mm256_sub_epi32(_mm256_set1_epi32(32), left);
        _mm256_or_si256(_mm256_sllv_epi32(x, left), _mm256_srlv_epi32(x, right))
    }
}

macro_rules! common_kernels {
    () => {
        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_add_epi32(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_sub_epi32(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_mullo_epi32(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn neg(self) -> Self {
            Self::from_ymm(unsafe { _mm256_sub_epi32(_mm256_setzero_si256(), self.ymm()) })
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
            Self::from_ymm(unsafe { _mm256_sll_epi32(self.ymm(), count(s)) })
        }

        #[inline(always)]
        fn shlv(self, counts: Self) -> Self {
            Self::from_ymm(unsafe { _mm256_sllv_epi32(self.ymm(), counts.ymm()) })
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> Mask32x8 {
            Mask32x8::from_ymm(unsafe { _mm256_cmpeq_epi32(self.ymm(), rhs.ymm()) })
        }

        #[inline(always)]
        fn blend(m: Mask32x8, a: Self, b: Self) -> Self {
            Self::from_ymm(select(m.ymm(), a.ymm(), b.ymm()))
        }

        #[inline(always)]
        fn broadcast(m: Mask32x8) -> Self {
            cast(m)
        }

        #[inline(always)]
        fn popcount(self) -> Self {
            Self::from_ymm(popcount_epi32(self.ymm()))
        }

        #[inline(always)]
        fn countl_zero(self) -> Self {
            Self::from_ymm(countl_zero_epi32(self.ymm()))
        }

        #[inline(always)]
        fn countr_zero(self) -> Self {
            popcount_countr_zero(self)
        }

        #[inline(always)]
        fn byteswap(self) -> Self {
            Self::from_ymm(shuffle_bytes(self.ymm(), BYTESWAP_32))
        }

        #[inline(always)]
        fn rotl(self, s: u32) -> Self {
            let s = s % 32;
            if s == 0 {
                return self;
            }
            unsafe {
                let x = self.ymm();
                Self::from_ymm(_mm256_or_si256(
                    _mm256_sll_epi32(x, count(s)),
                    _mm256_srl_epi32(x, count(32 - s)),
                ))
            }
        }

        #[inline(always)]
        fn rotr(self, s: u32) -> Self {
            Kernels::rotl(self, 32 - s % 32)
        }

        #[inline(always)]
        fn rotlv(self, counts: Self) -> Self {
            Self::from_ymm(rotlv_epi32(self.ymm(), counts.ymm()))
        }

        #[inline(always)]
        fn rotrv(self, counts: Self) -> Self {
            Self::from_ymm(rotlv_epi32(self.ymm(), Kernels::neg(counts).ymm()))
        }

        #[inline(always)]
        unsafe fn gather(base: *const Self::Lane, indices: I32x8, n: usize) -> Self {
            let live = n.min(8) as i32;
            unsafe {
                let lanes = _mm256_setr_epi32(0, 1, 2, 3, 4, 5, 6, 7);
                let mask = _mm256_cmpgt_epi32(_mm256_set1_epi32(live), lanes);
                Self::from_ymm(_mm256_mask_i32gather_epi32::<4>(
                    _mm256_setzero_si256(),
                    base as *const i32,
                    indices.ymm(),
                    mask,
                ))
            }
        }
    };
}

impl Kernels for U32x8 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_ymm(unsafe { _mm256_srl_epi32(self.ymm(), count(s)) })
    }

    #[inline(always)]
    fn shrv(self, counts: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_srlv_epi32(self.ymm(), counts.ymm()) })
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask32x8 {
        let max = Kernels::max(self, rhs);
        !Kernels::cmp_eq(max, self)
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_min_epu32(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_max_epu32(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        unsafe {
            let (a, b) = (self.ymm(), rhs.ymm());
            let even = _mm256_mul_epu32(a, b);
            let odd = _mm256_mul_epu32(_mm256_srli_epi64(a, 32), _mm256_srli_epi64(b, 32));
            Self::from_ymm(high_halves(even, odd))
        }
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
    fn bit_floor(self) -> Self {
        smear_bit_floor(self)
    }

    #[inline(always)]
    fn bit_ceil(self) -> Self {
        smear_bit_ceil(self)
    }
}

impl Kernels for I32x8 {
    common_kernels!();

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        Self::from_ymm(unsafe { _mm256_sra_epi32(self.ymm(), count(s)) })
    }

    #[inline(always)]
    fn shrv(self, counts: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_srav_epi32(self.ymm(), counts.ymm()) })
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Mask32x8 {
        Mask32x8::from_ymm(unsafe { _mm256_cmpgt_epi32(rhs.ymm(), self.ymm()) })
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_min_epi32(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        Self::from_ymm(unsafe { _mm256_max_epi32(self.ymm(), rhs.ymm()) })
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        unsafe {
            let (a, b) = (self.ymm(), rhs.ymm());
            let even = _mm256_mul_epi32(a, b);
            let odd = _mm256_mul_epi32(_mm256_srli_epi64(a, 32), _mm256_srli_epi64(b, 32));
            Self::from_ymm(high_halves(even, odd))
        }
    }

    #[inline(always)]
    fn abs(self) -> Self {
        Self::from_ymm(unsafe { _mm256_abs_epi32(self.ymm()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_rotates() {
        let v = U32x8::splat(0x8000_0001);
        let counts = U32x8::from_array([0, 1, 31, 32, 33, 64, 4, u32::MAX]);
        let left = Kernels::rotlv(v, counts).to_array();
        let right = Kernels::rotrv(v, counts).to_array();
        for (i, &s) in counts.to_array().iter().enumerate() {
            assert_eq!(left[i], 0x8000_0001u32.rotate_left(s % 32));
            assert_eq!(right[i], 0x8000_0001u32.rotate_right(s % 32));
        }
    }

    #[test]
    fn test_signed_mul_hi() {
        let a = I32x8::from_array([i32::MIN, i32::MAX, -1, 0, 1, -7, 1 << 20, -(1 << 20)]);
        let b = I32x8::from_array([i32::MIN, i32::MAX, -1, 5, -1, 9, 1 << 20, 1 << 20]);
        let hi = Kernels::mul_hi(a, b).to_array();
        for i in 0..8 {
            let wide = i64::from(a.to_array()[i]) * i64::from(b.to_array()[i]);
            assert_eq!(hi[i], (wide >> 32) as i32);
        }
    }

    #[test]
    fn test_masked_gather() {
        let data: Vec<u32> = (0..64).map(|x| x * 3).collect();
        let indices = I32x8::from_array([63, 0, 5, 7, 1, 2, 3, 4]);
        let v = unsafe { <U32x8 as Kernels>::gather(data.as_ptr(), indices, 3) };
        assert_eq!(v.to_array(), [189, 0, 15, 0, 0, 0, 0, 0]);
    }
}
