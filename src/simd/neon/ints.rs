use std::arch::aarch64::*;

use super::{
    cast, counts_16, counts_32, counts_64, counts_8, popcount_16, popcount_32, popcount_64, Neon,
};
use crate::scalar::Scalar;
use crate::simd::kernels::{
    midpoint_from_floor, popcount_countr_zero, shift_rotl, shift_rotr, smear_bit_ceil,
    smear_bit_floor, smear_countl_zero, Kernels, Lanes,
};
use crate::simd::mask::{Mask16x8, Mask32x4, Mask64x2, Mask8x16};
use crate::simd::vector::{I16x8, I32x4, I64x2, I8x16, U16x8, U32x4, U64x2, U8x16};

/// Methods every lane width maps to one instruction each.
macro_rules! lane_kernels {
    (
        mask: $mask:ty, bits: $bits:literal,
        add: $add:ident, sub: $sub:ident,
        and: $and:ident, or: $or:ident, xor: $xor:ident,
        shl: $shl:ident, dup: $dup:ident => $count:ty, counts: $counts:ident, neg: $neg:ident,
        eq: $eq:ident, lt: $lt:ident, bsl: $bsl:ident $(,)?
    ) => {
        #[inline(always)]
        fn add(self, rhs: Self) -> Self {
            Self::from_reg(unsafe { $add(self.reg(), rhs.reg()) })
        }

        #[inline(always)]
        fn sub(self, rhs: Self) -> Self {
            Self::from_reg(unsafe { $sub(self.reg(), rhs.reg()) })
        }

        #[inline(always)]
        fn neg(self) -> Self {
            Kernels::sub(Self::default(), self)
        }

        #[inline(always)]
        fn and(self, rhs: Self) -> Self {
            Self::from_reg(unsafe { $and(self.reg(), rhs.reg()) })
        }

        #[inline(always)]
        fn or(self, rhs: Self) -> Self {
            Self::from_reg(unsafe { $or(self.reg(), rhs.reg()) })
        }

        #[inline(always)]
        fn xor(self, rhs: Self) -> Self {
            Self::from_reg(unsafe { $xor(self.reg(), rhs.reg()) })
        }

        #[inline(always)]
        fn not(self) -> Self {
            let ones = <Self as Lanes>::splat(!<Self as Lanes>::Lane::ZERO);
            Kernels::xor(self, ones)
        }

        #[inline(always)]
        fn shl(self, s: u32) -> Self {
            let s = s.min($bits) as $count;
            Self::from_reg(unsafe { $shl(self.reg(), $dup(s)) })
        }

        // negative counts shift right, logically for unsigned registers
        #[inline(always)]
        fn shr(self, s: u32) -> Self {
            let s = s.min($bits) as $count;
            Self::from_reg(unsafe { $shl(self.reg(), $dup(-s)) })
        }

        #[inline(always)]
        fn shlv(self, counts: Self) -> Self {
            Self::from_reg(unsafe { $shl(self.reg(), $counts(counts.bytes())) })
        }

        #[inline(always)]
        fn shrv(self, counts: Self) -> Self {
            Self::from_reg(unsafe { $shl(self.reg(), $neg($counts(counts.bytes()))) })
        }

        #[inline(always)]
        fn cmp_eq(self, rhs: Self) -> $mask {
            <$mask>::from_reg(unsafe { $eq(self.reg(), rhs.reg()) })
        }

        #[inline(always)]
        fn cmp_lt(self, rhs: Self) -> $mask {
            <$mask>::from_reg(unsafe { $lt(self.reg(), rhs.reg()) })
        }

        #[inline(always)]
        fn blend(m: $mask, a: Self, b: Self) -> Self {
            Self::from_reg(unsafe { $bsl(m.reg(), a.reg(), b.reg()) })
        }

        #[inline(always)]
        fn broadcast(m: $mask) -> Self {
            cast(m)
        }
    };
}

/// `mul`, `min`, `max` and `mul_hi` for the widths with native forms.
macro_rules! narrow_kernels {
    (
        mul: $mul:ident, min: $min:ident, max: $max:ident,
        mull: $mull:ident, mull_high: $mull_high:ident, low: $low:ident,
        uzp2: $uzp2:ident, narrow: $narrow:ident $(,)?
    ) => {
        #[inline(always)]
        fn mul(self, rhs: Self) -> Self {
            Self::from_reg(unsafe { $mul(self.reg(), rhs.reg()) })
        }

        #[inline(always)]
        fn min(self, rhs: Self) -> Self {
            Self::from_reg(unsafe { $min(self.reg(), rhs.reg()) })
        }

        #[inline(always)]
        fn max(self, rhs: Self) -> Self {
            Self::from_reg(unsafe { $max(self.reg(), rhs.reg()) })
        }

        // the odd narrow lanes of the wide products are their high halves
        #[inline(always)]
        fn mul_hi(self, rhs: Self) -> Self {
            unsafe {
                let (a, b) = (self.reg(), rhs.reg());
                let lo = $mull($low(a), $low(b));
                let hi = $mull_high(a, b);
                Self::from_reg($uzp2($narrow(lo), $narrow(hi)))
            }
        }
    };
}

/// 64-bit lanes have compares but no `min`/`max`.
macro_rules! wide_kernels {
    () => {
        #[inline(always)]
        fn min(self, rhs: Self) -> Self {
            Kernels::blend(Kernels::cmp_lt(self, rhs), self, rhs)
        }

        #[inline(always)]
        fn max(self, rhs: Self) -> Self {
            Kernels::blend(Kernels::cmp_lt(self, rhs), rhs, self)
        }
    };
}

/// Unsigned lanes: halving adds floor, and the smear kernels apply.
macro_rules! unsigned_kernels {
    (hadd: $hadd:ident) => {
        #[inline(always)]
        fn average(self, rhs: Self) -> Self {
            Self::from_reg(unsafe { $hadd(self.reg(), rhs.reg()) })
        }

        unsigned_kernels!();
    };
    () => {
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
    };
}

/// Signed lanes: halving adds floor, so odd negative sums step back up to
/// truncate toward zero.
macro_rules! signed_kernels {
    (abs: $abs:ident, unsigned: $unsigned:ty $(, hadd: $hadd:ident)?) => {
        #[inline(always)]
        fn abs(self) -> Self {
            Self::from_reg(unsafe { $abs(self.reg()) })
        }

        $(
            #[inline(always)]
            fn average(self, rhs: Self) -> Self {
                let floor = Self::from_reg(unsafe { $hadd(self.reg(), rhs.reg()) });
                let one = <Self as Lanes>::splat(<Self as Lanes>::Lane::ONE);
                let negative = <Self as Kernels>::broadcast(Kernels::cmp_lt(floor, Self::default()));
                let odd = Kernels::and(Kernels::xor(self, rhs), one);
                Kernels::add(floor, Kernels::and(negative, odd))
            }
        )?

        #[inline(always)]
        fn rotl(self, s: u32) -> Self {
            cast(Kernels::rotl(cast::<Self, $unsigned>(self), s))
        }

        #[inline(always)]
        fn rotr(self, s: u32) -> Self {
            cast(Kernels::rotr(cast::<Self, $unsigned>(self), s))
        }
    };
}

// ------------------------------------------------------------------------------------------------
// 8-bit
// ------------------------------------------------------------------------------------------------

impl Kernels for U8x16 {
    lane_kernels!(
        mask: Mask8x16, bits: 8,
        add: vaddq_u8, sub: vsubq_u8,
        and: vandq_u8, or: vorrq_u8, xor: veorq_u8,
        shl: vshlq_u8, dup: vdupq_n_s8 => i8, counts: counts_8, neg: vnegq_s8,
        eq: vceqq_u8, lt: vcltq_u8, bsl: vbslq_u8,
    );
    narrow_kernels!(
        mul: vmulq_u8, min: vminq_u8, max: vmaxq_u8,
        mull: vmull_u8, mull_high: vmull_high_u8, low: vget_low_u8,
        uzp2: vuzp2q_u8, narrow: vreinterpretq_u8_u16,
    );
    unsigned_kernels!(hadd: vhaddq_u8);

    #[inline(always)]
    fn popcount(self) -> Self {
        Self::from_reg(unsafe { vcntq_u8(self.reg()) })
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        Self::from_reg(unsafe { vclzq_u8(self.reg()) })
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        Self::from_reg(unsafe { vclzq_u8(vrbitq_u8(self.reg())) })
    }

    #[inline(always)]
    fn byteswap(self) -> Self {
        self
    }
}

impl Kernels for I8x16 {
    lane_kernels!(
        mask: Mask8x16, bits: 8,
        add: vaddq_s8, sub: vsubq_s8,
        and: vandq_s8, or: vorrq_s8, xor: veorq_s8,
        shl: vshlq_s8, dup: vdupq_n_s8 => i8, counts: counts_8, neg: vnegq_s8,
        eq: vceqq_s8, lt: vcltq_s8, bsl: vbslq_s8,
    );
    narrow_kernels!(
        mul: vmulq_s8, min: vminq_s8, max: vmaxq_s8,
        mull: vmull_s8, mull_high: vmull_high_s8, low: vget_low_s8,
        uzp2: vuzp2q_s8, narrow: vreinterpretq_s8_s16,
    );
    signed_kernels!(abs: vabsq_s8, unsigned: U8x16, hadd: vhaddq_s8);

    #[inline(always)]
    fn popcount(self) -> Self {
        Self::from_bytes(unsafe { vcntq_u8(self.bytes()) })
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        Self::from_reg(unsafe { vclzq_s8(self.reg()) })
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        cast(Kernels::countr_zero(cast::<Self, U8x16>(self)))
    }

    #[inline(always)]
    fn byteswap(self) -> Self {
        self
    }
}

// ------------------------------------------------------------------------------------------------
// 16-bit
// ------------------------------------------------------------------------------------------------

impl Kernels for U16x8 {
    lane_kernels!(
        mask: Mask16x8, bits: 16,
        add: vaddq_u16, sub: vsubq_u16,
        and: vandq_u16, or: vorrq_u16, xor: veorq_u16,
        shl: vshlq_u16, dup: vdupq_n_s16 => i16, counts: counts_16, neg: vnegq_s16,
        eq: vceqq_u16, lt: vcltq_u16, bsl: vbslq_u16,
    );
    narrow_kernels!(
        mul: vmulq_u16, min: vminq_u16, max: vmaxq_u16,
        mull: vmull_u16, mull_high: vmull_high_u16, low: vget_low_u16,
        uzp2: vuzp2q_u16, narrow: vreinterpretq_u16_u32,
    );
    unsigned_kernels!(hadd: vhaddq_u16);

    #[inline(always)]
    fn popcount(self) -> Self {
        Self::from_bytes(popcount_16(self.bytes()))
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        Self::from_reg(unsafe { vclzq_u16(self.reg()) })
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        popcount_countr_zero(self)
    }

    #[inline(always)]
    fn byteswap(self) -> Self {
        Self::from_bytes(unsafe { vrev16q_u8(self.bytes()) })
    }
}

impl Kernels for I16x8 {
    lane_kernels!(
        mask: Mask16x8, bits: 16,
        add: vaddq_s16, sub: vsubq_s16,
        and: vandq_s16, or: vorrq_s16, xor: veorq_s16,
        shl: vshlq_s16, dup: vdupq_n_s16 => i16, counts: counts_16, neg: vnegq_s16,
        eq: vceqq_s16, lt: vcltq_s16, bsl: vbslq_s16,
    );
    narrow_kernels!(
        mul: vmulq_s16, min: vminq_s16, max: vmaxq_s16,
        mull: vmull_s16, mull_high: vmull_high_s16, low: vget_low_s16,
        uzp2: vuzp2q_s16, narrow: vreinterpretq_s16_s32,
    );
    signed_kernels!(abs: vabsq_s16, unsigned: U16x8, hadd: vhaddq_s16);

    #[inline(always)]
    fn popcount(self) -> Self {
        Self::from_bytes(popcount_16(self.bytes()))
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        Self::from_reg(unsafe { vclzq_s16(self.reg()) })
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        popcount_countr_zero(self)
    }

    #[inline(always)]
    fn byteswap(self) -> Self {
        Self::from_bytes(unsafe { vrev16q_u8(self.bytes()) })
    }
}

// ------------------------------------------------------------------------------------------------
// 32-bit
// ------------------------------------------------------------------------------------------------

impl Kernels for U32x4 {
    lane_kernels!(
        mask: Mask32x4, bits: 32,
        add: vaddq_u32, sub: vsubq_u32,
        and: vandq_u32, or: vorrq_u32, xor: veorq_u32,
        shl: vshlq_u32, dup: vdupq_n_s32 => i32, counts: counts_32, neg: vnegq_s32,
        eq: vceqq_u32, lt: vcltq_u32, bsl: vbslq_u32,
    );
    narrow_kernels!(
        mul: vmulq_u32, min: vminq_u32, max: vmaxq_u32,
        mull: vmull_u32, mull_high: vmull_high_u32, low: vget_low_u32,
        uzp2: vuzp2q_u32, narrow: vreinterpretq_u32_u64,
    );
    unsigned_kernels!(hadd: vhaddq_u32);

    #[inline(always)]
    fn popcount(self) -> Self {
        Self::from_bytes(popcount_32(self.bytes()))
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        Self::from_reg(unsafe { vclzq_u32(self.reg()) })
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        popcount_countr_zero(self)
    }

    #[inline(always)]
    fn byteswap(self) -> Self {
        Self::from_bytes(unsafe { vrev32q_u8(self.bytes()) })
    }
}

impl Kernels for I32x4 {
    lane_kernels!(
        mask: Mask32x4, bits: 32,
        add: vaddq_s32, sub: vsubq_s32,
        and: vandq_s32, or: vorrq_s32, xor: veorq_s32,
        shl: vshlq_s32, dup: vdupq_n_s32 => i32, counts: counts_32, neg: vnegq_s32,
        eq: vceqq_s32, lt: vcltq_s32, bsl: vbslq_s32,
    );
    narrow_kernels!(
        mul: vmulq_s32, min: vminq_s32, max: vmaxq_s32,
        mull: vmull_s32, mull_high: vmull_high_s32, low: vget_low_s32,
        uzp2: vuzp2q_s32, narrow: vreinterpretq_s32_s64,
    );
    signed_kernels!(abs: vabsq_s32, unsigned: U32x4, hadd: vhaddq_s32);

    #[inline(always)]
    fn popcount(self) -> Self {
        Self::from_bytes(popcount_32(self.bytes()))
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        Self::from_reg(unsafe { vclzq_s32(self.reg()) })
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        popcount_countr_zero(self)
    }

    #[inline(always)]
    fn byteswap(self) -> Self {
        Self::from_bytes(unsafe { vrev32q_u8(self.bytes()) })
    }
}

// ------------------------------------------------------------------------------------------------
// 64-bit
// ------------------------------------------------------------------------------------------------

impl Kernels for U64x2 {
    lane_kernels!(
        mask: Mask64x2, bits: 64,
        add: vaddq_u64, sub: vsubq_u64,
        and: vandq_u64, or: vorrq_u64, xor: veorq_u64,
        shl: vshlq_u64, dup: vdupq_n_s64 => i64, counts: counts_64, neg: vnegq_s64,
        eq: vceqq_u64, lt: vcltq_u64, bsl: vbslq_u64,
    );
    wide_kernels!();
    unsigned_kernels!();

    // (a & b) + ((a ^ b) >> 1)
    #[inline(always)]
    fn average(self, rhs: Self) -> Self {
        let shared = Kernels::and(self, rhs);
        Kernels::add(shared, Kernels::shr(Kernels::xor(self, rhs), 1))
    }

    #[inline(always)]
    fn popcount(self) -> Self {
        Self::from_bytes(popcount_64(self.bytes()))
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        smear_countl_zero(self)
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        popcount_countr_zero(self)
    }

    #[inline(always)]
    fn byteswap(self) -> Self {
        Self::from_bytes(unsafe { vrev64q_u8(self.bytes()) })
    }
}

impl Kernels for I64x2 {
    lane_kernels!(
        mask: Mask64x2, bits: 64,
        add: vaddq_s64, sub: vsubq_s64,
        and: vandq_s64, or: vorrq_s64, xor: veorq_s64,
        shl: vshlq_s64, dup: vdupq_n_s64 => i64, counts: counts_64, neg: vnegq_s64,
        eq: vceqq_s64, lt: vcltq_s64, bsl: vbslq_s64,
    );
    wide_kernels!();
    signed_kernels!(abs: vabsq_s64, unsigned: U64x2);

    #[inline(always)]
    fn popcount(self) -> Self {
        Self::from_bytes(popcount_64(self.bytes()))
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        cast(Kernels::countl_zero(cast::<Self, U64x2>(self)))
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        popcount_countr_zero(self)
    }

    #[inline(always)]
    fn byteswap(self) -> Self {
        Self::from_bytes(unsafe { vrev64q_u8(self.bytes()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_shifts_saturate() {
        let v = U8x16::splat(0x81);
        assert_eq!(Kernels::shr(v, 8), U8x16::default());
        assert_eq!(Kernels::shl(v, 300), U8x16::default());
        assert_eq!(Kernels::shr(I16x8::splat(-3), 40), I16x8::splat(-1));

        let counts = U32x4::from_array([0, 1, 32, 257]);
        let out = Kernels::shlv(U32x4::splat(1), counts).to_array();
        assert_eq!(out, [1, 2, 0, 0]);
    }

    #[test]
    fn test_signed_average_truncates() {
        let a = I32x4::from_array([-3, 3, -4, i32::MIN]);
        let b = I32x4::from_array([0, 0, 1, i32::MIN + 1]);
        assert_eq!(
            Kernels::average(a, b).to_array(),
            [-1, 1, -1, i32::MIN + 1]
        );
    }

    #[test]
    fn test_mul_hi_and_bit_counts() {
        let a = U16x8::from_array([0xFFFF, 0x8000, 3, 0, 1, 2, 0x1234, 0xFF00]);
        let b = U16x8::splat(0xFFFF);
        let hi = Kernels::mul_hi(a, b).to_array();
        for (out, x) in hi.iter().zip(a.to_array()) {
            assert_eq!(*out, ((u32::from(x) * 0xFFFF) >> 16) as u16);
        }

        let v = U8x16::from_array([0, 1, 2, 4, 8, 16, 32, 64, 128, 3, 6, 12, 0xF0, 0xFF, 0x80, 0x81]);
        let tz = Kernels::countr_zero(v).to_array();
        for (out, x) in tz.iter().zip(v.to_array()) {
            assert_eq!(u32::from(*out), x.trailing_zeros());
        }
    }
}
