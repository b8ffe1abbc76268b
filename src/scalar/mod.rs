//! Scalar integer kernels.
//!
//! Every vector lane operation in this crate bottoms out in one of the traits
//! defined here, so the scalar functions double as the reference the vector
//! kernels are tested against.
//!
//! Bit-manipulation functions use the native instruction when the build enables
//! one (`bitscan`, `hw_popcnt`) and the portable kernels in [`bits`] otherwise.

pub mod bits;

use std::fmt::Debug;

use num::traits::{WrappingAdd, WrappingMul, WrappingSub};
use num::PrimInt;

mod sealed {
    pub trait Sealed {}
}

/// Integer type usable as a vector lane.
pub trait Scalar:
    sealed::Sealed
    + PrimInt
    + WrappingAdd
    + WrappingSub
    + WrappingMul
    + Bits
    + Debug
    + Default
    + Send
    + Sync
    + 'static
{
    /// Unsigned type with the same width.
    type Unsigned: Scalar + UnsignedBits;
    /// Signed type with the same width.
    type Signed: Scalar + SignedScalar;

    const BITS: u32;
    const ZERO: Self;
    const ONE: Self;
    const MAX: Self;
    const MIN: Self;
    const SIGNED: bool;

    /// Two's complement negation.
    fn negated(self) -> Self;

    /// Left shift where counts at or above `BITS` produce zero.
    fn shift_left(self, n: u32) -> Self;

    /// Right shift where counts at or above `BITS` produce zero, or the sign
    /// fill for signed types.
    fn shift_right(self, n: u32) -> Self;

    /// Reads the lane as a shift count. Negative values read as huge counts.
    fn shift_amount(self) -> u32;

    /// Upper half of the double-width product.
    fn mul_hi(self, rhs: Self) -> Self;

    /// `floor((a + b) / 2)` for unsigned types, `(a + b) / 2` truncated for
    /// signed types. Never overflows.
    fn average(self, rhs: Self) -> Self;

    /// Midpoint of `self` and `rhs`, rounded toward `self`.
    fn midpoint(self, rhs: Self) -> Self;

    /// Truncating division where `MIN / -1` wraps to `MIN`.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is zero.
    fn wrapping_div(self, rhs: Self) -> Self;

    /// Remainder matching [`Scalar::wrapping_div`]; `MIN % -1` is 0.
    ///
    /// # Panics
    ///
    /// Panics if `rhs` is zero.
    fn wrapping_rem(self, rhs: Self) -> Self;

    /// `-|x|`, which is always representable.
    fn neg_abs(self) -> Self::Signed;

    fn to_unsigned(self) -> Self::Unsigned;
    fn from_unsigned(x: Self::Unsigned) -> Self;

    /// Bit pattern zero-extended to 64 bits.
    fn to_u64_bits(self) -> u64;
    /// Truncating inverse of [`Scalar::to_u64_bits`].
    fn from_u64_bits(bits: u64) -> Self;
}

/// Bit-manipulation functions. Signed types operate on their bit pattern.
pub trait Bits: Copy {
    fn popcount(self) -> Self;
    fn byteswap(self) -> Self;
    fn countl_zero(self) -> Self;
    fn countl_one(self) -> Self;
    fn countr_zero(self) -> Self;
    fn countr_one(self) -> Self;
    fn bit_width(self) -> Self;
    fn has_single_bit(self) -> bool;

    /// Rotates left by `s mod BITS`.
    fn rotl(self, s: u32) -> Self;

    /// Rotates right by `s mod BITS`.
    fn rotr(self, s: u32) -> Self;
}

/// Power-of-two rounding, only meaningful for unsigned types.
pub trait UnsignedBits: Bits {
    /// Largest power of two not greater than `self`, 0 for 0.
    fn bit_floor(self) -> Self;

    /// Smallest power of two not less than `self`, 1 for 0, and 0 when that
    /// power does not fit.
    fn bit_ceil(self) -> Self;
}

pub trait SignedScalar: Scalar {
    /// Absolute value where `MIN` maps to itself.
    fn wrapping_abs(self) -> Self;
}

macro_rules! impl_unsigned_bits {
    ($($t:ty),*) => {$(
        impl Bits for $t {
            #[inline(always)]
            fn popcount(self) -> Self {
                #[cfg(hw_popcnt)]
                {
                    self.count_ones() as $t
                }
                #[cfg(not(hw_popcnt))]
                {
                    bits::popcount(self) as $t
                }
            }

            #[inline(always)]
            fn byteswap(self) -> Self {
                #[cfg(bitscan)]
                {
                    self.swap_bytes()
                }
                #[cfg(not(bitscan))]
                {
                    bits::byteswap(self)
                }
            }

            #[inline(always)]
            fn countl_zero(self) -> Self {
                #[cfg(bitscan)]
                {
                    self.leading_zeros() as $t
                }
                #[cfg(not(bitscan))]
                {
                    bits::countl_zero(self) as $t
                }
            }

            #[inline(always)]
            fn countl_one(self) -> Self {
                #[cfg(bitscan)]
                {
                    self.leading_ones() as $t
                }
                #[cfg(not(bitscan))]
                {
                    bits::countl_one(self) as $t
                }
            }

            #[inline(always)]
            fn countr_zero(self) -> Self {
                #[cfg(bitscan)]
                {
                    self.trailing_zeros() as $t
                }
                #[cfg(not(bitscan))]
                {
                    bits::countr_zero(self) as $t
                }
            }

            #[inline(always)]
            fn countr_one(self) -> Self {
                #[cfg(bitscan)]
                {
                    self.trailing_ones() as $t
                }
                #[cfg(not(bitscan))]
                {
                    bits::countr_one(self) as $t
                }
            }

            #[inline(always)]
            fn bit_width(self) -> Self {
                #[cfg(bitscan)]
                {
                    (<$t>::BITS - self.leading_zeros()) as $t
                }
                #[cfg(not(bitscan))]
                {
                    bits::bit_width(self) as $t
                }
            }

            #[inline(always)]
            fn has_single_bit(self) -> bool {
                bits::has_single_bit(self)
            }

            #[inline(always)]
            fn rotl(self, s: u32) -> Self {
                #[cfg(bitscan)]
                {
                    self.rotate_left(s % <$t>::BITS)
                }
                #[cfg(not(bitscan))]
                {
                    bits::rotl(self, s)
                }
            }

            #[inline(always)]
            fn rotr(self, s: u32) -> Self {
                #[cfg(bitscan)]
                {
                    self.rotate_right(s % <$t>::BITS)
                }
                #[cfg(not(bitscan))]
                {
                    bits::rotr(self, s)
                }
            }
        }

        impl UnsignedBits for $t {
            #[inline(always)]
            fn bit_floor(self) -> Self {
                #[cfg(bitscan)]
                {
                    if self == 0 {
                        0
                    } else {
                        1 << (<$t>::BITS - 1 - self.leading_zeros())
                    }
                }
                #[cfg(not(bitscan))]
                {
                    bits::bit_floor(self)
                }
            }

            #[inline(always)]
            fn bit_ceil(self) -> Self {
                #[cfg(bitscan)]
                {
                    self.checked_next_power_of_two().unwrap_or(0)
                }
                #[cfg(not(bitscan))]
                {
                    bits::bit_ceil(self)
                }
            }
        }
    )*};
}

impl_unsigned_bits!(u8, u16, u32, u64);

macro_rules! impl_signed_bits {
    ($($t:ty => $u:ty),*) => {$(
        impl Bits for $t {
            #[inline(always)]
            fn popcount(self) -> Self {
                (self as $u).popcount() as $t
            }

            #[inline(always)]
            fn byteswap(self) -> Self {
                (self as $u).byteswap() as $t
            }

            #[inline(always)]
            fn countl_zero(self) -> Self {
                (self as $u).countl_zero() as $t
            }

            #[inline(always)]
            fn countl_one(self) -> Self {
                (self as $u).countl_one() as $t
            }

            #[inline(always)]
            fn countr_zero(self) -> Self {
                (self as $u).countr_zero() as $t
            }

            #[inline(always)]
            fn countr_one(self) -> Self {
                (self as $u).countr_one() as $t
            }

            #[inline(always)]
            fn bit_width(self) -> Self {
                Bits::bit_width(self as $u) as $t
            }

            #[inline(always)]
            fn has_single_bit(self) -> bool {
                (self as $u).has_single_bit()
            }

            #[inline(always)]
            fn rotl(self, s: u32) -> Self {
                (self as $u).rotl(s) as $t
            }

            #[inline(always)]
            fn rotr(self, s: u32) -> Self {
                (self as $u).rotr(s) as $t
            }
        }
    )*};
}

impl_signed_bits!(i8 => u8, i16 => u16, i32 => u32, i64 => u64);

macro_rules! impl_scalar {
    ($($t:ty: unsigned $u:ty, signed $s:ty, wide $w:ty, $signed:expr);* $(;)?) => {$(
        impl sealed::Sealed for $t {}

        impl Scalar for $t {
            type Unsigned = $u;
            type Signed = $s;

            const BITS: u32 = <$t>::BITS;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MAX: Self = <$t>::MAX;
            const MIN: Self = <$t>::MIN;
            const SIGNED: bool = $signed;

            #[inline(always)]
            fn negated(self) -> Self {
                self.wrapping_neg()
            }

            #[inline(always)]
            fn shift_left(self, n: u32) -> Self {
                self.checked_shl(n).unwrap_or(0)
            }

            #[inline(always)]
            fn shift_right(self, n: u32) -> Self {
                match self.checked_shr(n) {
                    Some(shifted) => shifted,
                    // sign fill, a no-op for unsigned types
                    None => self >> (<$t>::BITS - 1) >> 1,
                }
            }

            #[inline(always)]
            fn shift_amount(self) -> u32 {
                self.to_u64_bits().min(u64::from(u32::MAX)) as u32
            }

            #[inline(always)]
            fn mul_hi(self, rhs: Self) -> Self {
                ((self as $w * rhs as $w) >> <$t>::BITS) as $t
            }

            #[inline(always)]
            fn average(self, rhs: Self) -> Self {
                ((self as $w + rhs as $w) / 2) as $t
            }

            #[inline(always)]
            fn midpoint(self, rhs: Self) -> Self {
                let floor_average = ((self as $w + rhs as $w) >> 1) as $t;
                let bias = ((rhs < self) as $t) & (self ^ rhs) & 1;
                floor_average.wrapping_add(bias)
            }

            #[inline(always)]
            fn wrapping_div(self, rhs: Self) -> Self {
                <$t>::wrapping_div(self, rhs)
            }

            #[inline(always)]
            fn wrapping_rem(self, rhs: Self) -> Self {
                <$t>::wrapping_rem(self, rhs)
            }

            #[inline(always)]
            fn neg_abs(self) -> $s {
                let y = self as $s;
                if y < 0 {
                    y
                } else {
                    y.wrapping_neg()
                }
            }

            #[inline(always)]
            fn to_unsigned(self) -> $u {
                self as $u
            }

            #[inline(always)]
            fn from_unsigned(x: $u) -> Self {
                x as $t
            }

            #[inline(always)]
            fn to_u64_bits(self) -> u64 {
                self as $u as u64
            }

            #[inline(always)]
            fn from_u64_bits(bits: u64) -> Self {
                bits as $t
            }
        }
    )*};
}

impl_scalar! {
    u8: unsigned u8, signed i8, wide u16, false;
    u16: unsigned u16, signed i16, wide u32, false;
    u32: unsigned u32, signed i32, wide u64, false;
    u64: unsigned u64, signed i64, wide u128, false;
    i8: unsigned u8, signed i8, wide i16, true;
    i16: unsigned u16, signed i16, wide i32, true;
    i32: unsigned u32, signed i32, wide i64, true;
    i64: unsigned u64, signed i64, wide i128, true;
}

macro_rules! impl_signed_scalar {
    ($($t:ty),*) => {$(
        impl SignedScalar for $t {
            #[inline(always)]
            fn wrapping_abs(self) -> Self {
                <$t>::wrapping_abs(self)
            }
        }
    )*};
}

impl_signed_scalar!(i8, i16, i32, i64);

// ------------------------------------------------------------------------------------------------
// General functions
// ------------------------------------------------------------------------------------------------

/// Quotient and remainder of a division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct DivResult<T> {
    pub quot: T,
    pub rem: T,
}

/// Truncating division with remainder. `MIN / -1` wraps with remainder 0.
///
/// # Panics
///
/// Panics if `y` is zero.
#[inline(always)]
pub fn div<T: Scalar>(x: T, y: T) -> DivResult<T> {
    DivResult {
        quot: Scalar::wrapping_div(x, y),
        rem: Scalar::wrapping_rem(x, y),
    }
}

#[inline(always)]
pub fn min<T: Scalar>(a: T, b: T) -> T {
    if b < a {
        b
    } else {
        a
    }
}

#[inline(always)]
pub fn max<T: Scalar>(a: T, b: T) -> T {
    if a < b {
        b
    } else {
        a
    }
}

/// Returns `[min, max]`.
#[inline(always)]
pub fn minmax<T: Scalar>(a: T, b: T) -> [T; 2] {
    if a < b {
        [a, b]
    } else {
        [b, a]
    }
}

/// `min(max(x, lo), hi)`. Unlike [`Ord::clamp`] this never panics when `lo > hi`.
#[inline(always)]
pub fn clamp<T: Scalar>(x: T, lo: T, hi: T) -> T {
    min(max(x, lo), hi)
}

#[inline(always)]
pub fn keep<T: Scalar>(m: bool, x: T) -> T {
    if m {
        x
    } else {
        T::ZERO
    }
}

#[inline(always)]
pub fn clear<T: Scalar>(m: bool, x: T) -> T {
    if m {
        T::ZERO
    } else {
        x
    }
}

/// `a` where `m` is set, `b` otherwise.
#[inline(always)]
pub fn blend<T: Scalar>(m: bool, a: T, b: T) -> T {
    if m {
        a
    } else {
        b
    }
}

#[inline(always)]
pub fn average<T: Scalar>(a: T, b: T) -> T {
    a.average(b)
}

#[inline(always)]
pub fn midpoint<T: Scalar>(a: T, b: T) -> T {
    Scalar::midpoint(a, b)
}

#[inline(always)]
pub fn neg_abs<T: Scalar>(x: T) -> T::Signed {
    x.neg_abs()
}

#[inline(always)]
pub fn abs<T: SignedScalar>(x: T) -> T {
    x.wrapping_abs()
}

/// Negates `x` when `m` is set.
#[inline(always)]
pub fn negate<T: SignedScalar>(m: bool, x: T) -> T {
    let mask = if m { T::ONE.negated() } else { T::ZERO };
    (x ^ mask).wrapping_sub(&mask)
}

// ------------------------------------------------------------------------------------------------
// Mixed-signedness comparisons
// ------------------------------------------------------------------------------------------------

#[inline(always)]
pub fn cmp_equal<A: Into<i128>, B: Into<i128>>(a: A, b: B) -> bool {
    a.into() == b.into()
}

#[inline(always)]
pub fn cmp_not_equal<A: Into<i128>, B: Into<i128>>(a: A, b: B) -> bool {
    a.into() != b.into()
}

#[inline(always)]
pub fn cmp_less<A: Into<i128>, B: Into<i128>>(a: A, b: B) -> bool {
    a.into() < b.into()
}

#[inline(always)]
pub fn cmp_less_equal<A: Into<i128>, B: Into<i128>>(a: A, b: B) -> bool {
    a.into() <= b.into()
}

#[inline(always)]
pub fn cmp_greater<A: Into<i128>, B: Into<i128>>(a: A, b: B) -> bool {
    a.into() > b.into()
}

#[inline(always)]
pub fn cmp_greater_equal<A: Into<i128>, B: Into<i128>>(a: A, b: B) -> bool {
    a.into() >= b.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod bit_functions {
        use super::*;

        #[test]
        fn test_counts_match_std() {
            for x in [0u32, 1, 2, 7, 0x8000_0000, u32::MAX, 0xF0F0_0F0F] {
                assert_eq!(x.popcount(), x.count_ones());
                assert_eq!(x.countl_zero(), x.leading_zeros());
                assert_eq!(x.countl_one(), x.leading_ones());
                assert_eq!(x.countr_zero(), x.trailing_zeros());
                assert_eq!(x.countr_one(), x.trailing_ones());
                assert_eq!(Bits::bit_width(x), 32 - x.leading_zeros());
            }
        }

        #[test]
        fn test_signed_reinterprets() {
            assert_eq!((-1i8).popcount(), 8);
            assert_eq!((-1i16).countl_one(), 16);
            assert_eq!(i32::MIN.countr_zero(), 31);
            assert_eq!((-2i64).countr_zero(), 1);
            assert_eq!(Bits::bit_width(-1i32), 32);
            assert_eq!(0x0102i16.byteswap(), 0x0201);
            assert!(i8::MIN.has_single_bit());
            assert!(!(-1i8).has_single_bit());
        }

        #[test]
        fn test_rotates_reduce_count() {
            assert_eq!(0x81u8.rotl(1), 0x03);
            assert_eq!(0x81u8.rotl(9), 0x03);
            assert_eq!(0x81u8.rotr(1), 0xC0);
            assert_eq!(0x1234u16.rotl(0), 0x1234);
            assert_eq!(0x1234u16.rotl(16), 0x1234);
            assert_eq!((-2i32).rotr(1), i32::MAX);
        }

        #[test]
        fn test_bit_floor_and_ceil() {
            assert_eq!(0u8.bit_floor(), 0);
            assert_eq!(0u8.bit_ceil(), 1);
            assert_eq!(1u16.bit_ceil(), 1);
            assert_eq!(5u32.bit_floor(), 4);
            assert_eq!(5u32.bit_ceil(), 8);
            assert_eq!(0x81u8.bit_ceil(), 0);
            assert_eq!(0x80u8.bit_ceil(), 0x80);
            assert_eq!(u64::MAX.bit_floor(), 1 << 63);
        }
    }

    mod arithmetic {
        use super::*;

        #[test]
        fn test_shifts_saturate() {
            assert_eq!(1u8.shift_left(7), 0x80);
            assert_eq!(1u8.shift_left(8), 0);
            assert_eq!(0xFFu8.shift_right(8), 0);
            assert_eq!((-8i16).shift_right(2), -2);
            assert_eq!((-8i16).shift_right(16), -1);
            assert_eq!(8i16.shift_right(100), 0);
            assert_eq!((-1i32).shift_left(32), 0);
        }

        #[test]
        fn test_shift_amount() {
            assert_eq!(3u8.shift_amount(), 3);
            assert_eq!((-1i8).shift_amount(), 255);
            assert_eq!(u64::MAX.shift_amount(), u32::MAX);
        }

        #[test]
        fn test_mul_hi() {
            assert_eq!(0xFFu8.mul_hi(0xFF), 0xFE);
            assert_eq!(u32::MAX.mul_hi(2), 1);
            assert_eq!((-1i16).mul_hi(1), -1);
            assert_eq!(i64::MIN.mul_hi(i64::MIN), 1 << 62);
        }

        #[test]
        fn test_average() {
            assert_eq!(255u8.average(254), 254);
            assert_eq!(Scalar::average(3u32, 4), 3);
            assert_eq!((-3i8).average(0), -1);
            assert_eq!(i8::MIN.average(i8::MAX), 0);
            assert_eq!(i32::MAX.average(i32::MAX), i32::MAX);
        }

        #[test]
        fn test_midpoint_rounds_toward_first() {
            assert_eq!(Scalar::midpoint(3u8, 0), 2);
            assert_eq!(Scalar::midpoint(0u8, 3), 1);
            assert_eq!(Scalar::midpoint(-3i32, 0), -2);
            assert_eq!(Scalar::midpoint(0i32, -3), -1);
            assert_eq!(Scalar::midpoint(u64::MAX, 0), 1 << 63);
        }

        #[test]
        fn test_div_wraps() {
            assert_eq!(div(7u8, 2), DivResult { quot: 3, rem: 1 });
            assert_eq!(div(-7i32, 2), DivResult { quot: -3, rem: -1 });
            assert_eq!(div(7i16, -2), DivResult { quot: -3, rem: 1 });
            assert_eq!(div(i64::MIN, -1), DivResult { quot: i64::MIN, rem: 0 });
        }

        #[test]
        #[should_panic(expected = "divide by zero")]
        fn test_div_by_zero_panics() {
            div(1u32, 0);
        }

        #[test]
        fn test_neg_abs() {
            assert_eq!(5u8.neg_abs(), -5i8);
            assert_eq!(200u8.neg_abs(), -56i8);
            assert_eq!(0x80u8.neg_abs(), i8::MIN);
            assert_eq!(i32::MIN.neg_abs(), i32::MIN);
            assert_eq!(7i32.neg_abs(), -7);
        }

        #[test]
        fn test_bit_casts() {
            assert_eq!((-1i16).to_u64_bits(), 0xFFFF);
            assert_eq!(i16::from_u64_bits(0x1_8000), i16::MIN);
            assert_eq!((-1i8).to_unsigned(), 0xFF);
            assert_eq!(i8::from_unsigned(0x80), i8::MIN);
        }
    }

    mod general {
        use super::*;

        #[test]
        fn test_min_max_clamp() {
            assert_eq!(min(3i8, -4), -4);
            assert_eq!(max(3u16, 9), 9);
            assert_eq!(minmax(9u32, 3), [3, 9]);
            assert_eq!(minmax(-1i64, 3), [-1, 3]);
            assert_eq!(clamp(10u8, 2, 5), 5);
            assert_eq!(clamp(0i16, 2, 5), 2);
            assert_eq!(clamp(3i16, 2, 5), 3);
        }

        #[test]
        fn test_masking() {
            assert_eq!(keep(true, 5u8), 5);
            assert_eq!(keep(false, 5u8), 0);
            assert_eq!(clear(true, 5i32), 0);
            assert_eq!(clear(false, 5i32), 5);
            assert_eq!(blend(true, 1u64, 2), 1);
            assert_eq!(blend(false, 1u64, 2), 2);
        }

        #[test]
        fn test_abs_and_negate() {
            assert_eq!(abs(-5i8), 5);
            assert_eq!(abs(i8::MIN), i8::MIN);
            assert_eq!(negate(true, 5i32), -5);
            assert_eq!(negate(false, 5i32), 5);
            assert_eq!(negate(true, i16::MIN), i16::MIN);
        }

        #[test]
        fn test_mixed_sign_comparisons() {
            assert!(cmp_less(-1i32, 0u32));
            assert!(!cmp_less(u64::MAX, -1i64));
            assert!(cmp_greater(u64::MAX, i64::MAX));
            assert!(cmp_equal(255u8, 255i16));
            assert!(cmp_not_equal(-1i8, 255u8));
            assert!(cmp_less_equal(-128i8, 0u8));
            assert!(cmp_greater_equal(0u8, -1i64));
        }
    }
}
