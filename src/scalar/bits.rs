//! Portable bit-manipulation kernels.
//!
//! These are the software fallbacks used when the target has no native
//! instruction for an operation. They are written once, generically over the
//! unsigned word types, and are always compiled so they can be checked against
//! the standard library on every platform.
//!
//! All kernels operate on unsigned words; signed callers reinterpret first.

use num::traits::{WrappingAdd, WrappingMul, WrappingNeg, WrappingSub};
use num::PrimInt;

/// Unsigned machine word the portable kernels operate on.
pub trait Word: PrimInt + WrappingAdd + WrappingSub + WrappingMul + WrappingNeg {}

impl Word for u8 {}
impl Word for u16 {}
impl Word for u32 {}
impl Word for u64 {}

#[inline(always)]
fn bits<T: Word>() -> usize {
    std::mem::size_of::<T>() * 8
}

/// `MAX / (2^(2^k) + 1)`: the repeating patterns 0x55.., 0x33.., 0x0F.., 0x00FF.., ...
#[inline(always)]
fn pattern<T: Word>(k: usize) -> T {
    T::max_value() / ((T::one() << (1 << k)) + T::one())
}

/// Counts set bits with the parallel (SWAR) reduction.
///
/// See <https://graphics.stanford.edu/~seander/bithacks.html#CountBitsSetParallel>.
#[inline(always)]
pub fn popcount<T: Word>(x: T) -> u32 {
    let m1 = pattern::<T>(0);
    let m2 = pattern::<T>(1);
    let m4 = pattern::<T>(2);
    let low_byte = T::max_value() >> (bits::<T>() - 8);
    let h01 = T::max_value() / low_byte;

    let x = x.wrapping_sub(&((x >> 1) & m1));
    let x = (x & m2).wrapping_add(&((x >> 2) & m2));
    let x = (x.wrapping_add(&(x >> 4))) & m4;
    let sum = x.wrapping_mul(&h01) >> (bits::<T>() - 8);

    sum.to_u32().unwrap_or(0)
}

/// Counts leading one bits by halving the search window.
#[inline(always)]
pub fn countl_one<T: Word>(x: T) -> u32 {
    let mut x = x;
    let mut sum = u32::from(x == T::max_value());

    let mut half = bits::<T>() / 2;
    while half > 0 {
        let top = T::max_value() << (bits::<T>() - half);
        if x & top == top {
            sum += half as u32;
            x = x << half;
        }
        half /= 2;
    }

    sum
}

#[inline(always)]
pub fn countl_zero<T: Word>(x: T) -> u32 {
    countl_one(!x)
}

/// Counts trailing zeros by isolating the lowest set bit and reading its
/// index off the alternating masks 0xAA.., 0xCC.., 0xF0.., ...
#[inline(always)]
pub fn countr_zero<T: Word>(x: T) -> u32 {
    if x.is_zero() {
        return bits::<T>() as u32;
    }

    let lowest = x & x.wrapping_neg();

    let mut ret = 0u32;
    let mut k = 0;
    while (1 << k) < bits::<T>() {
        if !(lowest & !pattern::<T>(k)).is_zero() {
            ret |= 1 << k;
        }
        k += 1;
    }

    ret
}

#[inline(always)]
pub fn countr_one<T: Word>(x: T) -> u32 {
    countr_zero(!x)
}

/// Number of bits needed to represent `x`, found with a binary search.
#[inline(always)]
pub fn bit_width<T: Word>(x: T) -> u32 {
    if x.is_zero() {
        return 0;
    }

    let mut x = x;
    let mut ret = 0u32;

    let mut half = bits::<T>() / 2;
    while half > 0 {
        if !(x >> half).is_zero() {
            ret += half as u32;
            x = x >> half;
        }
        half /= 2;
    }

    ret + 1
}

/// Smears the highest set bit into every lower position.
#[inline(always)]
fn smear_right<T: Word>(x: T) -> T {
    let mut x = x;
    let mut shift = 1;
    while shift < bits::<T>() {
        x = x | (x >> shift);
        shift *= 2;
    }
    x
}

#[inline(always)]
pub fn bit_floor<T: Word>(x: T) -> T {
    let x = smear_right(x);
    x - (x >> 1)
}

/// Smallest power of two not less than `x`; 0 maps to 1 and values above the
/// largest representable power wrap to 0.
#[inline(always)]
pub fn bit_ceil<T: Word>(x: T) -> T {
    if x.is_zero() {
        return T::one();
    }

    smear_right(x - T::one()).wrapping_add(&T::one())
}

#[inline(always)]
pub fn has_single_bit<T: Word>(x: T) -> bool {
    !x.is_zero() && (x & (x - T::one())).is_zero()
}

#[inline(always)]
pub fn rotl<T: Word>(x: T, s: u32) -> T {
    let s = s as usize & (bits::<T>() - 1);
    if s == 0 {
        return x;
    }

    (x << s) | (x >> (bits::<T>() - s))
}

#[inline(always)]
pub fn rotr<T: Word>(x: T, s: u32) -> T {
    let s = s as usize & (bits::<T>() - 1);
    if s == 0 {
        return x;
    }

    (x >> s) | (x << (bits::<T>() - s))
}

#[inline(always)]
pub fn byteswap<T: Word>(x: T) -> T {
    let bytes = bits::<T>() / 8;
    let low_byte = T::max_value() >> (bits::<T>() - 8);

    let mut ret = T::zero();
    for i in 0..bytes {
        let byte = (x >> (8 * i)) & low_byte;
        ret = ret | (byte << (8 * (bytes - 1 - i)));
    }

    ret
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Values that hit every edge the kernels branch on.
    fn edges_u32() -> Vec<u32> {
        let mut values = vec![0, 1, 2, 3, u32::MAX, u32::MAX - 1, 0x8000_0000, 0x7FFF_FFFF];
        for shift in 0..32 {
            values.push(1 << shift);
            values.push((1 << shift) - 1);
            values.push(u32::MAX << shift);
        }
        values.push(0xDEAD_BEEF);
        values.push(0x0123_4567);
        values
    }

    mod exhaustive_u8 {
        use super::*;

        #[test]
        fn test_popcount() {
            for x in 0..=u8::MAX {
                assert_eq!(popcount(x), x.count_ones(), "x = {x:#04x}");
            }
        }

        #[test]
        fn test_leading_and_trailing_counts() {
            for x in 0..=u8::MAX {
                assert_eq!(countl_zero(x), x.leading_zeros(), "x = {x:#04x}");
                assert_eq!(countl_one(x), x.leading_ones(), "x = {x:#04x}");
                assert_eq!(countr_zero(x), x.trailing_zeros(), "x = {x:#04x}");
                assert_eq!(countr_one(x), x.trailing_ones(), "x = {x:#04x}");
            }
        }

        #[test]
        fn test_bit_width_floor_ceil() {
            for x in 0..=u8::MAX {
                assert_eq!(bit_width(x), 8 - x.leading_zeros());

                let floor = if x == 0 { 0 } else { 1u8 << (7 - x.leading_zeros()) };
                assert_eq!(bit_floor(x), floor, "x = {x}");

                let ceil = x.checked_next_power_of_two().unwrap_or(0);
                assert_eq!(bit_ceil(x), ceil, "x = {x}");
            }
        }

        #[test]
        fn test_single_bit() {
            for x in 0..=u8::MAX {
                assert_eq!(has_single_bit(x), x.is_power_of_two(), "x = {x}");
            }
        }

        #[test]
        fn test_rotates() {
            for x in 0..=u8::MAX {
                for s in 0..20 {
                    assert_eq!(rotl(x, s), x.rotate_left(s));
                    assert_eq!(rotr(x, s), x.rotate_right(s));
                }
            }
        }
    }

    mod wide_words {
        use super::*;

        #[test]
        fn test_u16_exhaustive_counts() {
            for x in 0..=u16::MAX {
                assert_eq!(popcount(x), x.count_ones());
                assert_eq!(countl_zero(x), x.leading_zeros());
                assert_eq!(countr_zero(x), x.trailing_zeros());
            }
        }

        #[test]
        fn test_u32_edges() {
            for x in edges_u32() {
                assert_eq!(popcount(x), x.count_ones(), "x = {x:#x}");
                assert_eq!(countl_zero(x), x.leading_zeros(), "x = {x:#x}");
                assert_eq!(countl_one(x), x.leading_ones(), "x = {x:#x}");
                assert_eq!(countr_zero(x), x.trailing_zeros(), "x = {x:#x}");
                assert_eq!(bit_width(x), 32 - x.leading_zeros(), "x = {x:#x}");
                assert_eq!(bit_ceil(x), x.checked_next_power_of_two().unwrap_or(0));
                assert_eq!(byteswap(x), x.swap_bytes());
                assert_eq!(rotl(x, 13), x.rotate_left(13));
                assert_eq!(rotr(x, 45), x.rotate_right(45));
            }
        }

        #[test]
        fn test_u64_edges() {
            for x in edges_u32() {
                let x = (u64::from(x) << 32) | u64::from(x.rotate_left(7));
                assert_eq!(popcount(x), x.count_ones(), "x = {x:#x}");
                assert_eq!(countl_zero(x), x.leading_zeros(), "x = {x:#x}");
                assert_eq!(countr_zero(x), x.trailing_zeros(), "x = {x:#x}");
                assert_eq!(bit_width(x), 64 - x.leading_zeros());
                assert_eq!(bit_floor(x), if x == 0 { 0 } else { 1 << (63 - x.leading_zeros()) });
                assert_eq!(byteswap(x), x.swap_bytes());
            }
        }

        #[test]
        fn test_zero_words() {
            assert_eq!(countl_zero(0u64), 64);
            assert_eq!(countr_zero(0u64), 64);
            assert_eq!(bit_width(0u16), 0);
            assert_eq!(bit_floor(0u32), 0);
            assert_eq!(bit_ceil(0u32), 1);
            assert!(!has_single_bit(0u64));
        }
    }
}
