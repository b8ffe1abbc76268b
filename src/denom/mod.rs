//! Fast division by invariant integers.
//!
//! A [`Denominator`] precomputes a multiplier and shift amounts for a fixed
//! divisor (Granlund and Montgomery, "Division by Invariant Integers using
//! Multiplication"), so each later division costs a high multiply, an add and
//! two shifts instead of a hardware divide. Vector denominators hold separate
//! parameters per lane and divide every lane at once, which matters most on
//! instruction sets without any vector division.
//!
//! ```
//! use avel::denom::Denominator;
//!
//! let by_seven = Denominator::new(7u32).unwrap();
//! assert_eq!(100 / by_seven, 14);
//! assert_eq!(100 % by_seven, 2);
//! ```

use std::fmt::Debug;
use std::ops::{Div, DivAssign, Rem, RemAssign};

use crate::error::Result;
use crate::scalar::DivResult;
use crate::simd::vector::*;

mod scalar;
mod vector;

mod private {
    pub trait Sealed {}
}

/// Types a [`Denominator`] can be built for: the eight primitive integers and
/// every vector type.
pub trait Divisor: Copy + Debug + PartialEq + private::Sealed {
    #[doc(hidden)]
    fn prepare(d: Self) -> Result<Denominator<Self>>;

    #[doc(hidden)]
    fn quotient(n: Self, d: &Denominator<Self>) -> Self;

    #[doc(hidden)]
    fn remainder(n: Self, quotient: Self, d: Self) -> Self;

    #[doc(hidden)]
    fn rescale_left(d: &Denominator<Self>, s: u32) -> Option<Denominator<Self>>;

    #[doc(hidden)]
    fn rescale_right(d: &Denominator<Self>, s: u32) -> Option<Denominator<Self>>;
}

/// A divisor with precomputed multiply-and-shift parameters.
///
/// Unsigned divisors use `q = (t + ((n - t) >> pre_shift)) >> post_shift`
/// with `t = mul_hi(multiplier, n)`. Signed divisors use
/// `q = ((n + mul_hi(multiplier, n)) >> post_shift) - (n >> (BITS - 1))`,
/// then flip the sign through `sign`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Denominator<T> {
    pub(crate) divisor: T,
    pub(crate) multiplier: T,
    pub(crate) pre_shift: T,
    pub(crate) post_shift: T,
    /// All ones for negative signed divisors, zero otherwise.
    pub(crate) sign: T,
}

impl<T: Divisor> Denominator<T> {
    /// Precomputes the parameters for dividing by `d`.
    ///
    /// Returns [`AvelError::ZeroDivisor`](crate::error::AvelError::ZeroDivisor)
    /// if `d` is zero, or has any zero lane.
    pub fn new(d: T) -> Result<Self> {
        T::prepare(d)
    }

    /// The divisor.
    #[inline(always)]
    pub fn value(&self) -> T {
        self.divisor
    }

    /// Quotient and remainder of `n` divided by this denominator.
    #[inline(always)]
    pub fn div_rem(&self, n: T) -> DivResult<T> {
        let quot = T::quotient(n, self);
        DivResult {
            quot,
            rem: T::remainder(n, quot, self.divisor),
        }
    }

    /// Denominator for `value() << s`.
    ///
    /// Returns `None` if the shifted divisor overflows.
    pub fn checked_shl(&self, s: u32) -> Option<Self> {
        T::rescale_left(self, s)
    }

    /// Denominator for `value() >> s`.
    ///
    /// Returns `None` if the shifted divisor is zero.
    pub fn checked_shr(&self, s: u32) -> Option<Self> {
        T::rescale_right(self, s)
    }
}

/// Truncating division with remainder by a precomputed denominator.
#[inline(always)]
pub fn div<T: Divisor>(n: T, d: Denominator<T>) -> DivResult<T> {
    d.div_rem(n)
}

macro_rules! impl_denominator_ops {
    ($($t:ty),* $(,)?) => {$(
        impl Div<Denominator<$t>> for $t {
            type Output = $t;

            #[inline(always)]
            fn div(self, rhs: Denominator<$t>) -> $t {
                <$t as Divisor>::quotient(self, &rhs)
            }
        }

        impl Rem<Denominator<$t>> for $t {
            type Output = $t;

            #[inline(always)]
            fn rem(self, rhs: Denominator<$t>) -> $t {
                rhs.div_rem(self).rem
            }
        }

        impl DivAssign<Denominator<$t>> for $t {
            #[inline(always)]
            fn div_assign(&mut self, rhs: Denominator<$t>) {
                *self = *self / rhs;
            }
        }

        impl RemAssign<Denominator<$t>> for $t {
            #[inline(always)]
            fn rem_assign(&mut self, rhs: Denominator<$t>) {
                *self = *self % rhs;
            }
        }
    )*};
}

impl_denominator_ops!(u8, i8, u16, i16, u32, i32, u64, i64);
impl_denominator_ops!(U8x16, I8x16, U16x8, I16x8, U32x4, I32x4, U64x2, I64x2);
impl_denominator_ops!(U8x32, I8x32, U16x16, I16x16, U32x8, I32x8, U64x4, I64x4);
