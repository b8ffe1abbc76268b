//! Vector denominators.
//!
//! Parameters are computed per lane with the scalar routines, so lanes may
//! hold different divisors. Division then runs the same multiply-and-shift
//! sequence with variable per-lane shifts.

use super::{private, Denominator, Divisor};
use crate::error::Result;
use crate::scalar::Scalar;
use crate::simd::kernels::{Kernels, Lanes};
use crate::simd::vector::*;

fn lane<V: Lanes>(d: &Denominator<V>, i: usize) -> Denominator<V::Lane> {
    Denominator {
        divisor: d.divisor.lanes()[i],
        multiplier: d.multiplier.lanes()[i],
        pre_shift: d.pre_shift.lanes()[i],
        post_shift: d.post_shift.lanes()[i],
        sign: d.sign.lanes()[i],
    }
}

fn set_lane<V: Lanes>(d: &mut Denominator<V>, i: usize, lane: Denominator<V::Lane>) {
    d.divisor.lanes_mut()[i] = lane.divisor;
    d.multiplier.lanes_mut()[i] = lane.multiplier;
    d.pre_shift.lanes_mut()[i] = lane.pre_shift;
    d.post_shift.lanes_mut()[i] = lane.post_shift;
    d.sign.lanes_mut()[i] = lane.sign;
}

fn prepare_lanes<V>(d: V) -> Result<Denominator<V>>
where
    V: Lanes,
    V::Lane: Divisor,
{
    let mut out = Denominator {
        divisor: d,
        multiplier: V::default(),
        pre_shift: V::default(),
        post_shift: V::default(),
        sign: V::default(),
    };
    for (i, &x) in d.lanes().iter().enumerate() {
        set_lane(&mut out, i, Denominator::new(x)?);
    }
    Ok(out)
}

fn rescale_lanes<V>(
    d: &Denominator<V>,
    rescale: impl Fn(&Denominator<V::Lane>) -> Option<Denominator<V::Lane>>,
) -> Option<Denominator<V>>
where
    V: Lanes,
    V::Lane: Divisor,
{
    let mut out = *d;
    for i in 0..V::LANES {
        set_lane(&mut out, i, rescale(&lane(d, i))?);
    }
    Some(out)
}

#[inline(always)]
fn unsigned_quotient<V: Kernels>(n: V, d: &Denominator<V>) -> V {
    let t = n.mul_hi(d.multiplier);
    let q = t.add(n.sub(t).shrv(d.pre_shift));
    q.shrv(d.post_shift)
}

#[inline(always)]
fn signed_quotient<V: Kernels>(n: V, d: &Denominator<V>) -> V {
    let q = n.add(n.mul_hi(d.multiplier)).shrv(d.post_shift);
    let q = q.sub(n.shr(<V::Lane as Scalar>::BITS - 1));
    q.xor(d.sign).sub(d.sign)
}

macro_rules! vector_divisor {
    ($quotient:ident: $($v:ty),* $(,)?) => {$(
        impl private::Sealed for $v {}

        impl Divisor for $v {
            fn prepare(d: $v) -> Result<Denominator<$v>> {
                prepare_lanes(d)
            }

            #[inline(always)]
            fn quotient(n: $v, d: &Denominator<$v>) -> $v {
                $quotient(n, d)
            }

            #[inline(always)]
            fn remainder(n: $v, quotient: $v, d: $v) -> $v {
                Kernels::sub(n, Kernels::mul(quotient, d))
            }

            fn rescale_left(d: &Denominator<$v>, s: u32) -> Option<Denominator<$v>> {
                rescale_lanes(d, |lane| lane.checked_shl(s))
            }

            fn rescale_right(d: &Denominator<$v>, s: u32) -> Option<Denominator<$v>> {
                rescale_lanes(d, |lane| lane.checked_shr(s))
            }
        }
    )*};
}

vector_divisor!(unsigned_quotient: U8x16, U16x8, U32x4, U64x2, U8x32, U16x16, U32x8, U64x4);
vector_divisor!(signed_quotient: I8x16, I16x8, I32x4, I64x2, I8x32, I16x16, I32x8, I64x4);

/// Splats a scalar denominator into every lane.
macro_rules! splat_denominator {
    ($($lane:ty => $($v:ty),+);* $(;)?) => {$($(
        impl From<Denominator<$lane>> for Denominator<$v> {
            #[inline(always)]
            fn from(d: Denominator<$lane>) -> Self {
                Denominator {
                    divisor: <$v>::splat(d.divisor),
                    multiplier: <$v>::splat(d.multiplier),
                    pre_shift: <$v>::splat(d.pre_shift),
                    post_shift: <$v>::splat(d.post_shift),
                    sign: <$v>::splat(d.sign),
                }
            }
        }
    )+)*};
}

splat_denominator!(
    u8 => U8x16, U8x32;
    i8 => I8x16, I8x32;
    u16 => U16x8, U16x16;
    i16 => I16x8, I16x16;
    u32 => U32x4, U32x8;
    i32 => I32x4, I32x8;
    u64 => U64x2, U64x4;
    i64 => I64x2, I64x4;
);
