//! Kernel traits the vector and mask types dispatch through.
//!
//! [`Kernels`] and [`MaskKernels`] carry portable lane-wise default bodies
//! built on the [`crate::scalar`] functions. Each instruction-set backend
//! implements them for the types it supports and overrides the methods it
//! has instructions for; `fallback.rs` supplies empty impls for every type the
//! active tier leaves uncovered, so each type has exactly one impl.
//!
//! The generic helpers at the bottom express the classic smear and shift tricks
//! in terms of other kernels. Backends reach for them when a lane width has no
//! dedicated instruction.

use std::ops::{BitAnd, BitOr, BitXor, Not};

use num::traits::{WrappingAdd, WrappingMul, WrappingSub};
use num::traits::AsPrimitive;
use num::ToPrimitive;

use crate::scalar::{Bits, Scalar, UnsignedBits};

/// Lane-level access shared by all mask types.
pub(crate) trait MaskLanes:
    Copy
    + PartialEq
    + Not<Output = Self>
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitXor<Output = Self>
{
    const LANES: usize;

    fn lane(&self, i: usize) -> bool;

    fn from_fn(f: impl FnMut(usize) -> bool) -> Self;
}

pub(crate) trait MaskKernels: MaskLanes {
    #[inline(always)]
    fn count(self) -> usize {
        (0..Self::LANES).filter(|&i| self.lane(i)).count()
    }

    #[inline(always)]
    fn any(self) -> bool {
        (0..Self::LANES).any(|i| self.lane(i))
    }

    #[inline(always)]
    fn all(self) -> bool {
        (0..Self::LANES).all(|i| self.lane(i))
    }
}

/// Lane-level access shared by all vector types.
pub(crate) trait Lanes: Copy + Default + PartialEq + 'static {
    type Lane: Scalar;
    type Mask: MaskKernels;
    /// Signed vector of the same shape, used for gather and scatter offsets.
    type Indices: Lanes<Mask = Self::Mask>;

    const LANES: usize;

    fn splat(x: Self::Lane) -> Self;

    fn lanes(&self) -> &[Self::Lane];

    fn lanes_mut(&mut self) -> &mut [Self::Lane];
}

pub(crate) trait Kernels: Lanes {
    #[inline(always)]
    fn map(self, f: impl Fn(Self::Lane) -> Self::Lane) -> Self {
        let mut out = self;
        for lane in out.lanes_mut() {
            *lane = f(*lane);
        }
        out
    }

    #[inline(always)]
    fn zip(self, rhs: Self, f: impl Fn(Self::Lane, Self::Lane) -> Self::Lane) -> Self {
        let mut out = self;
        for (lane, &b) in out.lanes_mut().iter_mut().zip(rhs.lanes()) {
            *lane = f(*lane, b);
        }
        out
    }

    #[inline(always)]
    fn compare(self, rhs: Self, f: impl Fn(Self::Lane, Self::Lane) -> bool) -> Self::Mask {
        let (a, b) = (self.lanes(), rhs.lanes());
        Self::Mask::from_fn(|i| f(a[i], b[i]))
    }

    // Arithmetic

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a.wrapping_add(&b))
    }

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a.wrapping_sub(&b))
    }

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a.wrapping_mul(&b))
    }

    #[inline(always)]
    fn neg(self) -> Self {
        self.map(Scalar::negated)
    }

    #[inline(always)]
    fn mul_hi(self, rhs: Self) -> Self {
        self.zip(rhs, Scalar::mul_hi)
    }

    #[inline(always)]
    fn average(self, rhs: Self) -> Self {
        self.zip(rhs, Scalar::average)
    }

    #[inline(always)]
    fn midpoint(self, rhs: Self) -> Self {
        self.zip(rhs, Scalar::midpoint)
    }

    /// Wrapping absolute value; the identity on unsigned lanes.
    #[inline(always)]
    fn abs(self) -> Self {
        self.map(|x| {
            if x < Self::Lane::ZERO {
                x.negated()
            } else {
                x
            }
        })
    }

    // Bitwise

    #[inline(always)]
    fn and(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a & b)
    }

    #[inline(always)]
    fn or(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a | b)
    }

    #[inline(always)]
    fn xor(self, rhs: Self) -> Self {
        self.zip(rhs, |a, b| a ^ b)
    }

    #[inline(always)]
    fn not(self) -> Self {
        self.map(|a| !a)
    }

    #[inline(always)]
    fn shl(self, s: u32) -> Self {
        self.map(|a| a.shift_left(s))
    }

    #[inline(always)]
    fn shr(self, s: u32) -> Self {
        self.map(|a| a.shift_right(s))
    }

    #[inline(always)]
    fn shlv(self, counts: Self) -> Self {
        self.zip(counts, |a, s| a.shift_left(s.shift_amount()))
    }

    #[inline(always)]
    fn shrv(self, counts: Self) -> Self {
        self.zip(counts, |a, s| a.shift_right(s.shift_amount()))
    }

    // Comparisons and selection

    #[inline(always)]
    fn cmp_eq(self, rhs: Self) -> Self::Mask {
        self.compare(rhs, |a, b| a == b)
    }

    #[inline(always)]
    fn cmp_lt(self, rhs: Self) -> Self::Mask {
        self.compare(rhs, |a, b| a < b)
    }

    #[inline(always)]
    fn min(self, rhs: Self) -> Self {
        self.zip(rhs, crate::scalar::min)
    }

    #[inline(always)]
    fn max(self, rhs: Self) -> Self {
        self.zip(rhs, crate::scalar::max)
    }

    /// `a` in lanes where `m` is set, `b` elsewhere.
    #[inline(always)]
    fn blend(m: Self::Mask, a: Self, b: Self) -> Self {
        let mut out = b;
        for (i, lane) in out.lanes_mut().iter_mut().enumerate() {
            if m.lane(i) {
                *lane = a.lanes()[i];
            }
        }
        out
    }

    /// All ones in set lanes, zero elsewhere.
    #[inline(always)]
    fn broadcast(m: Self::Mask) -> Self {
        let mut out = Self::default();
        for (i, lane) in out.lanes_mut().iter_mut().enumerate() {
            if m.lane(i) {
                *lane = !Self::Lane::ZERO;
            }
        }
        out
    }

    // Bit manipulation

    #[inline(always)]
    fn popcount(self) -> Self {
        self.map(Bits::popcount)
    }

    #[inline(always)]
    fn countl_zero(self) -> Self {
        self.map(Bits::countl_zero)
    }

    #[inline(always)]
    fn countr_zero(self) -> Self {
        self.map(Bits::countr_zero)
    }

    #[inline(always)]
    fn byteswap(self) -> Self {
        self.map(Bits::byteswap)
    }

    #[inline(always)]
    fn bit_floor(self) -> Self {
        self.map(|x| Self::Lane::from_unsigned(x.to_unsigned().bit_floor()))
    }

    #[inline(always)]
    fn bit_ceil(self) -> Self {
        self.map(|x| Self::Lane::from_unsigned(x.to_unsigned().bit_ceil()))
    }

    #[inline(always)]
    fn rotl(self, s: u32) -> Self {
        self.map(|x| x.rotl(s))
    }

    #[inline(always)]
    fn rotr(self, s: u32) -> Self {
        self.map(|x| x.rotr(s))
    }

    /// Counts are taken modulo the lane width.
    #[inline(always)]
    fn rotlv(self, counts: Self) -> Self {
        self.zip(counts, |x, s| x.rotl(rotate_amount(s)))
    }

    #[inline(always)]
    fn rotrv(self, counts: Self) -> Self {
        self.zip(counts, |x, s| x.rotr(rotate_amount(s)))
    }

    // Memory

    /// Loads lane `i < n` from `base[indices[i]]` and zeroes the rest.
    ///
    /// # Safety
    ///
    /// Every offset `indices[i]` for `i < n` must be in bounds of the
    /// allocation `base` points into.
    #[inline(always)]
    unsafe fn gather(base: *const Self::Lane, indices: Self::Indices, n: usize) -> Self {
        let mut out = Self::default();
        for (i, lane) in out.lanes_mut().iter_mut().take(n).enumerate() {
            let offset = indices.lanes()[i].to_isize().unwrap_or(isize::MAX);
            *lane = unsafe { *base.offset(offset) };
        }
        out
    }
}

/// Lane-count preserving conversion between a 128-bit and a 256-bit shape.
/// Lanes convert the way `as` does: sign or zero extension when widening,
/// keeping the low bits when narrowing.
pub(crate) trait Convert<T: Lanes>: Lanes {
    #[inline(always)]
    fn convert(self) -> T
    where
        Self::Lane: AsPrimitive<T::Lane>,
    {
        debug_assert_eq!(Self::LANES, T::LANES);
        let mut out = T::default();
        for (dst, &src) in out.lanes_mut().iter_mut().zip(self.lanes()) {
            *dst = src.as_();
        }
        out
    }
}

/// Mask counterpart of [`Convert`]: lane `i` keeps its truth value.
pub(crate) trait MaskConvert<T: MaskLanes>: MaskLanes {
    #[inline(always)]
    fn convert(self) -> T {
        debug_assert_eq!(Self::LANES, T::LANES);
        T::from_fn(|i| self.lane(i))
    }
}

#[inline(always)]
fn rotate_amount<T: Scalar>(s: T) -> u32 {
    (s.to_u64_bits() % u64::from(T::BITS)) as u32
}

// ------------------------------------------------------------------------------------------------
// Generic tricks built from other kernels
// ------------------------------------------------------------------------------------------------

/// Copies the highest set bit of every lane into all lower positions.
#[inline(always)]
#[cfg_attr(not(any(sse, neon)), allow(dead_code))]
pub(crate) fn smear_right<V: Kernels>(x: V) -> V {
    let mut x = x;
    let mut shift = 1;
    while shift < V::Lane::BITS {
        x = x.or(x.shr(shift));
        shift *= 2;
    }
    x
}

/// `countl_zero(x) = popcount(!smear_right(x))`. Unsigned lanes only.
#[inline(always)]
#[cfg_attr(not(any(sse, neon)), allow(dead_code))]
pub(crate) fn smear_countl_zero<V: Kernels>(x: V) -> V {
    smear_right(x).not().popcount()
}

/// `countr_zero(x) = popcount(!x & (x - 1))`, which yields `BITS` for zero.
#[inline(always)]
#[cfg_attr(not(any(sse, neon)), allow(dead_code))]
pub(crate) fn popcount_countr_zero<V: Kernels>(x: V) -> V {
    x.not().and(x.sub(V::splat(V::Lane::ONE))).popcount()
}

/// Unsigned lanes only.
#[inline(always)]
#[cfg_attr(not(any(sse, neon)), allow(dead_code))]
pub(crate) fn smear_bit_floor<V: Kernels>(x: V) -> V {
    let x = smear_right(x);
    x.sub(x.shr(1))
}

/// Unsigned lanes only. Zero lanes map to one.
#[inline(always)]
#[cfg_attr(not(any(sse, neon)), allow(dead_code))]
pub(crate) fn smear_bit_ceil<V: Kernels>(x: V) -> V {
    let one = V::splat(V::Lane::ONE);
    let zeros = V::broadcast(x.cmp_eq(V::default())).and(one);
    smear_right(x.sub(one)).add(one).add(zeros)
}

/// Floor of the unsigned average corrected from the rounding-up `avg`
/// instructions: `avg(a, b) - ((a ^ b) & 1)`.
#[inline(always)]
#[cfg_attr(not(sse), allow(dead_code))]
pub(crate) fn floor_from_rounded_average<V: Kernels>(rounded: V, a: V, b: V) -> V {
    rounded.sub(a.xor(b).and(V::splat(V::Lane::ONE)))
}

/// Midpoint from the floor average: `floor + ((b < a) & (a ^ b) & 1)`.
#[inline(always)]
#[cfg_attr(not(any(sse, neon)), allow(dead_code))]
pub(crate) fn midpoint_from_floor<V: Kernels>(floor: V, a: V, b: V) -> V {
    let bias = V::broadcast(b.cmp_lt(a))
        .and(a.xor(b))
        .and(V::splat(V::Lane::ONE));
    floor.add(bias)
}

/// Rotate through two shifts. Unsigned lanes only.
#[inline(always)]
#[cfg_attr(not(any(sse, neon)), allow(dead_code))]
pub(crate) fn shift_rotl<V: Kernels>(x: V, s: u32) -> V {
    let s = s % V::Lane::BITS;
    if s == 0 {
        return x;
    }
    x.shl(s).or(x.shr(V::Lane::BITS - s))
}

/// Rotate through two shifts. Unsigned lanes only.
#[inline(always)]
#[cfg_attr(not(any(sse, neon)), allow(dead_code))]
pub(crate) fn shift_rotr<V: Kernels>(x: V, s: u32) -> V {
    let s = s % V::Lane::BITS;
    if s == 0 {
        return x;
    }
    x.shr(s).or(x.shl(V::Lane::BITS - s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simd::mask::Mask16x8;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Eight `u16` lanes that take every default kernel body.
    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Lanewise([u16; 8]);

    impl Lanes for Lanewise {
        type Lane = u16;
        type Mask = Mask16x8;
        type Indices = Self;

        const LANES: usize = 8;

        fn splat(x: u16) -> Self {
            Self([x; 8])
        }

        fn lanes(&self) -> &[u16] {
            &self.0
        }

        fn lanes_mut(&mut self) -> &mut [u16] {
            &mut self.0
        }
    }

    impl Kernels for Lanewise {}

    fn random_lanes(rng: &mut StdRng) -> Lanewise {
        Lanewise(std::array::from_fn(|_| rng.random()))
    }

    mod default_kernel_tests {
        use super::*;

        #[test]
        fn test_arithmetic_wraps() {
            let a = Lanewise([u16::MAX, 0, 0x8000, 1, 2, 300, 0xFFFE, 7]);
            let b = Lanewise([1, 1, 0x8000, u16::MAX, 0x8000, 300, 2, 0]);

            assert_eq!(a.add(b).0, [0, 1, 0, 0, 0x8002, 600, 0, 7]);
            assert_eq!(a.sub(b).0, [0xFFFE, u16::MAX, 0, 2, 0x8002, 0, 0xFFFC, 7]);
            assert_eq!(a.mul(b).0, [u16::MAX, 0, 0, u16::MAX, 0, 0x5F90, 0xFFFC, 0]);
        }

        #[test]
        fn test_arithmetic_matches_scalar() {
            let mut rng = StdRng::seed_from_u64(17);
            for _ in 0..200 {
                let (a, b) = (random_lanes(&mut rng), random_lanes(&mut rng));
                let (sum, diff, prod) = (a.add(b), a.sub(b), a.mul(b));
                for i in 0..8 {
                    assert_eq!(sum.0[i], a.0[i].wrapping_add(b.0[i]));
                    assert_eq!(diff.0[i], a.0[i].wrapping_sub(b.0[i]));
                    assert_eq!(prod.0[i], a.0[i].wrapping_mul(b.0[i]));
                }
            }
        }
    }

    mod generic_trick_tests {
        use super::*;

        #[test]
        fn test_smear_helpers_match_scalar() {
            let mut rng = StdRng::seed_from_u64(29);
            for _ in 0..200 {
                let x = random_lanes(&mut rng);
                let (floor, clz) = (smear_bit_floor(x), smear_countl_zero(x));
                let ctz = popcount_countr_zero(x);
                for i in 0..8 {
                    let lane = x.0[i];
                    let expected_floor = if lane == 0 { 0 } else { 1 << (15 - lane.leading_zeros()) };
                    assert_eq!(floor.0[i], expected_floor);
                    assert_eq!(u32::from(clz.0[i]), lane.leading_zeros());
                    assert_eq!(u32::from(ctz.0[i]), lane.trailing_zeros());
                }
            }
        }

        #[test]
        fn test_shift_rotates() {
            let x = Lanewise([0x8001, 0x1234, 0, u16::MAX, 1, 0x00F0, 0xABCD, 0x4000]);
            for s in [0, 1, 4, 15, 16, 21] {
                let (l, r) = (shift_rotl(x, s), shift_rotr(x, s));
                for i in 0..8 {
                    assert_eq!(l.0[i], x.0[i].rotate_left(s));
                    assert_eq!(r.0[i], x.0[i].rotate_right(s));
                }
            }
        }
    }
}
