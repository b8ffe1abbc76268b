//! Fixed-width integer vectors.
//!
//! Each vector is a register-aligned lane array. All operations dispatch
//! through [`Kernels`], so the active instruction-set tier decides how a method
//! executes while the observable result stays equal to the lane-wise scalar
//! function in [`crate::scalar`].

use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};

use num::PrimInt;

use crate::error::{length_mismatch, misaligned, Result};
use crate::scalar::{DivResult, Scalar};
use crate::simd::kernels::{Convert, Kernels, Lanes, MaskKernels};
use crate::simd::mask::{
    Mask16x16, Mask16x8, Mask32x4, Mask32x8, Mask64x2, Mask64x4, Mask8x16, Mask8x32,
};
use crate::simd::traits::SimdVector;

/// Shift-subtract long division on unsigned lanes.
///
/// Every iteration tests one quotient bit for all lanes at once. The loop
/// starts at the highest bit any lane can need, which is bounded by the
/// leading zeros of the smallest divisor and the largest dividend.
///
/// All divisor lanes must be non-zero.
#[inline(always)]
pub(crate) fn shift_subtract_div<V: Kernels>(x: V, y: V) -> (V, V) {
    let max_x = x.lanes().iter().copied().fold(V::Lane::ZERO, crate::scalar::max);
    let min_y = y.lanes().iter().copied().fold(V::Lane::MAX, crate::scalar::min);

    let mut quotient = V::default();
    let mut remainder = x;

    let top = i64::from(min_y.leading_zeros()) - i64::from(max_x.leading_zeros());
    if top < 0 {
        return (quotient, remainder);
    }

    let one = V::splat(V::Lane::ONE);
    for i in (0..=top as u32).rev() {
        let fits = !remainder.shr(i).cmp_lt(y);
        let taken = V::broadcast(fits);
        remainder = remainder.sub(taken.and(y.shl(i)));
        quotient = quotient.or(taken.and(one).shl(i));
    }

    (quotient, remainder)
}

#[inline(always)]
#[track_caller]
fn assert_nonzero_lanes<V: Kernels>(y: V) {
    if y.cmp_eq(V::default()).any() {
        panic!("attempt to divide by zero");
    }
}

#[inline(always)]
#[track_caller]
fn checked_index<T: Scalar>(index: T, len: usize) -> usize {
    match index.to_usize() {
        Some(i) if i < len => i,
        _ => panic!("index out of bounds: the len is {len} but the index is {index:?}"),
    }
}

macro_rules! define_vector {
    (
        $(#[$meta:meta])*
        $name:ident, $lane:ty, $n:literal, $align:literal, mask $mask:ident, indices $idx:ident
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        #[repr(C, align($align))]
        pub struct $name(pub(crate) [$lane; $n]);

        impl Lanes for $name {
            type Lane = $lane;
            type Mask = $mask;
            type Indices = $idx;

            const LANES: usize = $n;

            #[inline(always)]
            fn splat(x: $lane) -> Self {
                Self([x; $n])
            }

            #[inline(always)]
            fn lanes(&self) -> &[$lane] {
                &self.0
            }

            #[inline(always)]
            fn lanes_mut(&mut self) -> &mut [$lane] {
                &mut self.0
            }
        }

        impl $name {
            /// Number of lanes.
            pub const LANES: usize = $n;

            /// Register alignment in bytes.
            pub const ALIGNMENT: usize = $align;

            // ------------------------------------------------------------------------------------
            // Construction and lane access
            // ------------------------------------------------------------------------------------

            #[inline(always)]
            pub fn splat(x: $lane) -> Self {
                Self([x; $n])
            }

            #[inline(always)]
            pub const fn from_array(lanes: [$lane; $n]) -> Self {
                Self(lanes)
            }

            #[inline(always)]
            pub const fn to_array(self) -> [$lane; $n] {
                self.0
            }

            #[inline(always)]
            pub const fn as_array(&self) -> &[$lane; $n] {
                &self.0
            }

            /// All ones in lanes where `mask` is set, zero elsewhere.
            #[inline(always)]
            pub fn broadcast_mask(mask: $mask) -> Self {
                <Self as Kernels>::broadcast(mask)
            }

            /// Reads lane `I`; out of range indices fail to compile.
            #[inline(always)]
            pub fn extract<const I: usize>(self) -> $lane {
                const { assert!(I < $n, "lane index out of range") };
                self.0[I]
            }

            /// Replaces lane `I`; out of range indices fail to compile.
            #[inline(always)]
            pub fn insert<const I: usize>(self, x: $lane) -> Self {
                const { assert!(I < $n, "lane index out of range") };
                let mut out = self;
                out.0[I] = x;
                out
            }

            // ------------------------------------------------------------------------------------
            // Comparisons
            // ------------------------------------------------------------------------------------

            #[inline(always)]
            pub fn cmp_eq(self, rhs: Self) -> $mask {
                Kernels::cmp_eq(self, rhs)
            }

            #[inline(always)]
            pub fn cmp_ne(self, rhs: Self) -> $mask {
                !Kernels::cmp_eq(self, rhs)
            }

            #[inline(always)]
            pub fn cmp_lt(self, rhs: Self) -> $mask {
                Kernels::cmp_lt(self, rhs)
            }

            #[inline(always)]
            pub fn cmp_le(self, rhs: Self) -> $mask {
                !Kernels::cmp_lt(rhs, self)
            }

            #[inline(always)]
            pub fn cmp_gt(self, rhs: Self) -> $mask {
                Kernels::cmp_lt(rhs, self)
            }

            #[inline(always)]
            pub fn cmp_ge(self, rhs: Self) -> $mask {
                !Kernels::cmp_lt(self, rhs)
            }

            // ------------------------------------------------------------------------------------
            // Arithmetic
            // ------------------------------------------------------------------------------------

            /// Upper half of each lane's double-width product.
            #[inline(always)]
            pub fn mul_hi(self, rhs: Self) -> Self {
                Kernels::mul_hi(self, rhs)
            }

            /// Quotient and remainder in one pass.
            ///
            /// # Panics
            ///
            /// Panics if any lane of `rhs` is zero.
            #[inline(always)]
            #[track_caller]
            pub fn div_rem(self, rhs: Self) -> DivResult<Self> {
                assert_nonzero_lanes(rhs);
                let (quot, rem) = self.div_rem_unchecked(rhs);
                DivResult { quot, rem }
            }

            // ------------------------------------------------------------------------------------
            // Reductions
            // ------------------------------------------------------------------------------------

            /// Number of non-zero lanes.
            #[inline(always)]
            pub fn count(self) -> usize {
                self.to_mask().count()
            }

            #[inline(always)]
            pub fn any(self) -> bool {
                self.to_mask().any()
            }

            #[inline(always)]
            pub fn all(self) -> bool {
                self.to_mask().all()
            }

            #[inline(always)]
            pub fn none(self) -> bool {
                !self.to_mask().any()
            }

            /// Mask of the non-zero lanes.
            #[inline(always)]
            pub fn to_mask(self) -> $mask {
                !Kernels::cmp_eq(self, Self::default())
            }

            // ------------------------------------------------------------------------------------
            // General
            // ------------------------------------------------------------------------------------

            /// `a` in lanes where `mask` is set, `b` elsewhere.
            #[inline(always)]
            pub fn blend(mask: $mask, a: Self, b: Self) -> Self {
                <Self as Kernels>::blend(mask, a, b)
            }

            /// Zeroes the lanes where `mask` is clear.
            #[inline(always)]
            pub fn keep(mask: $mask, v: Self) -> Self {
                Kernels::and(<Self as Kernels>::broadcast(mask), v)
            }

            /// Zeroes the lanes where `mask` is set.
            #[inline(always)]
            pub fn clear(mask: $mask, v: Self) -> Self {
                Kernels::and(<Self as Kernels>::broadcast(!mask), v)
            }

            #[inline(always)]
            pub fn min(self, rhs: Self) -> Self {
                Kernels::min(self, rhs)
            }

            #[inline(always)]
            pub fn max(self, rhs: Self) -> Self {
                Kernels::max(self, rhs)
            }

            /// Returns `[min, max]`.
            #[inline(always)]
            pub fn minmax(self, rhs: Self) -> [Self; 2] {
                [Kernels::min(self, rhs), Kernels::max(self, rhs)]
            }

            /// `min(max(self, lo), hi)` per lane.
            #[inline(always)]
            pub fn clamp(self, lo: Self, hi: Self) -> Self {
                Kernels::min(Kernels::max(self, lo), hi)
            }

            /// Overflow-free average: floor for unsigned lanes, truncation
            /// toward zero for signed lanes.
            #[inline(always)]
            pub fn average(self, rhs: Self) -> Self {
                Kernels::average(self, rhs)
            }

            /// Midpoint rounded toward `self`.
            #[inline(always)]
            pub fn midpoint(self, rhs: Self) -> Self {
                Kernels::midpoint(self, rhs)
            }

            // ------------------------------------------------------------------------------------
            // Bit manipulation
            // ------------------------------------------------------------------------------------

            #[inline(always)]
            pub fn popcount(self) -> Self {
                Kernels::popcount(self)
            }

            #[inline(always)]
            pub fn byteswap(self) -> Self {
                Kernels::byteswap(self)
            }

            #[inline(always)]
            pub fn countl_zero(self) -> Self {
                Kernels::countl_zero(self)
            }

            #[inline(always)]
            pub fn countl_one(self) -> Self {
                Kernels::countl_zero(Kernels::not(self))
            }

            #[inline(always)]
            pub fn countr_zero(self) -> Self {
                Kernels::countr_zero(self)
            }

            #[inline(always)]
            pub fn countr_one(self) -> Self {
                Kernels::countr_zero(Kernels::not(self))
            }

            #[inline(always)]
            pub fn bit_width(self) -> Self {
                Kernels::sub(Self::splat(<$lane>::BITS as $lane), Kernels::countl_zero(self))
            }

            #[inline(always)]
            pub fn has_single_bit(self) -> $mask {
                Kernels::cmp_eq(Kernels::popcount(self), Self::splat(1))
            }

            /// Rotates every lane left by `s mod BITS`.
            #[inline(always)]
            pub fn rotl(self, s: u32) -> Self {
                Kernels::rotl(self, s)
            }

            /// Rotates every lane right by `s mod BITS`.
            #[inline(always)]
            pub fn rotr(self, s: u32) -> Self {
                Kernels::rotr(self, s)
            }

            /// Rotates each lane left by the matching lane of `counts`, mod `BITS`.
            #[inline(always)]
            pub fn rotlv(self, counts: Self) -> Self {
                Kernels::rotlv(self, counts)
            }

            /// Rotates each lane right by the matching lane of `counts`, mod `BITS`.
            #[inline(always)]
            pub fn rotrv(self, counts: Self) -> Self {
                Kernels::rotrv(self, counts)
            }

            // ------------------------------------------------------------------------------------
            // Memory
            // ------------------------------------------------------------------------------------

            /// Loads the first `min(slice.len(), LANES)` lanes; the rest are zero.
            #[inline(always)]
            pub fn load(slice: &[$lane]) -> Self {
                let n = slice.len().min($n);
                let mut out = Self::default();
                out.0[..n].copy_from_slice(&slice[..n]);
                out
            }

            /// Writes the first `min(slice.len(), LANES)` lanes and leaves the
            /// rest of `slice` untouched.
            #[inline(always)]
            pub fn store(self, slice: &mut [$lane]) {
                let n = slice.len().min($n);
                slice[..n].copy_from_slice(&self.0[..n]);
            }

            /// Full-width load from a register-aligned slice.
            #[inline(always)]
            pub fn try_load_aligned(slice: &[$lane]) -> Result<Self> {
                if slice.len() < $n {
                    return Err(length_mismatch($n, slice.len()));
                }
                if !Self::is_aligned(slice.as_ptr()) {
                    return Err(misaligned(slice.as_ptr(), $align));
                }

                Ok(unsafe { Self::load_aligned_ptr(slice.as_ptr()) })
            }

            /// Full-width store into a register-aligned slice.
            #[inline(always)]
            pub fn try_store_aligned(self, slice: &mut [$lane]) -> Result<()> {
                if slice.len() < $n {
                    return Err(length_mismatch($n, slice.len()));
                }
                if !Self::is_aligned(slice.as_ptr()) {
                    return Err(misaligned(slice.as_ptr(), $align));
                }

                unsafe { self.store_aligned_ptr(slice.as_mut_ptr()) };
                Ok(())
            }

            /// # Safety
            ///
            /// `ptr` must be valid for reading `LANES` lanes.
            #[inline(always)]
            pub unsafe fn load_ptr(ptr: *const $lane) -> Self {
                debug_assert!(!ptr.is_null(), "Pointer must not be null");
                unsafe { ptr.cast::<Self>().read_unaligned() }
            }

            /// # Safety
            ///
            /// `ptr` must be valid for reading `LANES` lanes and aligned to
            /// [`Self::ALIGNMENT`].
            #[inline(always)]
            pub unsafe fn load_aligned_ptr(ptr: *const $lane) -> Self {
                debug_assert!(Self::is_aligned(ptr), "Pointer must be aligned to {} bytes", $align);
                unsafe { ptr.cast::<Self>().read() }
            }

            /// # Safety
            ///
            /// `ptr` must be valid for writing `LANES` lanes.
            #[inline(always)]
            pub unsafe fn store_ptr(self, ptr: *mut $lane) {
                debug_assert!(!ptr.is_null(), "Pointer must not be null");
                unsafe { ptr.cast::<Self>().write_unaligned(self) }
            }

            /// # Safety
            ///
            /// `ptr` must be valid for writing `LANES` lanes and aligned to
            /// [`Self::ALIGNMENT`].
            #[inline(always)]
            pub unsafe fn store_aligned_ptr(self, ptr: *mut $lane) {
                debug_assert!(Self::is_aligned(ptr), "Pointer must be aligned to {} bytes", $align);
                unsafe { ptr.cast::<Self>().write(self) }
            }

            /// Whether `ptr` meets the register alignment of this type.
            #[inline(always)]
            pub fn is_aligned(ptr: *const $lane) -> bool {
                (ptr as usize) % $align == 0
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self([0; $n])
            }
        }

        impl From<[$lane; $n]> for $name {
            #[inline(always)]
            fn from(lanes: [$lane; $n]) -> Self {
                Self(lanes)
            }
        }

        impl From<$name> for [$lane; $n] {
            #[inline(always)]
            fn from(v: $name) -> Self {
                v.0
            }
        }

        /// One in lanes where the mask is set, zero elsewhere.
        impl From<$mask> for $name {
            #[inline(always)]
            fn from(mask: $mask) -> Self {
                Kernels::and(<Self as Kernels>::broadcast(mask), Self::splat(1))
            }
        }

        impl SimdVector for $name {
            type Lane = $lane;
            type Mask = $mask;

            const LANES: usize = $n;
            const ALIGNMENT: usize = $align;

            #[inline(always)]
            fn splat(x: $lane) -> Self {
                Self([x; $n])
            }

            #[inline(always)]
            fn load(slice: &[$lane]) -> Self {
                <$name>::load(slice)
            }

            #[inline(always)]
            fn store(self, slice: &mut [$lane]) {
                <$name>::store(self, slice)
            }

            #[inline(always)]
            fn popcount(self) -> Self {
                Kernels::popcount(self)
            }

            #[inline(always)]
            fn div_rem(self, rhs: Self) -> DivResult<Self> {
                <$name>::div_rem(self, rhs)
            }

            #[inline(always)]
            fn mul_hi(self, rhs: Self) -> Self {
                Kernels::mul_hi(self, rhs)
            }
        }

        impl_binary_op!($name, Add, add, AddAssign, add_assign, Kernels::add);
        impl_binary_op!($name, Sub, sub, SubAssign, sub_assign, Kernels::sub);
        impl_binary_op!($name, Mul, mul, MulAssign, mul_assign, Kernels::mul);
        impl_binary_op!($name, BitAnd, bitand, BitAndAssign, bitand_assign, Kernels::and);
        impl_binary_op!($name, BitOr, bitor, BitOrAssign, bitor_assign, Kernels::or);
        impl_binary_op!($name, BitXor, bitxor, BitXorAssign, bitxor_assign, Kernels::xor);
        impl_binary_op!($name, Shl, shl, ShlAssign, shl_assign, Kernels::shlv);
        impl_binary_op!($name, Shr, shr, ShrAssign, shr_assign, Kernels::shrv);

        impl Div for $name {
            type Output = Self;

            /// # Panics
            ///
            /// Panics if any lane of `rhs` is zero.
            #[inline(always)]
            #[track_caller]
            fn div(self, rhs: Self) -> Self {
                self.div_rem(rhs).quot
            }
        }

        impl DivAssign for $name {
            #[inline(always)]
            #[track_caller]
            fn div_assign(&mut self, rhs: Self) {
                *self = *self / rhs;
            }
        }

        impl Rem for $name {
            type Output = Self;

            /// # Panics
            ///
            /// Panics if any lane of `rhs` is zero.
            #[inline(always)]
            #[track_caller]
            fn rem(self, rhs: Self) -> Self {
                self.div_rem(rhs).rem
            }
        }

        impl RemAssign for $name {
            #[inline(always)]
            #[track_caller]
            fn rem_assign(&mut self, rhs: Self) {
                *self = *self % rhs;
            }
        }

        impl Not for $name {
            type Output = Self;

            #[inline(always)]
            fn not(self) -> Self {
                Kernels::not(self)
            }
        }

        /// Counts at or above the lane width produce zero.
        impl Shl<u32> for $name {
            type Output = Self;

            #[inline(always)]
            fn shl(self, s: u32) -> Self {
                Kernels::shl(self, s)
            }
        }

        /// Counts at or above the lane width produce zero, or the sign fill
        /// for signed lanes.
        impl Shr<u32> for $name {
            type Output = Self;

            #[inline(always)]
            fn shr(self, s: u32) -> Self {
                Kernels::shr(self, s)
            }
        }

        impl ShlAssign<u32> for $name {
            #[inline(always)]
            fn shl_assign(&mut self, s: u32) {
                *self = Kernels::shl(*self, s);
            }
        }

        impl ShrAssign<u32> for $name {
            #[inline(always)]
            fn shr_assign(&mut self, s: u32) {
                *self = Kernels::shr(*self, s);
            }
        }
    };
}

macro_rules! impl_binary_op {
    ($name:ident, $trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $kernel:path) => {
        impl $trait for $name {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                $kernel(self, rhs)
            }
        }

        impl $assign_trait for $name {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = $kernel(*self, rhs);
            }
        }
    };
}

macro_rules! unsigned_vector {
    ($name:ident, $signed:ident) => {
        impl $name {
            /// Largest power of two not above each lane, zero for zero.
            #[inline(always)]
            pub fn bit_floor(self) -> Self {
                Kernels::bit_floor(self)
            }

            /// Smallest power of two not below each lane. Zero maps to one and
            /// lanes above the largest power of two map to zero.
            #[inline(always)]
            pub fn bit_ceil(self) -> Self {
                Kernels::bit_ceil(self)
            }

            /// `-x` for every lane, reinterpreted as signed, which is always
            /// representable.
            #[inline(always)]
            pub fn neg_abs(self) -> $signed {
                let signed = $signed::from(self);
                Kernels::neg(Kernels::abs(signed))
            }

            #[inline(always)]
            fn div_rem_unchecked(self, rhs: Self) -> (Self, Self) {
                shift_subtract_div(self, rhs)
            }
        }

        impl From<$signed> for $name {
            /// Bit cast.
            #[inline(always)]
            fn from(v: $signed) -> Self {
                let mut out = Self::default();
                for (lane, x) in out.0.iter_mut().zip(v.0) {
                    *lane = Scalar::to_unsigned(x);
                }
                out
            }
        }
    };
}

macro_rules! signed_vector {
    ($name:ident, $unsigned:ident) => {
        impl $name {
            /// Wrapping absolute value: `MIN` stays `MIN`.
            #[inline(always)]
            pub fn abs(self) -> Self {
                Kernels::abs(self)
            }

            /// `-|x|` for every lane, which is always representable.
            #[inline(always)]
            pub fn neg_abs(self) -> Self {
                Kernels::neg(Kernels::abs(self))
            }

            /// Negates the lanes where `mask` is set.
            #[inline(always)]
            pub fn negate(self, mask: <Self as SimdVector>::Mask) -> Self {
                let m = <Self as Kernels>::broadcast(mask);
                Kernels::sub(Kernels::xor(self, m), m)
            }

            #[inline(always)]
            fn div_rem_unchecked(self, rhs: Self) -> (Self, Self) {
                let zero = Self::default();

                // |MIN| reads correctly as unsigned
                let x = $unsigned::from(Kernels::abs(self));
                let y = $unsigned::from(Kernels::abs(rhs));
                let (quot, rem) = shift_subtract_div(x, y);

                let quot_negative = Kernels::cmp_lt(Kernels::xor(self, rhs), zero);
                let rem_negative = Kernels::cmp_lt(self, zero);

                (
                    $name::from(quot).negate(quot_negative),
                    $name::from(rem).negate(rem_negative),
                )
            }
        }

        impl Neg for $name {
            type Output = Self;

            /// Wrapping negation.
            #[inline(always)]
            fn neg(self) -> Self {
                Kernels::neg(self)
            }
        }

        impl From<$unsigned> for $name {
            /// Bit cast.
            #[inline(always)]
            fn from(v: $unsigned) -> Self {
                let mut out = Self::default();
                for (lane, x) in out.0.iter_mut().zip(v.0) {
                    *lane = Scalar::from_unsigned(x);
                }
                out
            }
        }
    };
}

macro_rules! gather_vector {
    ($name:ident, $lane:ty, $n:literal, $idx:ident) => {
        impl $name {
            /// Loads lane `i` from `slice[indices[i]]`.
            ///
            /// # Panics
            ///
            /// Panics if any index is negative or out of bounds.
            #[inline(always)]
            #[track_caller]
            pub fn gather(slice: &[$lane], indices: $idx) -> Self {
                Self::gather_partial(slice, indices, $n)
            }

            /// Gathers the first `min(n, LANES)` lanes and zeroes the rest.
            ///
            /// # Panics
            ///
            /// Panics if any of the used indices is negative or out of bounds.
            #[inline(always)]
            #[track_caller]
            pub fn gather_partial(slice: &[$lane], indices: $idx, n: usize) -> Self {
                let n = n.min($n);
                for &index in &indices.0[..n] {
                    checked_index(index, slice.len());
                }

                unsafe { Kernels::gather(slice.as_ptr(), indices, n) }
            }

            /// Stores lane `i` to `slice[indices[i]]`, in lane order.
            ///
            /// # Panics
            ///
            /// Panics if any index is negative or out of bounds.
            #[inline(always)]
            #[track_caller]
            pub fn scatter(self, slice: &mut [$lane], indices: $idx) {
                self.scatter_partial(slice, indices, $n)
            }

            /// Scatters the first `min(n, LANES)` lanes.
            ///
            /// # Panics
            ///
            /// Panics if any of the used indices is negative or out of bounds.
            #[inline(always)]
            #[track_caller]
            pub fn scatter_partial(self, slice: &mut [$lane], indices: $idx, n: usize) {
                let n = n.min($n);
                for (&x, &index) in self.0[..n].iter().zip(&indices.0[..n]) {
                    let i = checked_index(index, slice.len());
                    slice[i] = x;
                }
            }
        }
    };
}

// ------------------------------------------------------------------------------------------------
// 128-bit vectors
// ------------------------------------------------------------------------------------------------

define_vector!(
    /// 16 lanes of `u8`.
    U8x16, u8, 16, 16, mask Mask8x16, indices I8x16
);
define_vector!(
    /// 16 lanes of `i8`.
    I8x16, i8, 16, 16, mask Mask8x16, indices I8x16
);
define_vector!(
    /// 8 lanes of `u16`.
    U16x8, u16, 8, 16, mask Mask16x8, indices I16x8
);
define_vector!(
    /// 8 lanes of `i16`.
    I16x8, i16, 8, 16, mask Mask16x8, indices I16x8
);
define_vector!(
    /// 4 lanes of `u32`.
    U32x4, u32, 4, 16, mask Mask32x4, indices I32x4
);
define_vector!(
    /// 4 lanes of `i32`.
    I32x4, i32, 4, 16, mask Mask32x4, indices I32x4
);
define_vector!(
    /// 2 lanes of `u64`.
    U64x2, u64, 2, 16, mask Mask64x2, indices I64x2
);
define_vector!(
    /// 2 lanes of `i64`.
    I64x2, i64, 2, 16, mask Mask64x2, indices I64x2
);

// ------------------------------------------------------------------------------------------------
// 256-bit vectors
// ------------------------------------------------------------------------------------------------

define_vector!(
    /// 32 lanes of `u8`.
    U8x32, u8, 32, 32, mask Mask8x32, indices I8x32
);
define_vector!(
    /// 32 lanes of `i8`.
    I8x32, i8, 32, 32, mask Mask8x32, indices I8x32
);
define_vector!(
    /// 16 lanes of `u16`.
    U16x16, u16, 16, 32, mask Mask16x16, indices I16x16
);
define_vector!(
    /// 16 lanes of `i16`.
    I16x16, i16, 16, 32, mask Mask16x16, indices I16x16
);
define_vector!(
    /// 8 lanes of `u32`.
    U32x8, u32, 8, 32, mask Mask32x8, indices I32x8
);
define_vector!(
    /// 8 lanes of `i32`.
    I32x8, i32, 8, 32, mask Mask32x8, indices I32x8
);
define_vector!(
    /// 4 lanes of `u64`.
    U64x4, u64, 4, 32, mask Mask64x4, indices I64x4
);
define_vector!(
    /// 4 lanes of `i64`.
    I64x4, i64, 4, 32, mask Mask64x4, indices I64x4
);

unsigned_vector!(U8x16, I8x16);
unsigned_vector!(U16x8, I16x8);
unsigned_vector!(U32x4, I32x4);
unsigned_vector!(U64x2, I64x2);
unsigned_vector!(U8x32, I8x32);
unsigned_vector!(U16x16, I16x16);
unsigned_vector!(U32x8, I32x8);
unsigned_vector!(U64x4, I64x4);

signed_vector!(I8x16, U8x16);
signed_vector!(I16x8, U16x8);
signed_vector!(I32x4, U32x4);
signed_vector!(I64x2, U64x2);
signed_vector!(I8x32, U8x32);
signed_vector!(I16x16, U16x16);
signed_vector!(I32x8, U32x8);
signed_vector!(I64x4, U64x4);

gather_vector!(U32x4, u32, 4, I32x4);
gather_vector!(I32x4, i32, 4, I32x4);
gather_vector!(U64x2, u64, 2, I64x2);
gather_vector!(I64x2, i64, 2, I64x2);
gather_vector!(U32x8, u32, 8, I32x8);
gather_vector!(I32x8, i32, 8, I32x8);
gather_vector!(U64x4, u64, 4, I64x4);
gather_vector!(I64x4, i64, 4, I64x4);

macro_rules! widen_vector {
    ($($narrow:ident => $wide:ident),* $(,)?) => {$(
        impl From<$narrow> for $wide {
            /// Sign or zero extends every lane, as `as` does.
            #[inline(always)]
            fn from(v: $narrow) -> Self {
                Convert::convert(v)
            }
        }
    )*};
}

macro_rules! truncate_vector {
    ($($wide:ident => $narrow:ident),* $(,)?) => {$(
        impl $wide {
            /// Keeps the low half of every lane, as `as` does.
            #[inline(always)]
            pub fn truncate(self) -> $narrow {
                Convert::convert(self)
            }
        }
    )*};
}

widen_vector!(
    U8x16 => U16x16, I8x16 => I16x16, U8x16 => I16x16,
    U16x8 => U32x8, I16x8 => I32x8, U16x8 => I32x8,
    U32x4 => U64x4, I32x4 => I64x4, U32x4 => I64x4,
);

truncate_vector!(
    U16x16 => U8x16, I16x16 => I8x16,
    U32x8 => U16x8, I32x8 => I16x8,
    U64x4 => U32x4, I64x4 => I32x4,
);

#[cfg(test)]
mod tests {
    use super::*;

    mod construction_tests {
        use super::*;

        #[test]
        fn test_splat_and_arrays() {
            let v = U32x4::splat(7);
            assert_eq!(v.to_array(), [7; 4]);
            assert_eq!(I16x8::default().to_array(), [0; 8]);

            let v = I64x4::from_array([1, -2, 3, -4]);
            assert_eq!(<[i64; 4]>::from(v), [1, -2, 3, -4]);
            assert_eq!(v.as_array()[1], -2);
        }

        #[test]
        fn test_from_mask_and_broadcast() {
            let mask = Mask16x8::from_array([true, false, true, false, false, false, false, true]);
            assert_eq!(U16x8::from(mask).to_array(), [1, 0, 1, 0, 0, 0, 0, 1]);
            assert_eq!(
                I16x8::broadcast_mask(mask).to_array(),
                [-1, 0, -1, 0, 0, 0, 0, -1]
            );
        }

        #[test]
        fn test_extract_and_insert() {
            let v = U8x16::from_array([0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
            assert_eq!(v.extract::<0>(), 0);
            assert_eq!(v.extract::<15>(), 15);

            let v = v.insert::<3>(99);
            assert_eq!(v.extract::<3>(), 99);
            assert_eq!(v.extract::<4>(), 4);
        }

        #[test]
        fn test_bit_casts_between_signedness() {
            let v = I8x16::splat(-1);
            assert_eq!(U8x16::from(v), U8x16::splat(0xFF));
            assert_eq!(I32x8::from(U32x8::splat(0x8000_0000)), I32x8::splat(i32::MIN));
        }
    }

    mod width_tests {
        use super::*;

        #[test]
        fn test_widening_extends_by_source_sign() {
            let bytes = [0u8, 1, 0x7F, 0x80, 0xFF, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];
            let wide = U16x16::from(U8x16::from_array(bytes));
            assert_eq!(wide.as_array()[..5], [0, 1, 0x7F, 0x80, 0xFF]);

            let signed = I8x16::from(U8x16::from_array(bytes));
            assert_eq!(I16x16::from(signed).as_array()[..5], [0, 1, 127, -128, -1]);
            assert_eq!(I16x16::from(U8x16::from_array(bytes)).as_array()[..5], [0, 1, 127, 128, 255]);

            let words = I32x8::from(I16x8::from_array([i16::MIN, -1, 0, 1, i16::MAX, 5, 6, 7]));
            assert_eq!(words.to_array(), [-32768, -1, 0, 1, 32767, 5, 6, 7]);
            assert_eq!(
                U64x4::from(U32x4::from_array([u32::MAX, 0, 1, 0x8000_0000])).to_array(),
                [0xFFFF_FFFF, 0, 1, 0x8000_0000]
            );
            assert_eq!(
                I64x4::from(U32x4::splat(u32::MAX)),
                I64x4::splat(0xFFFF_FFFF)
            );
        }

        #[test]
        fn test_truncate_keeps_low_bits() {
            let v = U16x16::from_array(std::array::from_fn(|i| 0x1234 + 0x101 * i as u16));
            assert_eq!(
                v.truncate().to_array(),
                std::array::from_fn::<u8, 16, _>(|i| 0x34u8.wrapping_add(i as u8))
            );

            let v = I32x8::from_array([-1, 0x1_0000, 0x1_8000, -0x8000, 70000, 0, 1, -2]);
            assert_eq!(v.truncate().to_array(), [-1, 0, -32768, -32768, 4464, 0, 1, -2]);
            assert_eq!(
                I64x4::from_array([-1, i64::MIN, 1 << 32, i64::MAX]).truncate(),
                I32x4::from_array([-1, 0, 0, -1])
            );
        }

        #[test]
        fn test_widen_then_truncate_is_identity() {
            let v = I16x8::from_array([i16::MIN, -300, -1, 0, 1, 300, 12345, i16::MAX]);
            assert_eq!(I32x8::from(v).truncate(), v);
            let v = U8x16::from_array(std::array::from_fn(|i| (i * 17) as u8));
            assert_eq!(U16x16::from(v).truncate(), v);
        }
    }

    mod arithmetic_tests {
        use super::*;

        #[test]
        fn test_wrapping_operators() {
            let a = U8x16::splat(250);
            let b = U8x16::splat(10);
            assert_eq!((a + b).to_array(), [4; 16]);
            assert_eq!((b - a).to_array(), [16; 16]);
            assert_eq!((a * b).to_array(), [196; 16]);

            let a = I32x4::from_array([i32::MIN, -1, 0, i32::MAX]);
            assert_eq!((-a).to_array(), [i32::MIN, 1, 0, -i32::MAX]);
        }

        #[test]
        fn test_division_matches_scalar() {
            let x = U32x4::from_array([100, 7, u32::MAX, 0]);
            let y = U32x4::from_array([7, 100, 3, 5]);
            let result = x.div_rem(y);
            assert_eq!(result.quot.to_array(), [14, 0, u32::MAX / 3, 0]);
            assert_eq!(result.rem.to_array(), [2, 7, 0, 0]);
            assert_eq!(x / y, result.quot);
            assert_eq!(x % y, result.rem);
        }

        #[test]
        fn test_signed_division_truncates() {
            let x = I16x8::from_array([7, -7, 7, -7, i16::MIN, i16::MIN, 0, -1]);
            let y = I16x8::from_array([2, 2, -2, -2, -1, i16::MIN, 3, i16::MAX]);
            let result = x.div_rem(y);
            assert_eq!(result.quot.to_array(), [3, -3, -3, 3, i16::MIN, 1, 0, 0]);
            assert_eq!(result.rem.to_array(), [1, -1, 1, -1, 0, 0, 0, -1]);
        }

        #[test]
        #[should_panic(expected = "attempt to divide by zero")]
        fn test_division_by_zero_lane_panics() {
            let _ = U64x2::splat(1) / U64x2::from_array([1, 0]);
        }

        #[test]
        fn test_compound_assignment() {
            let mut v = I32x8::splat(10);
            v += I32x8::splat(5);
            v *= I32x8::splat(2);
            v -= I32x8::splat(1);
            v /= I32x8::splat(4);
            v %= I32x8::splat(4);
            assert_eq!(v, I32x8::splat(3));
        }
    }

    mod shift_tests {
        use super::*;

        #[test]
        fn test_shift_by_scalar_saturates() {
            let v = U16x8::splat(0x8001);
            assert_eq!((v << 1).to_array(), [0x0002; 8]);
            assert_eq!((v >> 15).to_array(), [1; 8]);
            assert_eq!((v << 16).to_array(), [0; 8]);
            assert_eq!((v >> 40).to_array(), [0; 8]);

            let v = I8x16::splat(-64);
            assert_eq!((v >> 3).to_array(), [-8; 16]);
            assert_eq!((v >> 8).to_array(), [-1; 16]);
        }

        #[test]
        fn test_shift_by_vector() {
            let v = U32x4::splat(1);
            let counts = U32x4::from_array([0, 5, 31, 32]);
            assert_eq!((v << counts).to_array(), [1, 32, 1 << 31, 0]);

            let v = I64x2::splat(i64::MIN);
            let counts = I64x2::from_array([63, 64]);
            assert_eq!((v >> counts).to_array(), [-1, -1]);
        }
    }

    mod memory_tests {
        use super::*;

        #[test]
        fn test_partial_load_zero_fills() {
            let v = U32x8::load(&[1, 2, 3]);
            assert_eq!(v.to_array(), [1, 2, 3, 0, 0, 0, 0, 0]);
            assert_eq!(I8x16::load(&[]), I8x16::default());
        }

        #[test]
        fn test_partial_store_leaves_tail() {
            let mut out = [9u16; 3];
            U16x8::splat(1).store(&mut out);
            assert_eq!(out, [1, 1, 1]);

            let mut out = [9i64; 4];
            I64x2::from_array([5, 6]).store(&mut out);
            assert_eq!(out, [5, 6, 9, 9]);
        }

        #[test]
        fn test_checked_aligned_access() {
            let storage = U32x4::from_array([1, 2, 3, 4]);
            let slice = storage.as_array().as_slice();
            assert_eq!(U32x4::try_load_aligned(slice), Ok(storage));
            assert!(U32x4::is_aligned(slice.as_ptr()));

            assert!(matches!(
                U32x4::try_load_aligned(&slice[1..]),
                Err(crate::error::AvelError::LengthMismatch { expected: 4, actual: 3 })
            ));

            let wide = [U32x4::default(); 2];
            let flat = unsafe { std::slice::from_raw_parts(wide.as_ptr().cast::<u32>(), 8) };
            assert!(matches!(
                U32x4::try_load_aligned(&flat[1..]),
                Err(crate::error::AvelError::Misaligned { required: 16, .. })
            ));
        }

        #[test]
        fn test_raw_pointer_roundtrip() {
            let data: Vec<i16> = (0..20).collect();
            let v = unsafe { I16x8::load_ptr(data.as_ptr().add(3)) };
            assert_eq!(v.to_array(), [3, 4, 5, 6, 7, 8, 9, 10]);

            let mut out = vec![0i16; 9];
            unsafe { v.store_ptr(out.as_mut_ptr().add(1)) };
            assert_eq!(out, [0, 3, 4, 5, 6, 7, 8, 9, 10]);
        }

        #[test]
        fn test_gather_and_scatter() {
            let data: Vec<u32> = (100..120).collect();
            let indices = I32x4::from_array([19, 0, 7, 7]);
            assert_eq!(U32x4::gather(&data, indices).to_array(), [119, 100, 107, 107]);
            assert_eq!(
                U32x4::gather_partial(&data, indices, 2).to_array(),
                [119, 100, 0, 0]
            );

            let mut out = [0i64; 6];
            I64x4::from_array([1, 2, 3, 4]).scatter(&mut out, I64x4::from_array([5, 0, 5, 2]));
            assert_eq!(out, [2, 0, 4, 0, 0, 3]);
        }

        #[test]
        #[should_panic(expected = "index out of bounds")]
        fn test_gather_rejects_negative_index() {
            let data = [1i32, 2, 3];
            let _ = I32x4::gather(&data, I32x4::from_array([0, 1, -1, 2]));
        }

        #[test]
        fn test_gather_partial_ignores_unused_indices() {
            let data = [1u64, 2, 3];
            let v = U64x2::gather_partial(&data, I64x2::from_array([2, 1000]), 1);
            assert_eq!(v.to_array(), [3, 0]);
        }
    }
}
