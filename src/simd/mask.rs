//! Per-lane boolean masks.
//!
//! A mask has one lane per vector lane and is shared by the signed and unsigned
//! vectors of that shape. Lanes are stored the way comparison instructions
//! produce them: all ones for `true`, all zeros for `false`. Every constructor
//! keeps that canonical form, so the derived equality is whole-mask equality
//! and a mask can be reinterpreted as a register without conversion.

use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::simd::kernels::{MaskConvert, MaskKernels, MaskLanes};

macro_rules! define_mask {
    ($(#[$meta:meta])* $name:ident, $lane:ty, $n:literal, $align:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash)]
        #[repr(C, align($align))]
        pub struct $name(pub(crate) [$lane; $n]);

        impl $name {
            /// Number of lanes.
            pub const LANES: usize = $n;

            #[inline(always)]
            pub fn splat(value: bool) -> Self {
                Self([if value { <$lane>::MAX } else { 0 }; $n])
            }

            #[inline(always)]
            pub fn from_array(values: [bool; $n]) -> Self {
                let mut lanes = [0; $n];
                for (lane, value) in lanes.iter_mut().zip(values) {
                    *lane = if value { <$lane>::MAX } else { 0 };
                }
                Self(lanes)
            }

            #[inline(always)]
            pub fn to_array(self) -> [bool; $n] {
                let mut values = [false; $n];
                for (value, lane) in values.iter_mut().zip(self.0) {
                    *value = lane != 0;
                }
                values
            }

            /// Reads lane `i`.
            ///
            /// # Panics
            ///
            /// Panics if `i >= LANES`.
            #[inline(always)]
            pub fn test(self, i: usize) -> bool {
                self.0[i] != 0
            }

            /// Writes lane `i`.
            ///
            /// # Panics
            ///
            /// Panics if `i >= LANES`.
            #[inline(always)]
            pub fn set(&mut self, i: usize, value: bool) {
                self.0[i] = if value { <$lane>::MAX } else { 0 };
            }

            /// Number of set lanes.
            #[inline(always)]
            pub fn count(self) -> usize {
                MaskKernels::count(self)
            }

            #[inline(always)]
            pub fn any(self) -> bool {
                MaskKernels::any(self)
            }

            #[inline(always)]
            pub fn all(self) -> bool {
                MaskKernels::all(self)
            }

            #[inline(always)]
            pub fn none(self) -> bool {
                !MaskKernels::any(self)
            }
        }

        impl MaskLanes for $name {
            const LANES: usize = $n;

            #[inline(always)]
            fn lane(&self, i: usize) -> bool {
                self.0[i] != 0
            }

            #[inline(always)]
            fn from_fn(mut f: impl FnMut(usize) -> bool) -> Self {
                let mut lanes = [0; $n];
                for (i, lane) in lanes.iter_mut().enumerate() {
                    *lane = if f(i) { <$lane>::MAX } else { 0 };
                }
                Self(lanes)
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self([0; $n])
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.to_array()).finish()
            }
        }

        impl From<[bool; $n]> for $name {
            #[inline(always)]
            fn from(values: [bool; $n]) -> Self {
                Self::from_array(values)
            }
        }

        impl From<$name> for [bool; $n] {
            #[inline(always)]
            fn from(mask: $name) -> Self {
                mask.to_array()
            }
        }

        impl From<bool> for $name {
            #[inline(always)]
            fn from(value: bool) -> Self {
                Self::splat(value)
            }
        }

        impl Not for $name {
            type Output = Self;

            #[inline(always)]
            fn not(self) -> Self {
                let mut lanes = self.0;
                for lane in lanes.iter_mut() {
                    *lane = !*lane;
                }
                Self(lanes)
            }
        }

        impl_mask_bitop!($name, BitAnd, bitand, BitAndAssign, bitand_assign, &);
        impl_mask_bitop!($name, BitOr, bitor, BitOrAssign, bitor_assign, |);
        impl_mask_bitop!($name, BitXor, bitxor, BitXorAssign, bitxor_assign, ^);
    };
}

macro_rules! impl_mask_bitop {
    ($name:ident, $trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $trait for $name {
            type Output = Self;

            #[inline(always)]
            fn $method(self, rhs: Self) -> Self {
                let mut lanes = self.0;
                for (lane, other) in lanes.iter_mut().zip(rhs.0) {
                    *lane = *lane $op other;
                }
                Self(lanes)
            }
        }

        impl $assign_trait for $name {
            #[inline(always)]
            fn $assign_method(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }
    };
}

define_mask!(
    /// Mask for 16 lanes of 8 bits.
    Mask8x16, u8, 16, 16
);
define_mask!(
    /// Mask for 8 lanes of 16 bits.
    Mask16x8, u16, 8, 16
);
define_mask!(
    /// Mask for 4 lanes of 32 bits.
    Mask32x4, u32, 4, 16
);
define_mask!(
    /// Mask for 2 lanes of 64 bits.
    Mask64x2, u64, 2, 16
);
define_mask!(
    /// Mask for 32 lanes of 8 bits.
    Mask8x32, u8, 32, 32
);
define_mask!(
    /// Mask for 16 lanes of 16 bits.
    Mask16x16, u16, 16, 32
);
define_mask!(
    /// Mask for 8 lanes of 32 bits.
    Mask32x8, u32, 8, 32
);
define_mask!(
    /// Mask for 4 lanes of 64 bits.
    Mask64x4, u64, 4, 32
);

/// Masks with the same lane count convert both ways without loss.
macro_rules! resize_mask {
    ($($a:ident <=> $b:ident),* $(,)?) => {$(
        impl From<$a> for $b {
            #[inline(always)]
            fn from(mask: $a) -> Self {
                MaskConvert::convert(mask)
            }
        }

        impl From<$b> for $a {
            #[inline(always)]
            fn from(mask: $b) -> Self {
                MaskConvert::convert(mask)
            }
        }
    )*};
}

resize_mask!(
    Mask8x16 <=> Mask16x16,
    Mask16x8 <=> Mask32x8,
    Mask32x4 <=> Mask64x4,
);
