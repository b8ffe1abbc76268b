//! Portable kernels for the types the active tier has no backend for.
//!
//! Every impl here takes the lane-wise defaults from [`Kernels`],
//! [`MaskKernels`] and the width conversions. With `AVEL_FORCE_FALLBACK=1` this covers all types.

#[allow(unused_imports)]
use crate::simd::kernels::{Convert, Kernels, MaskConvert, MaskKernels};
#[allow(unused_imports)]
use crate::simd::mask::*;
#[allow(unused_imports)]
use crate::simd::vector::*;

#[allow(unused_macros)]
macro_rules! portable {
    ($($ty:ty),* $(,)?) => {$(
        impl Kernels for $ty {}
    )*};
}

#[allow(unused_macros)]
macro_rules! portable_masks {
    ($($ty:ty),* $(,)?) => {$(
        impl MaskKernels for $ty {}
    )*};
}

#[cfg(not(any(sse, neon)))]
portable!(U8x16, I8x16, U16x8, I16x8, U32x4, I32x4, U64x2, I64x2);

#[cfg(not(any(sse, neon)))]
portable_masks!(Mask8x16, Mask16x8, Mask32x4, Mask64x2);

#[cfg(not(avx2))]
portable!(U8x32, I8x32, U16x16, I16x16, U32x8, I32x8, U64x4, I64x4);

#[cfg(not(avx2))]
portable_masks!(Mask8x32, Mask16x16, Mask32x8, Mask64x4);

#[allow(unused_macros)]
macro_rules! portable_conversions {
    ($trait:ident: $($from:ty => $to:ty),* $(,)?) => {$(
        impl $trait<$to> for $from {}
    )*};
}

#[cfg(not(avx2))]
portable_conversions!(Convert:
    U8x16 => U16x16, I8x16 => I16x16, U8x16 => I16x16,
    U16x8 => U32x8, I16x8 => I32x8, U16x8 => I32x8,
    U32x4 => U64x4, I32x4 => I64x4, U32x4 => I64x4,
    U16x16 => U8x16, I16x16 => I8x16,
    U32x8 => U16x8, I32x8 => I16x8,
    U64x4 => U32x4, I64x4 => I32x4,
);

#[cfg(not(avx2))]
portable_conversions!(MaskConvert:
    Mask8x16 => Mask16x16, Mask16x16 => Mask8x16,
    Mask16x8 => Mask32x8, Mask32x8 => Mask16x8,
    Mask32x4 => Mask64x4, Mask64x4 => Mask32x4,
);
