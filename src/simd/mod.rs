//! Vector and mask types with per-tier kernels.
//!
//! The backend modules are compiled according to the cfg flags `build.rs`
//! emits for the target: `sse` covers the 128-bit types on x86, `avx2` adds
//! the 256-bit types, and `neon` covers the 128-bit types on aarch64. Types a
//! tier leaves uncovered use the portable kernels from `fallback`.

#[cfg(sse)]
pub(crate) mod sse;

#[cfg(avx2)]
pub(crate) mod avx2;

#[cfg(neon)]
pub(crate) mod neon;

mod fallback;
pub(crate) mod kernels;

pub mod mask;
pub mod traits;
pub mod vector;

pub use mask::*;
pub use traits::{SimdDivide, SimdDivideInPlace, SimdLane, SimdPopcount, SimdVector};
pub use vector::*;

use crate::scalar::DivResult;

/// Lane-wise truncating division with remainder.
///
/// # Panics
///
/// Panics if any lane of `y` is zero.
#[inline(always)]
#[track_caller]
pub fn div<V: SimdVector>(x: V, y: V) -> DivResult<V> {
    x.div_rem(y)
}

macro_rules! native_vector {
    ($($lane:ty => $vector:ty),*) => {$(
        impl SimdLane for $lane {
            type Vector = $vector;
        }
    )*};
}

native_vector!(
    u8 => U8x16, i8 => I8x16, u16 => U16x8, i16 => I16x8,
    u32 => U32x4, i32 => I32x4, u64 => U64x2, i64 => I64x2
);
