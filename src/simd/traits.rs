use std::fmt::Debug;

use crate::scalar::{DivResult, Scalar};

/// Operations shared by every vector type, for code generic over width and
/// lane type.
pub trait SimdVector: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    type Lane: Scalar;
    type Mask: Copy + Debug + PartialEq;

    const LANES: usize;
    const ALIGNMENT: usize;

    fn splat(x: Self::Lane) -> Self;

    /// Loads `min(slice.len(), LANES)` lanes and zero-fills the rest.
    fn load(slice: &[Self::Lane]) -> Self;

    /// Stores `min(slice.len(), LANES)` lanes.
    fn store(self, slice: &mut [Self::Lane]);

    fn popcount(self) -> Self;

    fn mul_hi(self, rhs: Self) -> Self;

    /// # Panics
    ///
    /// Panics if any lane of `rhs` is zero.
    fn div_rem(self, rhs: Self) -> DivResult<Self>;
}

/// Lane types with a native 128-bit vector.
pub trait SimdLane: Scalar {
    type Vector: SimdVector<Lane = Self>;
}

pub trait SimdPopcount {
    type Output;

    fn simd_popcount(self) -> Self::Output;
    fn par_simd_popcount(self) -> Self::Output;
    fn scalar_popcount(self) -> Self::Output;
}

pub trait SimdDivide<Rhs> {
    type Output;

    fn simd_div(self, rhs: Rhs) -> Self::Output;
    fn par_simd_div(self, rhs: Rhs) -> Self::Output;
    fn scalar_div(self, rhs: Rhs) -> Self::Output;
}

pub trait SimdDivideInPlace<Rhs> {
    fn simd_div_in_place(&mut self, rhs: Rhs);
}
