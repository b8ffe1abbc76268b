//! Fixed-width SIMD integer vectors and masks.
//!
//! `avel` provides 128-bit and 256-bit vectors over the eight primitive
//! integer types, per-lane boolean masks, bit-manipulation kernels, and fast
//! division by precomputed denominators. Kernels are selected at build time:
//! SSE2 (with SSSE3/SSE4 refinements) and AVX2 on x86, NEON on AArch64, and
//! portable lane-wise code everywhere else. Results are identical on every
//! tier.
//!
//! ```
//! use avel::simd::{U32x4, I16x8};
//!
//! let v = U32x4::from_array([1, 2, 3, 0xF0]);
//! assert_eq!(v.popcount().to_array(), [1, 1, 2, 4]);
//! assert_eq!((v << 4).to_array(), [16, 32, 48, 0xF00]);
//!
//! let x = I16x8::splat(-7);
//! let m = x.cmp_lt(I16x8::default());
//! assert!(m.all());
//! assert_eq!(x.abs(), I16x8::splat(7));
//! ```
//!
//! The active tier can be inspected, and checked against the running CPU,
//! through [`capabilities`].

pub mod capabilities;
pub mod denom;
pub mod error;
pub mod scalar;
pub mod simd;
pub mod slice;
pub mod utils;

pub use capabilities::{Capabilities, Tier};
pub use denom::Denominator;
pub use error::{AvelError, Result};
pub use scalar::DivResult;
pub use slice::{PARALLEL_CHUNK_SIZE, PARALLEL_THRESHOLD};
