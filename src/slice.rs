//! Bulk operations over integer slices.
//!
//! Every operation comes in three flavours: `scalar_*` runs the scalar kernel
//! element by element, `simd_*` walks the slice in 128-bit vector chunks and
//! finishes the tail with a partial load and store, and `par_simd_*` splits
//! the work across the rayon thread pool once the input reaches
//! [`PARALLEL_THRESHOLD`] elements.
//!
//! ```
//! use avel::denom::Denominator;
//! use avel::simd::{SimdDivide, SimdPopcount};
//!
//! let data: Vec<u32> = (0..100).collect();
//! let counts = data.as_slice().simd_popcount();
//! assert_eq!(counts[7], 3);
//!
//! let by_ten = Denominator::new(10u32).unwrap();
//! assert_eq!(data.as_slice().simd_div(by_ten)[57], 5);
//! ```

use rayon::prelude::*;

use crate::denom::{Denominator, Divisor};
use crate::scalar::Bits;
use crate::simd::traits::{SimdDivide, SimdDivideInPlace, SimdLane, SimdPopcount, SimdVector};

/// Minimum number of elements before the `par_simd_*` variants hand work to
/// rayon.
pub const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Elements processed by each parallel task, rounded down to whole vectors.
pub const PARALLEL_CHUNK_SIZE: usize = 1 << 14;

#[inline(always)]
fn simd_map<T, F>(a: &[T], out: &mut [T], f: F)
where
    T: SimdLane,
    F: Fn(T::Vector) -> T::Vector,
{
    let step = <T::Vector as SimdVector>::LANES;

    // the last chunk may be short; load zero-fills and store stops at its end
    for (src, dst) in a.chunks(step).zip(out.chunks_mut(step)) {
        f(T::Vector::load(src)).store(dst);
    }
}

#[inline(always)]
fn simd_map_in_place<T, F>(a: &mut [T], f: F)
where
    T: SimdLane,
    F: Fn(T::Vector) -> T::Vector,
{
    let step = <T::Vector as SimdVector>::LANES;

    for chunk in a.chunks_mut(step) {
        f(T::Vector::load(chunk)).store(chunk);
    }
}

fn parallel_chunk_size<T: SimdLane>() -> usize {
    let step = <T::Vector as SimdVector>::LANES;
    ((PARALLEL_CHUNK_SIZE / step) * step).max(step)
}

fn simd_apply<T, F>(a: &[T], f: F) -> Vec<T>
where
    T: SimdLane,
    F: Fn(T::Vector) -> T::Vector,
{
    let mut c = vec![T::ZERO; a.len()];
    simd_map(a, &mut c, f);
    c
}

fn par_simd_apply<T, F>(a: &[T], f: F) -> Vec<T>
where
    T: SimdLane,
    F: Fn(T::Vector) -> T::Vector + Send + Sync,
{
    if a.len() < PARALLEL_THRESHOLD {
        log::trace!(
            "serial dispatch: {} elements below threshold {}",
            a.len(),
            PARALLEL_THRESHOLD
        );
        return simd_apply(a, f);
    }

    let chunk_size = parallel_chunk_size::<T>();
    log::trace!(
        "parallel dispatch: {} elements in chunks of {}",
        a.len(),
        chunk_size
    );

    let mut c = vec![T::ZERO; a.len()];
    c.par_chunks_mut(chunk_size)
        .zip(a.par_chunks(chunk_size))
        .for_each(|(c_chunk, a_chunk)| simd_map(a_chunk, c_chunk, &f));
    c
}

impl<T: SimdLane> SimdPopcount for &[T] {
    type Output = Vec<T>;

    /// Population count of every element, one 128-bit vector at a time.
    fn simd_popcount(self) -> Vec<T> {
        simd_apply(self, SimdVector::popcount)
    }

    /// Same as [`simd_popcount`](SimdPopcount::simd_popcount), split across
    /// threads for inputs of at least [`PARALLEL_THRESHOLD`] elements.
    fn par_simd_popcount(self) -> Vec<T> {
        par_simd_apply(self, SimdVector::popcount)
    }

    fn scalar_popcount(self) -> Vec<T> {
        self.iter().map(|x| Bits::popcount(*x)).collect()
    }
}

impl<T: SimdLane> SimdPopcount for &Vec<T> {
    type Output = Vec<T>;

    fn simd_popcount(self) -> Vec<T> {
        self.as_slice().simd_popcount()
    }

    fn par_simd_popcount(self) -> Vec<T> {
        self.as_slice().par_simd_popcount()
    }

    fn scalar_popcount(self) -> Vec<T> {
        self.as_slice().scalar_popcount()
    }
}

impl<T> SimdDivide<Denominator<T>> for &[T]
where
    T: SimdLane + Divisor,
    T::Vector: Divisor,
    Denominator<T::Vector>: From<Denominator<T>>,
{
    type Output = Vec<T>;

    /// Divides every element by `d`, splatting the precomputed parameters
    /// into each vector lane.
    fn simd_div(self, d: Denominator<T>) -> Vec<T> {
        let d = Denominator::<T::Vector>::from(d);
        simd_apply(self, |v| Divisor::quotient(v, &d))
    }

    fn par_simd_div(self, d: Denominator<T>) -> Vec<T> {
        let d = Denominator::<T::Vector>::from(d);
        par_simd_apply(self, |v| Divisor::quotient(v, &d))
    }

    fn scalar_div(self, d: Denominator<T>) -> Vec<T> {
        self.iter().map(|&x| Divisor::quotient(x, &d)).collect()
    }
}

impl<T> SimdDivide<Denominator<T>> for &Vec<T>
where
    T: SimdLane + Divisor,
    T::Vector: Divisor,
    Denominator<T::Vector>: From<Denominator<T>>,
{
    type Output = Vec<T>;

    fn simd_div(self, d: Denominator<T>) -> Vec<T> {
        self.as_slice().simd_div(d)
    }

    fn par_simd_div(self, d: Denominator<T>) -> Vec<T> {
        self.as_slice().par_simd_div(d)
    }

    fn scalar_div(self, d: Denominator<T>) -> Vec<T> {
        self.as_slice().scalar_div(d)
    }
}

impl<T> SimdDivideInPlace<Denominator<T>> for [T]
where
    T: SimdLane + Divisor,
    T::Vector: Divisor,
    Denominator<T::Vector>: From<Denominator<T>>,
{
    fn simd_div_in_place(&mut self, d: Denominator<T>) {
        let d = Denominator::<T::Vector>::from(d);
        simd_map_in_place(self, |v| Divisor::quotient(v, &d));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    mod popcount_tests {
        use super::*;

        #[test]
        fn test_tail_lengths() {
            let mut rng = StdRng::seed_from_u64(11);
            for len in 0..40 {
                let a: Vec<u16> = (0..len).map(|_| rng.random()).collect();
                let expected = a.scalar_popcount();
                assert_eq!(a.simd_popcount(), expected, "len {len}");
                assert_eq!(a.par_simd_popcount(), expected, "len {len}");
            }
        }

        #[test]
        fn test_parallel_large_input() {
            let mut rng = StdRng::seed_from_u64(12);
            let a: Vec<i64> = (0..PARALLEL_THRESHOLD + 7).map(|_| rng.random()).collect();
            assert_eq!(a.par_simd_popcount(), a.scalar_popcount());
        }
    }

    mod divide_tests {
        use super::*;

        #[test]
        fn test_unsigned_division() {
            let a: Vec<u32> = (0..1000).map(|i| i * 7919).collect();
            let d = Denominator::new(13u32).unwrap();
            let expected: Vec<u32> = a.iter().map(|x| x / 13).collect();
            assert_eq!(a.scalar_div(d), expected);
            assert_eq!(a.simd_div(d), expected);
            assert_eq!(a.par_simd_div(d), expected);
        }

        #[test]
        fn test_signed_parallel_division() {
            let mut rng = StdRng::seed_from_u64(13);
            let a: Vec<i8> = (0..PARALLEL_THRESHOLD + 3).map(|_| rng.random()).collect();
            let d = Denominator::new(-7i8).unwrap();
            let expected: Vec<i8> = a.iter().map(|x| x.wrapping_div(-7)).collect();
            assert_eq!(a.par_simd_div(d), expected);
        }

        #[test]
        fn test_in_place() {
            let mut a: Vec<u64> = (0..21).map(|i| u64::MAX - i).collect();
            let expected: Vec<u64> = a.iter().map(|x| x / 1_000_003).collect();
            a.simd_div_in_place(Denominator::new(1_000_003u64).unwrap());
            assert_eq!(a, expected);
        }
    }
}
