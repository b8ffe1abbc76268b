//! Bulk slice operations: serial, SIMD and parallel variants must agree.

use avel::denom::Denominator;
use avel::simd::{SimdDivide, SimdDivideInPlace, SimdPopcount};
use avel::PARALLEL_THRESHOLD;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SIZES: [usize; 8] = [1, 3, 15, 16, 17, 1000, PARALLEL_THRESHOLD - 1, PARALLEL_THRESHOLD + 33];

macro_rules! slice_tests {
    ($($module:ident: $t:ty);* $(;)?) => {$(
        mod $module {
            use super::*;

            #[test_log::test]
            fn test_popcount_variants_agree() {
                let mut rng = StdRng::seed_from_u64(<$t>::BITS as u64);
                for size in SIZES {
                    let a: Vec<$t> = (0..size).map(|_| rng.random()).collect();
                    let expected: Vec<$t> = a.iter().map(|x| x.count_ones() as $t).collect();

                    assert_eq!(a.scalar_popcount(), expected, "size {size}");
                    assert_eq!(a.simd_popcount(), expected, "size {size}");
                    assert_eq!(a.par_simd_popcount(), expected, "size {size}");
                }
            }

            #[test_log::test]
            fn test_division_variants_agree() {
                let mut rng = StdRng::seed_from_u64(7 + <$t>::BITS as u64);
                for size in SIZES {
                    let a: Vec<$t> = (0..size).map(|_| rng.random()).collect();
                    let d: $t = match rng.random() {
                        0 => 3,
                        d => d,
                    };
                    let denom = Denominator::new(d).unwrap();
                    let expected: Vec<$t> = a.iter().map(|x| x.wrapping_div(d)).collect();

                    assert_eq!(a.scalar_div(denom), expected, "size {size}, d {d}");
                    assert_eq!(a.simd_div(denom), expected, "size {size}, d {d}");
                    assert_eq!(a.par_simd_div(denom), expected, "size {size}, d {d}");

                    let mut b = a.clone();
                    b.simd_div_in_place(denom);
                    assert_eq!(b, expected, "size {size}, d {d}");
                }
            }
        }
    )*};
}

slice_tests!(
    slice_u8: u8;
    slice_i8: i8;
    slice_u16: u16;
    slice_i16: i16;
    slice_u32: u32;
    slice_i32: i32;
    slice_u64: u64;
    slice_i64: i64;
);

#[test]
fn test_empty_slices() {
    let empty: &[u32] = &[];
    assert!(empty.simd_popcount().is_empty());
    assert!(empty.par_simd_popcount().is_empty());
    assert!(empty.simd_div(Denominator::new(5).unwrap()).is_empty());
}

#[test]
fn test_in_place_on_subslice() {
    let mut a: Vec<i32> = (-10..10).collect();
    a[5..13].simd_div_in_place(Denominator::new(-2).unwrap());

    let expected: Vec<i32> = (-10..10)
        .enumerate()
        .map(|(i, x)| if (5..13).contains(&i) { x / -2 } else { x })
        .collect();
    assert_eq!(a, expected);
}
