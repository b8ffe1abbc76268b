//! Denominator division against `wrapping_div`/`wrapping_rem`, for scalars and
//! for every vector width.

use avel::denom::{self, Denominator};
use avel::simd::*;
use avel::AvelError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

macro_rules! scalar_tests {
    ($($module:ident: $t:ty);* $(;)?) => {$(
        mod $module {
            use super::*;

            fn divisors(rng: &mut StdRng) -> Vec<$t> {
                let mut out = vec![1, 2, 3, 7, 10, <$t>::MAX, <$t>::MAX - 1, <$t>::MIN];
                // powers of two and their neighbours
                for s in 0..<$t>::BITS {
                    let p = (1 as $t) << s;
                    out.extend([p, p.wrapping_add(1), p.wrapping_sub(1)]);
                }
                out.extend((0..200).map(|_| rng.random::<$t>()));
                out.retain(|&d| d != 0);
                out
            }

            #[test]
            fn test_matches_wrapping_division() {
                let mut rng = StdRng::seed_from_u64(<$t>::BITS as u64);
                for d in divisors(&mut rng) {
                    let denom = Denominator::new(d).unwrap();
                    assert_eq!(denom.value(), d);
                    for _ in 0..64 {
                        let n: $t = rng.random();
                        let r = denom::div(n, denom);
                        assert_eq!(r.quot, n.wrapping_div(d), "{n} / {d}");
                        assert_eq!(r.rem, n.wrapping_rem(d), "{n} % {d}");
                    }
                    for n in [0, 1, <$t>::MAX, <$t>::MIN] {
                        assert_eq!(n / denom, n.wrapping_div(d), "{n} / {d}");
                        assert_eq!(n % denom, n.wrapping_rem(d), "{n} % {d}");
                    }
                }
            }

            #[test]
            fn test_rescaling() {
                let mut rng = StdRng::seed_from_u64(3 + <$t>::BITS as u64);
                for d in divisors(&mut rng) {
                    let denom = Denominator::new(d).unwrap();
                    for s in 0..<$t>::BITS + 1 {
                        match denom.checked_shl(s) {
                            Some(scaled) => {
                                let expected = d << s;
                                assert_eq!(expected >> s, d);
                                assert_eq!(scaled.value(), expected);
                                let n: $t = rng.random();
                                assert_eq!(n / scaled, n.wrapping_div(expected), "{n} / ({d} << {s})");
                            }
                            None => assert!(s >= <$t>::BITS || (d << s) >> s != d, "{d} << {s}"),
                        }

                        match denom.checked_shr(s) {
                            Some(scaled) => {
                                let expected = d >> s;
                                assert_eq!(scaled.value(), expected);
                                let n: $t = rng.random();
                                assert_eq!(n % scaled, n.wrapping_rem(expected), "{n} % ({d} >> {s})");
                            }
                            None => assert!(s >= <$t>::BITS || d >> s == 0, "{d} >> {s}"),
                        }
                    }
                }
            }

            #[test]
            fn test_zero_rejected() {
                assert_eq!(Denominator::<$t>::new(0), Err(AvelError::ZeroDivisor));
            }
        }
    )*};
}

scalar_tests!(
    scalar_u8: u8;
    scalar_i8: i8;
    scalar_u16: u16;
    scalar_i16: i16;
    scalar_u32: u32;
    scalar_i32: i32;
    scalar_u64: u64;
    scalar_i64: i64;
);

macro_rules! vector_tests {
    ($($module:ident: $v:ident, $t:ty, $n:literal);* $(;)?) => {$(
        mod $module {
            use super::*;

            #[test]
            fn test_per_lane_divisors() {
                let mut rng = StdRng::seed_from_u64(100 + $n);
                for _ in 0..200 {
                    let d: [$t; $n] = std::array::from_fn(|_| match rng.random::<$t>() {
                        0 => 1,
                        x => x >> rng.random_range(0..<$t>::BITS - 1),
                    });
                    let d: [$t; $n] = d.map(|x| if x == 0 { 1 } else { x });
                    let n: [$t; $n] = std::array::from_fn(|_| rng.random());

                    let denom = Denominator::new($v::from_array(d)).unwrap();
                    let r = denom.div_rem($v::from_array(n));
                    let quot: [$t; $n] = std::array::from_fn(|i| n[i].wrapping_div(d[i]));
                    let rem: [$t; $n] = std::array::from_fn(|i| n[i].wrapping_rem(d[i]));
                    assert_eq!(r.quot.to_array(), quot);
                    assert_eq!(r.rem.to_array(), rem);
                }
            }

            #[test]
            fn test_splat_and_assign_ops() {
                let denom = Denominator::new(3 as $t).unwrap();
                let splat = Denominator::<$v>::from(denom);
                assert_eq!(splat.value(), $v::splat(3));

                let mut x = $v::splat(100);
                x /= splat;
                assert_eq!(x, $v::splat(33));
                x %= splat;
                assert_eq!(x, $v::splat(0));
            }

            #[test]
            fn test_zero_lane_rejected() {
                let mut d = [1 as $t; $n];
                d[$n / 2] = 0;
                assert_eq!(Denominator::new($v::from_array(d)), Err(AvelError::ZeroDivisor));
            }
        }
    )*};
}

vector_tests!(
    vector_u8x16: U8x16, u8, 16;
    vector_i8x16: I8x16, i8, 16;
    vector_u16x8: U16x8, u16, 8;
    vector_i16x8: I16x8, i16, 8;
    vector_u32x4: U32x4, u32, 4;
    vector_i32x4: I32x4, i32, 4;
    vector_u64x2: U64x2, u64, 2;
    vector_i64x2: I64x2, i64, 2;
    vector_u8x32: U8x32, u8, 32;
    vector_i8x32: I8x32, i8, 32;
    vector_u16x16: U16x16, u16, 16;
    vector_i16x16: I16x16, i16, 16;
    vector_u32x8: U32x8, u32, 8;
    vector_i32x8: I32x8, i32, 8;
    vector_u64x4: U64x4, u64, 4;
    vector_i64x4: I64x4, i64, 4;
);

#[test]
fn test_signed_vector_min_over_minus_one() {
    let denom = Denominator::new(I32x8::splat(-1)).unwrap();
    let r = denom.div_rem(I32x8::splat(i32::MIN));
    assert_eq!(r.quot, I32x8::splat(i32::MIN));
    assert_eq!(r.rem, I32x8::default());
}
