use super::{private, Denominator, Divisor};
use crate::error::{AvelError, Result};
use crate::scalar::Scalar;

/// `d << s` when no set bits are shifted out.
#[inline(always)]
pub(super) fn shift_left_exact<T: Scalar>(d: T, s: u32) -> Option<T> {
    if s >= T::BITS {
        return None;
    }
    let shifted = d << s as usize;
    (shifted >> s as usize == d).then_some(shifted)
}

/// `d >> s` and whether it lost set bits; `None` once nothing is left.
#[inline(always)]
pub(super) fn shift_right_nonzero<T: Scalar>(d: T, s: u32) -> Option<(T, bool)> {
    if s >= T::BITS {
        return None;
    }
    let shifted = d >> s as usize;
    if shifted == T::ZERO {
        return None;
    }
    Some((shifted, shifted << s as usize == d))
}

macro_rules! unsigned_divisor {
    ($($t:ty => $wide:ty),* $(,)?) => {$(
        impl private::Sealed for $t {}

        impl Divisor for $t {
            fn prepare(d: $t) -> Result<Denominator<$t>> {
                if d == 0 {
                    return Err(AvelError::ZeroDivisor);
                }

                // l = ceil(log2(d)), m = floor(2^N * (2^l - d) / d) + 1
                let l = <$t>::BITS - (d - 1).leading_zeros();
                let numerator = (((1 as $wide) << l) - d as $wide) << <$t>::BITS;
                let multiplier = numerator / d as $wide + 1;
                let pre_shift = l.min(1);

                Ok(Denominator {
                    divisor: d,
                    multiplier: multiplier as $t,
                    pre_shift: pre_shift as $t,
                    post_shift: (l - pre_shift) as $t,
                    sign: 0,
                })
            }

            #[inline(always)]
            fn quotient(n: $t, d: &Denominator<$t>) -> $t {
                let t = ((d.multiplier as $wide * n as $wide) >> <$t>::BITS) as $t;
                (t + ((n - t) >> d.pre_shift)) >> d.post_shift
            }

            #[inline(always)]
            fn remainder(n: $t, quotient: $t, d: $t) -> $t {
                n.wrapping_sub(quotient.wrapping_mul(d))
            }

            // Scaling by 2^s leaves the multiplier unchanged and moves only
            // the post shift, unless the divisor is or becomes 1.
            fn rescale_left(d: &Denominator<$t>, s: u32) -> Option<Denominator<$t>> {
                let divisor = shift_left_exact(d.divisor, s)?;
                if d.pre_shift == 1 {
                    Some(Denominator {
                        divisor,
                        post_shift: d.post_shift + s as $t,
                        ..*d
                    })
                } else {
                    Self::prepare(divisor).ok()
                }
            }

            fn rescale_right(d: &Denominator<$t>, s: u32) -> Option<Denominator<$t>> {
                let (divisor, exact) = shift_right_nonzero(d.divisor, s)?;
                if exact && divisor > 1 {
                    Some(Denominator {
                        divisor,
                        post_shift: d.post_shift - s as $t,
                        ..*d
                    })
                } else {
                    Self::prepare(divisor).ok()
                }
            }
        }
    )*};
}

macro_rules! signed_divisor {
    ($($t:ty => $wide:ty),* $(,)?) => {$(
        impl private::Sealed for $t {}

        impl Divisor for $t {
            fn prepare(d: $t) -> Result<Denominator<$t>> {
                if d == 0 {
                    return Err(AvelError::ZeroDivisor);
                }

                // l = max(ceil(log2(|d|)), 1), m = floor(2^(N + l - 1) / |d|) + 1 - 2^N
                let magnitude = d.unsigned_abs();
                let l = (<$t>::BITS - (magnitude - 1).leading_zeros()).max(1);
                let scaled = ((1 as $wide) << (<$t>::BITS - 1 + l)) / magnitude as $wide;
                let multiplier = scaled + 1 - ((1 as $wide) << <$t>::BITS);

                Ok(Denominator {
                    divisor: d,
                    multiplier: multiplier as $t,
                    pre_shift: 0,
                    post_shift: (l - 1) as $t,
                    sign: if d < 0 { -1 } else { 0 },
                })
            }

            #[inline(always)]
            fn quotient(n: $t, d: &Denominator<$t>) -> $t {
                let hi = ((d.multiplier as $wide * n as $wide) >> <$t>::BITS) as $t;
                let q = n.wrapping_add(hi) >> d.post_shift;
                let q = q.wrapping_sub(n >> (<$t>::BITS - 1));
                (q ^ d.sign).wrapping_sub(d.sign)
            }

            #[inline(always)]
            fn remainder(n: $t, quotient: $t, d: $t) -> $t {
                n.wrapping_sub(quotient.wrapping_mul(d))
            }

            fn rescale_left(d: &Denominator<$t>, s: u32) -> Option<Denominator<$t>> {
                let divisor = shift_left_exact(d.divisor, s)?;
                if d.divisor.unsigned_abs() > 1 {
                    Some(Denominator {
                        divisor,
                        post_shift: d.post_shift + s as $t,
                        ..*d
                    })
                } else {
                    Self::prepare(divisor).ok()
                }
            }

            fn rescale_right(d: &Denominator<$t>, s: u32) -> Option<Denominator<$t>> {
                let (divisor, exact) = shift_right_nonzero(d.divisor, s)?;
                if exact && divisor.unsigned_abs() > 1 {
                    Some(Denominator {
                        divisor,
                        post_shift: d.post_shift - s as $t,
                        ..*d
                    })
                } else {
                    Self::prepare(divisor).ok()
                }
            }
        }
    )*};
}

unsigned_divisor!(u8 => u16, u16 => u32, u32 => u64, u64 => u128);
signed_divisor!(i8 => i16, i16 => i32, i32 => i64, i64 => i128);

#[cfg(test)]
mod tests {
    use super::*;

    mod exhaustive_tests {
        use super::*;

        #[test]
        fn test_u8_all_pairs() {
            for d in 1..=u8::MAX {
                let denom = Denominator::new(d).unwrap();
                for n in 0..=u8::MAX {
                    let r = denom.div_rem(n);
                    assert_eq!((r.quot, r.rem), (n / d, n % d), "{n} / {d}");
                }
            }
        }

        #[test]
        fn test_i8_all_pairs() {
            for d in i8::MIN..=i8::MAX {
                if d == 0 {
                    continue;
                }
                let denom = Denominator::new(d).unwrap();
                for n in i8::MIN..=i8::MAX {
                    let r = denom.div_rem(n);
                    assert_eq!(
                        (r.quot, r.rem),
                        (n.wrapping_div(d), n.wrapping_rem(d)),
                        "{n} / {d}"
                    );
                }
            }
        }
    }

    mod edge_tests {
        use super::*;

        #[test]
        fn test_wide_extremes() {
            let numerators = [0u64, 1, 2, 3, u64::MAX, u64::MAX - 1, 1 << 63, (1 << 63) - 1];
            let divisors = [1u64, 2, 3, 7, 10, u64::MAX, 1 << 63, (1 << 32) + 1];
            for &d in &divisors {
                let denom = Denominator::new(d).unwrap();
                for &n in &numerators {
                    assert_eq!(n / denom, n / d, "{n} / {d}");
                }
            }

            let numerators = [0i64, 1, -1, i64::MIN, i64::MAX, -7, 7];
            let divisors = [1i64, -1, 2, -2, 3, -3, i64::MIN, i64::MAX];
            for &d in &divisors {
                let denom = Denominator::new(d).unwrap();
                for &n in &numerators {
                    assert_eq!(n / denom, n.wrapping_div(d), "{n} / {d}");
                    assert_eq!(n % denom, n.wrapping_rem(d), "{n} % {d}");
                }
            }
        }

        #[test]
        fn test_signed_overflow_wraps() {
            let denom = Denominator::new(-1i32).unwrap();
            assert_eq!(i32::MIN / denom, i32::MIN);
            assert_eq!(i32::MIN % denom, 0);
        }
    }

    mod rescale_tests {
        use super::*;

        #[test]
        fn test_rescaled_matches_fresh() {
            for d in 1..=255u8 {
                let denom = Denominator::new(d).unwrap();
                for s in 0..8 {
                    let fresh = shift_left_exact(d, s).map(|v| Denominator::new(v).unwrap());
                    assert_eq!(denom.checked_shl(s), fresh, "{d} << {s}");

                    let fresh = shift_right_nonzero(d, s).map(|(v, _)| Denominator::new(v).unwrap());
                    assert_eq!(denom.checked_shr(s), fresh, "{d} >> {s}");
                }
            }
        }

        #[test]
        fn test_signed_rescale() {
            let denom = Denominator::new(-3i16).unwrap();
            let scaled = denom.checked_shl(4).unwrap();
            assert_eq!(scaled.value(), -48);
            assert_eq!(1000 / scaled, 1000 / -48);
            assert_eq!(denom.checked_shl(15), None);

            let denom = Denominator::new(i16::MIN).unwrap();
            let halved = denom.checked_shr(1).unwrap();
            assert_eq!(halved.value(), -16384);
            assert_eq!(i16::MIN / halved, 2);
        }
    }
}
