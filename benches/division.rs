//! Division benchmarks: hardware divide, precomputed denominators and the
//! vector long-division fallback.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use avel::denom::Denominator;
use avel::simd::{SimdDivide, U32x4, U64x2};

const VECTOR_SIZES: &[usize] = &[1_024, 65_536, 1_048_576];

const DIVISOR: u32 = 1_000_003;

fn generate_test_data(len: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..len).map(|_| rng.random()).collect()
}

fn benchmark_slice_division(c: &mut Criterion) {
    let denom = Denominator::new(DIVISOR).unwrap();

    for &size in VECTOR_SIZES {
        let mut group = c.benchmark_group(format!("Divide_u32_{size}"));
        group.throughput(Throughput::Elements(size as u64));

        let input_vec = generate_test_data(size);
        let input_slice = input_vec.as_slice();

        group.bench_with_input(BenchmarkId::new("hardware", size), input_slice, |b, input| {
            b.iter(|| {
                black_box(input)
                    .iter()
                    .map(|x| x / black_box(DIVISOR))
                    .collect::<Vec<_>>()
            })
        });

        group.bench_with_input(BenchmarkId::new("scalar", size), input_slice, |b, input| {
            b.iter(|| black_box(black_box(input).scalar_div(denom)))
        });

        group.bench_with_input(BenchmarkId::new("simd", size), input_slice, |b, input| {
            b.iter(|| black_box(black_box(input).simd_div(denom)))
        });

        group.bench_with_input(
            BenchmarkId::new("parallel SIMD", size),
            input_slice,
            |b, input| b.iter(|| black_box(black_box(input).par_simd_div(denom))),
        );

        group.finish();
    }
}

fn benchmark_vector_division(c: &mut Criterion) {
    let mut group = c.benchmark_group("Divide_vector");

    let x = U32x4::from_array([u32::MAX, 123_456_789, 42, 7]);
    let y = U32x4::from_array([3, 1_000, 5, 7]);
    let denom = Denominator::new(y).unwrap();

    group.bench_function("U32x4 long division", |b| {
        b.iter(|| black_box(x) / black_box(y))
    });
    group.bench_function("U32x4 denominator", |b| {
        b.iter(|| black_box(x) / black_box(denom))
    });

    let x = U64x2::from_array([u64::MAX, 1 << 40]);
    let y = U64x2::from_array([10, 12_345]);
    let denom = Denominator::new(y).unwrap();

    group.bench_function("U64x2 long division", |b| {
        b.iter(|| black_box(x) / black_box(y))
    });
    group.bench_function("U64x2 denominator", |b| {
        b.iter(|| black_box(x) / black_box(denom))
    });

    group.finish();
}

criterion_group!(benches, benchmark_slice_division, benchmark_vector_division);
criterion_main!(benches);
