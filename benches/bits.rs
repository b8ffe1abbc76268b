//! Population count and leading-zero benchmarks: scalar loop vs vector kernels.
//!
//! Sizes step through the cache hierarchy; `u32` inputs, so 1M elements is
//! 4 MiB of input.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use avel::scalar::Bits;
use avel::simd::{SimdPopcount, U32x4, U32x8};

const VECTOR_SIZES: &[usize] = &[
    1_024,     // 4 KiB - L1 cache
    16_384,    // 64 KiB - L1→L2 transition
    262_144,   // 1 MiB - L2 cache
    4_194_304, // 16 MiB - L3 cache
];

fn generate_test_data(len: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..len).map(|_| rng.random()).collect()
}

fn format_size(elements: usize) -> String {
    let bytes = elements * std::mem::size_of::<u32>();

    if bytes >= 1_048_576 {
        format!("{:.1}_MiB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1}_KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes}_B")
    }
}

fn benchmark_popcount(c: &mut Criterion) {
    for &size in VECTOR_SIZES {
        let mut group = c.benchmark_group(format!("Popcount_{}", format_size(size)));
        group.throughput(Throughput::Bytes((size * std::mem::size_of::<u32>()) as u64));

        let input_vec = generate_test_data(size);
        let input_slice = input_vec.as_slice();

        group.bench_with_input(BenchmarkId::new("scalar", size), input_slice, |b, input| {
            b.iter(|| black_box(black_box(input).scalar_popcount()))
        });

        group.bench_with_input(BenchmarkId::new("simd", size), input_slice, |b, input| {
            b.iter(|| black_box(black_box(input).simd_popcount()))
        });

        group.bench_with_input(
            BenchmarkId::new("parallel SIMD", size),
            input_slice,
            |b, input| b.iter(|| black_box(black_box(input).par_simd_popcount())),
        );

        group.finish();
    }
}

fn benchmark_countl_zero(c: &mut Criterion) {
    let size = 16_384;
    let input_vec = generate_test_data(size);

    let mut group = c.benchmark_group("CountlZero_64.0_KiB");
    group.throughput(Throughput::Bytes((size * std::mem::size_of::<u32>()) as u64));

    group.bench_function("scalar", |b| {
        b.iter(|| {
            black_box(&input_vec)
                .iter()
                .map(|&x| Bits::countl_zero(x))
                .fold(0u32, u32::wrapping_add)
        })
    });

    group.bench_function("U32x4", |b| {
        b.iter(|| {
            black_box(&input_vec)
                .chunks(U32x4::LANES)
                .map(|chunk| U32x4::load(chunk).countl_zero())
                .fold(U32x4::default(), |acc, v| acc + v)
        })
    });

    group.bench_function("U32x8", |b| {
        b.iter(|| {
            black_box(&input_vec)
                .chunks(U32x8::LANES)
                .map(|chunk| U32x8::load(chunk).countl_zero())
                .fold(U32x8::default(), |acc, v| acc + v)
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_popcount, benchmark_countl_zero);
criterion_main!(benches);
