use std::hint::black_box;

use chol_wishart::stream::SharedStream;
use chol_wishart::CholWishart;
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use ndarray::Array2;

const N: i64 = 1_000;

fn scale(p: usize) -> Array2<f64> {
  Array2::from_shape_fn((p, p), |(i, j)| if i == j { 2.0 } else { 0.5 })
}

fn bench_factors(c: &mut Criterion) {
  let mut group = c.benchmark_group("CholWishart");
  let stream = SharedStream::seed_from_u64(42);

  for p in [2usize, 5, 10, 25] {
    let df = p as f64 + 3.0;
    let sampler = CholWishart::new(N, df, scale(p));
    let inverse = CholWishart::new(N, df, scale(p)).inverse();

    group.bench_with_input(BenchmarkId::new("cholesky", p), &p, |b, _| {
      b.iter(|| black_box(sampler.sample_with(&stream).unwrap()))
    });
    group.bench_with_input(BenchmarkId::new("inverse", p), &p, |b, _| {
      b.iter(|| black_box(inverse.sample_with(&stream).unwrap()))
    });
  }

  group.finish();
}

criterion_group!(benches, bench_factors);
criterion_main!(benches);
