//! Benchmarks for head-and-shoulders scanning.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hspd::prelude::*;

/// Simple test bar structure
#[derive(Debug, Clone, Copy)]
struct TestBar {
  c: f64,
  v: f64,
}

impl OHLCV for TestBar {
  fn open(&self) -> f64 {
    self.c
  }

  fn high(&self) -> f64 {
    self.c
  }

  fn low(&self) -> f64 {
    self.c
  }

  fn close(&self) -> f64 {
    self.c
  }

  fn volume(&self) -> f64 {
    self.v
  }
}

/// Generate a wavy close series with deterministic noise
fn generate_bars(n: usize) -> Vec<TestBar> {
  let mut bars = Vec::with_capacity(n);

  for i in 0..n {
    let wave = 10.0 * ((i as f64) * 0.21).sin() + 4.0 * ((i as f64) * 0.05).cos();
    let noise = ((i * 7 + 13) % 100) as f64 / 50.0 - 1.0; // Deterministic "random"
    let v = 500_000.0 + ((i * 31) % 20) as f64 * 50_000.0;

    bars.push(TestBar { c: 100.0 + wave + noise, v });
  }

  bars
}

fn bench_scan(c: &mut Criterion) {
  let bars = generate_bars(1000);
  let engine = EngineBuilder::new().build().unwrap();

  c.bench_function("scan_1000_bars", |b| {
    b.iter(|| {
      let _ = black_box(engine.scan(black_box(&bars)));
    })
  });
}

fn bench_scan_raw(c: &mut Criterion) {
  let bars = generate_bars(1000);
  let engine = EngineBuilder::new().build().unwrap();

  c.bench_function("scan_raw_1000_bars", |b| {
    b.iter(|| {
      let _ = black_box(engine.scan_raw(black_box(&bars)));
    })
  });
}

fn bench_scaling(c: &mut Criterion) {
  let engine = EngineBuilder::new().build().unwrap();

  let mut group = c.benchmark_group("scaling");

  for size in [100, 500, 1000, 5000, 10000].iter() {
    let bars = generate_bars(*size);

    group.bench_with_input(BenchmarkId::new("scan", size), size, |b, _| {
      b.iter(|| {
        let _ = black_box(engine.scan(black_box(&bars)));
      })
    });
  }

  group.finish();
}

fn bench_parallel_scan(c: &mut Criterion) {
  let bars1 = generate_bars(1000);
  let bars2 = generate_bars(1200);
  let bars3 = generate_bars(1400);
  let bars4 = generate_bars(1600);

  let engine = EngineBuilder::new().build().unwrap();

  let instruments: Vec<(&str, &[TestBar])> =
    vec![("SYM1", &bars1), ("SYM2", &bars2), ("SYM3", &bars3), ("SYM4", &bars4)];

  c.bench_function("parallel_scan_4_instruments", |b| {
    b.iter(|| {
      let _ = black_box(scan_parallel(black_box(&engine), black_box(instruments.clone())));
    })
  });
}

fn bench_scan_at(c: &mut Criterion) {
  let bars = generate_bars(1000);
  let engine = EngineBuilder::new().build().unwrap();

  c.bench_function("scan_at_single_center", |b| {
    b.iter(|| {
      let _ = black_box(engine.scan_at(black_box(&bars), black_box(500)));
    })
  });
}

criterion_group!(benches, bench_scan, bench_scan_raw, bench_scaling, bench_parallel_scan, bench_scan_at);

criterion_main!(benches);
