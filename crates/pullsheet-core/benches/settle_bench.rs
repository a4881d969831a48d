//! Benchmarks for the per-frame and per-release hot paths.
//!
//! Run with: cargo bench -p pullsheet-core --bench settle_bench

use criterion::{Criterion, criterion_group, criterion_main};
use pullsheet_core::coupling::{NestedSubMode, ParentPanel, PresentationMode, TransformCoupling};
use pullsheet_core::offsets::OffsetConfiguration;
use pullsheet_core::settle::SettleResolver;
use std::hint::black_box;

fn bench_resolve(c: &mut Criterion) {
    let offsets = OffsetConfiguration::new(48.0, 440.0, 800.0).unwrap();
    let resolver = SettleResolver::default();
    c.bench_function("settle/resolve_sweep", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for i in 0..100 {
                let y = 48.0 + f64::from(i) * 7.5;
                let v = f64::from(i) * 40.0 - 2_000.0;
                acc += resolver.resolve(black_box(y), black_box(v), &offsets) as u32;
            }
            acc
        })
    });
}

fn bench_coupling(c: &mut Criterion) {
    let offsets = OffsetConfiguration::new(48.0, 440.0, 800.0).unwrap();
    let coupling = TransformCoupling::default();
    let nested = PresentationMode::Custom {
        sub_mode: NestedSubMode::PopUp,
        parent: ParentPanel {
            offsets,
            top_y: 48.0,
        },
    };
    let outer = [PresentationMode::Default];

    c.bench_function("coupling/presenter_frame", |b| {
        b.iter(|| coupling.compute_companion_transform(&offsets, black_box(244.0), &PresentationMode::None))
    });
    c.bench_function("coupling/nested_chain_frame", |b| {
        b.iter(|| coupling.couple_chain(&offsets, black_box(244.0), &nested, &outer))
    });
}

criterion_group!(benches, bench_resolve, bench_coupling);
criterion_main!(benches);
