use criterion::{criterion_group, criterion_main, Criterion};
use physics::{SlideModel, SlideSim, Stepper};
use std::sync::Arc;

fn bench_decision_step(c: &mut Criterion) {
    let mut sim = SlideSim::new(Arc::new(SlideModel::maze())).unwrap();
    let controls = [1.0, 0.0, 0.0];
    c.bench_function("slide_advance_half_second", |b| {
        b.iter(|| {
            sim.reset();
            sim.advance(&controls, 0.5).unwrap()
        });
    });
}

criterion_group!(benches, bench_decision_step);
criterion_main!(benches);
