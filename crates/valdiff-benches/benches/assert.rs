use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use valdiff_benches::available_corpora;
use valdiff_core::assert::Engine;
use valdiff_core::{AssertOptions, EngineConfig};

fn bench_assert(c: &mut Criterion) {
    let mut group = c.benchmark_group("assert");
    let engine = Engine::default();
    for corpus in available_corpora() {
        let dataset = corpus.load();
        group.bench_with_input(BenchmarkId::from_parameter(corpus.name()), &dataset, |b, dataset| {
            b.iter(|| {
                let outcome = dataset.assert_with(&engine, AssertOptions::default());
                black_box(outcome.is_err());
            });
        });
    }
    group.finish();
}

fn bench_equal(c: &mut Criterion) {
    let mut group = c.benchmark_group("assert-equal");
    let engine = Engine::default();
    for corpus in available_corpora() {
        let dataset = corpus.load();
        group.bench_function(corpus.name(), |b| {
            b.iter(|| {
                let outcome = engine.assert(valdiff_core::assert::AssertArgs::new(
                    dataset.actual().clone(),
                    dataset.actual().clone(),
                ));
                black_box(outcome.is_ok());
            });
        });
    }
    group.finish();
}

fn bench_render_budgets(c: &mut Criterion) {
    let engine = Engine::new(EngineConfig::default().with_color(true));
    let mut group = c.benchmark_group("render-columns");
    for columns in [20, 80, 240] {
        let options = AssertOptions::default().with_max_columns(columns).expect("valid columns");
        for corpus in available_corpora() {
            let dataset = corpus.load();
            group.bench_function(BenchmarkId::new(corpus.name(), columns), |b| {
                b.iter(|| {
                    let outcome = dataset.assert_with(&engine, options.clone());
                    black_box(outcome.is_err());
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_assert, bench_equal, bench_render_budgets);
criterion_main!(benches);
