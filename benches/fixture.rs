use criterion::{criterion_group, criterion_main, Criterion};

use rsa_circuit_fixtures::{build_fixture, FixtureParams};

fn bench_fixture(name: &str, c: &mut Criterion) {
    let params = FixtureParams::default();

    let mut group = c.benchmark_group("fixtures");
    // key generation dominates; keep the sample count small
    group.sample_size(10);
    group.bench_function(name, |b| {
        b.iter(|| {
            build_fixture("Hello World", &params).expect("fixture generation should not fail")
        });
    });
    group.finish();
}

fn criterion_benchmark(c: &mut Criterion) {
    let _ = env_logger::try_init();
    bench_fixture("hello-world", c);
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
