use criterion::{black_box, criterion_group, criterion_main, Criterion};
use service_utils::ErrorChain;

fn deep_chain(depth: usize) -> (ErrorChain, ErrorChain) {
    let root = ErrorChain::new("Failed to open file");
    let mut err = root.clone();
    for i in 0..depth {
        err = err.add_context(format!("Layer {}", i));
    }
    (root, err)
}

fn create_benchmark(c: &mut Criterion) {
    c.bench_function("error chain new", |b| {
        b.iter(|| ErrorChain::new(black_box("Failed to open file")));
    });

    c.bench_function("error chain new fmt", |b| {
        b.iter(|| ErrorChain::new_fmt(format_args!("Failed to open file={}", black_box("test.csv"))));
    });
}

fn annotate_benchmark(c: &mut Criterion) {
    let err = ErrorChain::new("Failed to open file");

    c.bench_function("error chain add context", |b| {
        b.iter(|| black_box(&err).add_context("Get users"));
    });

    c.bench_function("error chain add stack trace", |b| {
        b.iter(|| black_box(&err).add_stack_trace("Get users"));
    });
}

fn inspect_benchmark(c: &mut Criterion) {
    let (root, err) = deep_chain(16);

    c.bench_function("error chain root cause", |b| {
        b.iter(|| black_box(&err).root_cause());
    });

    c.bench_function("error chain detail", |b| {
        b.iter(|| black_box(&err).detail().to_string());
    });

    c.bench_function("error chain is", |b| {
        b.iter(|| black_box(&err).is(black_box(&root)));
    });

    c.bench_function("error chain to string", |b| {
        b.iter(|| black_box(&err).to_string());
    });
}

criterion_group!(benches, create_benchmark, annotate_benchmark, inspect_benchmark);
criterion_main!(benches);
