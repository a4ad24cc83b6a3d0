use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crossbeam::channel;
use sieve_pipeline::{PassthroughStage, PipelineBuilder, ShutdownSignal};
use std::thread;
use std::time::Duration;

/// Push `count` values through `builder` and drain the output to completion.
fn drive(builder: PipelineBuilder, count: i64) -> usize {
    let shutdown = ShutdownSignal::new();
    let (tx, rx) = channel::bounded(0);
    let running = builder
        .build()
        .expect("Build failed")
        .start(rx, &shutdown)
        .expect("Start failed");

    let feeder = thread::spawn(move || {
        for i in 0..count {
            if tx.send(black_box(i)).is_err() {
                break;
            }
        }
    });

    let received = running.output().iter().count();
    let _ = feeder.join();
    let _ = running.join();
    received
}

fn benchmark_single_stage_throughput(c: &mut Criterion) {
    c.bench_function("single_stage_1000_values", |b| {
        b.iter(|| drive(PipelineBuilder::new().add_stage(PassthroughStage), 1000));
    });
}

fn benchmark_default_filters_throughput(c: &mut Criterion) {
    c.bench_function("default_filters_1000_values", |b| {
        b.iter(|| drive(PipelineBuilder::default_filters(), 1000));
    });
}

fn benchmark_deep_chain_throughput(c: &mut Criterion) {
    c.bench_function("eight_stage_5000_values", |b| {
        b.iter(|| {
            let builder = (0..8).fold(PipelineBuilder::new(), |builder, _| {
                builder.add_stage(PassthroughStage)
            });
            drive(builder, 5000)
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(10));
    targets = benchmark_single_stage_throughput, benchmark_default_filters_throughput, benchmark_deep_chain_throughput
);
criterion_main!(benches);
