use criterion::{black_box, criterion_group, criterion_main, Criterion};
use redapp_bridge::dispatch::Worker;

fn bench_submit(c: &mut Criterion) {
    let worker = Worker::spawn();

    c.bench_function("submit_round_trip", |b| {
        b.iter(|| worker.submit(|| black_box(1u64) + 1))
    });

    c.bench_function("submit_with_capture", |b| {
        let payload = vec![0u8; 256];
        b.iter(|| worker.submit(|| black_box(&payload).len()))
    });
}

criterion_group!(benches, bench_submit);
criterion_main!(benches);
