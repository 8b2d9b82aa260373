use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use redapp_bridge::dispatch::Worker;

#[test]
fn submit_runs_on_the_worker_thread() {
    let worker = Worker::spawn();
    let caller = thread::current().id();
    let ran_on = worker.submit(thread::current).id();
    assert_ne!(ran_on, caller);
}

#[test]
fn submit_returns_the_job_result() {
    let worker = Worker::spawn();
    let value = worker.submit(|| 2 + 2);
    assert_eq!(value, 4);

    let text = worker.submit(|| "hello".to_string());
    assert_eq!(text, "hello");
}

#[test]
fn submit_blocks_until_the_job_completes() {
    let worker = Worker::spawn();
    let done = Arc::new(AtomicU64::new(0));
    let in_job = Arc::clone(&done);
    worker.submit(move || {
        thread::sleep(Duration::from_millis(50));
        in_job.store(1, Ordering::SeqCst);
    });
    // submit only returns after the job body ran
    assert_eq!(done.load(Ordering::SeqCst), 1);
}

#[test]
fn submit_borrows_caller_state() {
    let worker = Worker::spawn();
    let mut counter = 0u32;
    worker.submit(|| counter += 1);
    worker.submit(|| counter += 1);
    assert_eq!(counter, 2);
}

#[test]
fn jobs_never_run_concurrently() {
    let worker = Arc::new(Worker::spawn());
    let active = Arc::new(AtomicU64::new(0));
    let max_seen = Arc::new(AtomicU64::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let worker = Arc::clone(&worker);
        let active = Arc::clone(&active);
        let max_seen = Arc::clone(&max_seen);
        handles.push(thread::spawn(move || {
            for _ in 0..25 {
                worker.submit(|| {
                    let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                    max_seen.fetch_max(now, Ordering::SeqCst);
                    active.fetch_sub(1, Ordering::SeqCst);
                });
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(max_seen.load(Ordering::SeqCst), 1);
    assert_eq!(worker.jobs_executed(), 8 * 25);
}

#[test]
fn jobs_executed_counts_each_submission() {
    let worker = Worker::spawn();
    assert_eq!(worker.jobs_executed(), 0);
    worker.submit(|| ());
    worker.submit(|| ());
    worker.submit(|| ());
    assert_eq!(worker.jobs_executed(), 3);
}

#[test]
fn drop_joins_the_worker() {
    let worker = Worker::spawn();
    worker.submit(|| ());
    // must not hang
    drop(worker);
}
