//! Single-worker job dispatcher.
//!
//! JNI environment pointers are thread-affine: the env handed back by VM
//! creation is only usable from the thread that created it. Rather than
//! attach and detach arbitrary caller threads, every JNI operation is
//! packaged as a job and executed on one long-lived worker thread; the
//! submitting thread blocks until its job has run.
//!
//! The worker cycles Idle -> JobAssigned -> Executing -> Idle. An exit
//! request is only honored from Idle and is observed before the job
//! check, so a worker told to exit terminates without running anything
//! further.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use tracing::debug;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct State {
    job: Option<Job>,
    finished: u64,
    exit: bool,
}

struct Shared {
    state: Mutex<State>,
    job_pending: Condvar,
    job_complete: Condvar,
}

/// One worker thread plus the handshake state for submitting jobs to it.
///
/// Dropping the worker requests exit, wakes the thread, and joins it.
pub struct Worker {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn() -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                job: None,
                finished: 0,
                exit: false,
            }),
            job_pending: Condvar::new(),
            job_complete: Condvar::new(),
        });
        let thread_shared = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("jni-worker".to_string())
            .spawn(move || worker_loop(thread_shared))
            .expect("failed to spawn JNI worker thread");
        debug!("JNI worker started");
        Worker {
            shared,
            handle: Some(handle),
        }
    }

    /// Executes `f` on the worker thread and returns its result.
    ///
    /// Blocks the calling thread until the job has run exactly once. May
    /// be called from any number of threads; submitters serialize on the
    /// job slot, and no two jobs ever execute concurrently.
    ///
    /// A job is only ever pending while its submitter is blocked inside
    /// this call, and the shared borrow held by that call keeps the
    /// worker from being dropped until the job has run. Exit (which
    /// wins over a pending job on the worker side) therefore cannot
    /// strand a submitter.
    pub fn submit<R>(&self, f: impl FnOnce() -> R) -> R {
        let mut result: Option<R> = None;
        let slot: *mut Option<R> = &mut result;

        let job: Box<dyn FnOnce() + '_> = Box::new(move || {
            // SAFETY: `slot` points into the submitting thread's stack,
            // which outlives this closure because `submit` does not
            // return until the worker has executed and dropped it.
            unsafe { *slot = Some(f()) };
        });
        // SAFETY: lifetime and Send erasure for the same reason. The
        // closure crosses to the worker thread exactly once and the
        // submitter stays blocked for the entire time it is alive, so no
        // captured reference is used concurrently or after free.
        let job: Job = unsafe { std::mem::transmute(job) };

        let mut state = self.shared.state.lock().unwrap();
        while state.job.is_some() {
            state = self.shared.job_complete.wait(state).unwrap();
        }
        let target = state.finished + 1;
        state.job = Some(job);
        self.shared.job_pending.notify_one();

        while state.finished < target {
            state = self.shared.job_complete.wait(state).unwrap();
        }
        drop(state);

        match result {
            Some(r) => r,
            // the wait above only ends after the job body ran
            None => unreachable!("worker signaled completion without running the job"),
        }
    }

    /// Number of jobs the worker has executed.
    pub fn jobs_executed(&self) -> u64 {
        self.shared.state.lock().unwrap().finished
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock().unwrap();
            state.exit = true;
            self.shared.job_pending.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        debug!("JNI worker stopped");
    }
}

fn worker_loop(shared: Arc<Shared>) {
    let mut state = shared.state.lock().unwrap();
    loop {
        while !state.exit && state.job.is_none() {
            state = shared.job_pending.wait(state).unwrap();
        }
        // exit wins over a pending job
        if state.exit {
            return;
        }
        let job = match state.job.take() {
            Some(job) => job,
            None => continue,
        };
        // The job runs while the state lock is held. That keeps the
        // whole cycle under one mutex: a submitter cannot store the next
        // job until this one has finished and been flagged complete.
        job();
        state.finished += 1;
        shared.job_complete.notify_all();
    }
}
