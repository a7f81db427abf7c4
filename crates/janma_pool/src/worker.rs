//! Worker threads, each owning one [`EphemerisClient`].
//!
//! A worker is a plain OS thread draining a bounded tokio channel with
//! `blocking_recv`, so backend calls never run on the async runtime and
//! never run concurrently on one instance. Jobs whose caller has already
//! gone away are dropped unexecuted. A panicking job recycles the client.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, AtomicU64, AtomicUsize, Ordering};
use std::thread::JoinHandle;

use janma_ephem::{ClientStats, EphemerisClient, EphemerisError};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Lifecycle of a worker's backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerStatus {
    /// Not yet warmed up.
    Starting,
    /// Backend loaded and answering.
    Up,
    /// Last attempt to load or use the backend failed.
    Down,
}

impl WorkerStatus {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => Self::Up,
            2 => Self::Down,
            _ => Self::Starting,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Up => 1,
            Self::Down => 2,
        }
    }
}

/// State shared between a worker thread and the pool.
#[derive(Debug, Default)]
pub struct WorkerState {
    status: AtomicU8,
    pub(crate) queued: AtomicUsize,
    completed: AtomicU64,
    skipped: AtomicU64,
    panics: AtomicU64,
    recycles: AtomicU64,
}

impl WorkerState {
    pub fn status(&self) -> WorkerStatus {
        WorkerStatus::from_u8(self.status.load(Ordering::Acquire))
    }

    fn set_status(&self, status: WorkerStatus) {
        self.status.store(status.as_u8(), Ordering::Release);
    }

    /// Jobs accepted but not yet dequeued.
    pub fn queued(&self) -> usize {
        self.queued.load(Ordering::Acquire)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Jobs dropped because their caller had timed out.
    pub fn skipped(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn panics(&self) -> u64 {
        self.panics.load(Ordering::Relaxed)
    }

    /// Backend instances discarded after faults.
    pub fn recycles(&self) -> u64 {
        self.recycles.load(Ordering::Relaxed)
    }
}

/// A unit of work for one worker.
pub(crate) trait Job: Send {
    /// The caller stopped waiting.
    fn is_abandoned(&self) -> bool;
    fn run(self: Box<Self>, client: &mut EphemerisClient);
}

pub(crate) struct Task<T, F> {
    f: F,
    reply: oneshot::Sender<Result<T, EphemerisError>>,
}

impl<T, F> Task<T, F> {
    pub(crate) fn new(f: F, reply: oneshot::Sender<Result<T, EphemerisError>>) -> Self {
        Self { f, reply }
    }
}

impl<T, F> Job for Task<T, F>
where
    T: Send,
    F: FnOnce(&mut EphemerisClient) -> Result<T, EphemerisError> + Send,
{
    fn is_abandoned(&self) -> bool {
        self.reply.is_closed()
    }

    fn run(self: Box<Self>, client: &mut EphemerisClient) {
        let Task { f, reply } = *self;
        // The receiver may have timed out meanwhile; nothing to report then.
        let _ = reply.send(f(client));
    }
}

pub(crate) type BoxedJob = Box<dyn Job>;

/// Pool-side handle of one worker.
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    pub(crate) id: usize,
    pub(crate) tx: mpsc::Sender<BoxedJob>,
    pub(crate) state: Arc<WorkerState>,
    pub(crate) thread: Option<JoinHandle<()>>,
}

/// Spawn worker `id` around `client`.
pub(crate) fn spawn(
    id: usize,
    client: EphemerisClient,
    queue_capacity: usize,
) -> std::io::Result<WorkerHandle> {
    let (tx, rx) = mpsc::channel(queue_capacity);
    let state = Arc::new(WorkerState::default());
    let thread_state = Arc::clone(&state);
    let thread = std::thread::Builder::new()
        .name(format!("janma-worker-{id}"))
        .spawn(move || run(id, client, rx, &thread_state))?;
    Ok(WorkerHandle {
        id,
        tx,
        state,
        thread: Some(thread),
    })
}

fn run(id: usize, mut client: EphemerisClient, mut rx: mpsc::Receiver<BoxedJob>, state: &WorkerState) {
    warm_up(id, &mut client, state);
    while let Some(job) = rx.blocking_recv() {
        state.queued.fetch_sub(1, Ordering::AcqRel);
        if job.is_abandoned() {
            state.skipped.fetch_add(1, Ordering::Relaxed);
            debug!(worker = id, "skipping abandoned job");
            continue;
        }

        let before = client.stats();
        let outcome = catch_unwind(AssertUnwindSafe(|| job.run(&mut client)));
        state.completed.fetch_add(1, Ordering::Relaxed);

        match outcome {
            Ok(()) => {
                let after = client.stats();
                if failed(before, after) {
                    state
                        .recycles
                        .fetch_add(after.recycles - before.recycles, Ordering::Relaxed);
                    state.set_status(WorkerStatus::Down);
                    warm_up(id, &mut client, state);
                } else if after.backend_calls > before.backend_calls {
                    state.set_status(WorkerStatus::Up);
                }
            }
            Err(_) => {
                state.panics.fetch_add(1, Ordering::Relaxed);
                state.recycles.fetch_add(1, Ordering::Relaxed);
                error!(worker = id, "backend panicked; recycling instance");
                client.recycle();
                state.set_status(WorkerStatus::Down);
                warm_up(id, &mut client, state);
            }
        }
    }
    info!(worker = id, "worker stopped");
}

fn failed(before: ClientStats, after: ClientStats) -> bool {
    after.init_failures > before.init_failures || after.recycles > before.recycles
}

fn warm_up(id: usize, client: &mut EphemerisClient, state: &WorkerState) {
    match client.warm_up() {
        Ok(bundle) => {
            debug!(worker = id, %bundle, "backend ready");
            state.set_status(WorkerStatus::Up);
        }
        Err(e) => {
            warn!(worker = id, error = %e, "backend warm-up failed");
            state.set_status(WorkerStatus::Down);
        }
    }
}
