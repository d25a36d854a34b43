//! Worker thread - runs searches off the frame loop
//!
//! Each AI owns one [`AiWorker`]. The frame loop only ever drops a job into
//! a one-slot mailbox (a newer job replaces an unconsumed older one) and
//! reads the latest published [`Decision`]; it never waits for the worker.
//!
//! One loop iteration does exactly one of:
//!
//! - build: when the build flag was raised (the flag is cleared first)
//! - think: when a job is waiting (the slot is emptied first)
//! - park: otherwise, until a request unparks the thread
//!
//! Failures inside `build`/`think`, panics included, are logged and the
//! loop keeps going.
//!
//! With threading disabled the worker runs inline: requests are computed
//! immediately on the caller's thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error};

use crate::decision::{Decision, ThinkJob};
use crate::error::AiError;

/// Longest idle park before the loop re-checks its flags
const IDLE_PARK: Duration = Duration::from_millis(50);

/// A search engine the worker can drive
pub trait Thinker: Send + 'static {
    fn think(&mut self, job: &ThinkJob) -> Result<Decision, AiError>;

    /// One-time preparation, e.g. building lookup tables.
    ///
    /// Repeated calls after a successful build must be cheap no-ops.
    fn build(&mut self) -> Result<(), AiError> {
        Ok(())
    }
}

#[derive(Default)]
struct Shared {
    running: AtomicBool,
    build_requested: AtomicBool,
    job: Mutex<Option<ThinkJob>>,
    decision: Mutex<Option<Arc<Decision>>>,
    /// Highest piece id with a published decision
    completed: AtomicU64,
}

impl Shared {
    fn publish(&self, decision: Decision) {
        let piece_id = decision.piece_id;
        *lock(&self.decision) = Some(Arc::new(decision));
        self.completed.fetch_max(piece_id, Ordering::AcqRel);
    }
}

enum Mode<T> {
    Threaded(Option<JoinHandle<()>>),
    Inline(T),
}

pub struct AiWorker<T: Thinker> {
    shared: Arc<Shared>,
    mode: Mode<T>,
}

impl<T: Thinker> AiWorker<T> {
    /// Start a dedicated worker thread owning `thinker`
    pub fn spawn(name: &str, thinker: T, delay: Duration) -> Result<Self, AiError> {
        let shared = Arc::new(Shared::default());
        shared.running.store(true, Ordering::Release);

        let loop_shared = Arc::clone(&shared);
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || run(loop_shared, thinker, delay))?;
        debug!("started ai worker {}", name);

        Ok(Self {
            shared,
            mode: Mode::Threaded(Some(handle)),
        })
    }

    /// Compute requests on the caller's thread
    pub fn inline(thinker: T) -> Self {
        let shared = Arc::new(Shared::default());
        shared.running.store(true, Ordering::Release);
        Self {
            shared,
            mode: Mode::Inline(thinker),
        }
    }

    pub fn is_threaded(&self) -> bool {
        matches!(self.mode, Mode::Threaded(_))
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Ask for a decision for `job.piece_id`, replacing any waiting job
    pub fn request_think(&mut self, job: ThinkJob) -> Result<(), AiError> {
        if !self.is_running() {
            return Err(AiError::NotRunning);
        }
        match &mut self.mode {
            Mode::Threaded(handle) => {
                *lock(&self.shared.job) = Some(job);
                if let Some(handle) = handle {
                    handle.thread().unpark();
                }
            }
            Mode::Inline(thinker) => think_once(&self.shared, thinker, &job),
        }
        Ok(())
    }

    /// Ask for [`Thinker::build`] to run before the next search
    pub fn request_build(&mut self) -> Result<(), AiError> {
        if !self.is_running() {
            return Err(AiError::NotRunning);
        }
        match &mut self.mode {
            Mode::Threaded(handle) => {
                self.shared.build_requested.store(true, Ordering::Release);
                if let Some(handle) = handle {
                    handle.thread().unpark();
                }
            }
            Mode::Inline(thinker) => build_once(thinker),
        }
        Ok(())
    }

    /// Most recently published decision
    pub fn latest(&self) -> Option<Arc<Decision>> {
        lock(&self.shared.decision).clone()
    }

    /// Highest piece id a decision was published for
    pub fn completed(&self) -> u64 {
        self.shared.completed.load(Ordering::Acquire)
    }

    /// Stop the loop and join the thread; in-flight work is discarded
    pub fn shutdown(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        lock(&self.shared.job).take();
        if let Mode::Threaded(handle) = &mut self.mode {
            if let Some(handle) = handle.take() {
                handle.thread().unpark();
                let name = handle.thread().name().unwrap_or("ai").to_string();
                if handle.join().is_err() {
                    error!("ai worker {} terminated abnormally", name);
                } else {
                    debug!("ai worker {} stopped", name);
                }
            }
        }
    }
}

impl<T: Thinker> Drop for AiWorker<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run<T: Thinker>(shared: Arc<Shared>, mut thinker: T, delay: Duration) {
    while shared.running.load(Ordering::Acquire) {
        if shared.build_requested.swap(false, Ordering::AcqRel) {
            build_once(&mut thinker);
            pause(delay);
            continue;
        }

        let job = lock(&shared.job).take();
        match job {
            Some(job) => {
                think_once(&shared, &mut thinker, &job);
                pause(delay);
            }
            None => thread::park_timeout(IDLE_PARK),
        }
    }
}

fn think_once<T: Thinker>(shared: &Shared, thinker: &mut T, job: &ThinkJob) {
    match guarded(|| thinker.think(job)) {
        Ok(decision) => shared.publish(decision),
        Err(e) => error!("think for piece {} failed: {}", job.piece_id, e),
    }
}

fn build_once<T: Thinker>(thinker: &mut T) {
    if let Err(e) = guarded(|| thinker.build()) {
        error!("ai build failed: {}", e);
    }
}

/// Run `f`, turning a panic into [`AiError::Panicked`]
fn guarded<R>(f: impl FnOnce() -> Result<R, AiError>) -> Result<R, AiError> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(AiError::Panicked(message))
        }
    }
}

fn pause(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

/// Lock ignoring poisoning; the guarded data is always left consistent
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbot_core::types::PieceKind;
    use blockbot_core::Board;
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    struct Echo {
        builds: Arc<AtomicUsize>,
    }

    impl Thinker for Echo {
        fn think(&mut self, job: &ThinkJob) -> Result<Decision, AiError> {
            if job.piece == PieceKind::Z {
                panic!("bad piece");
            }
            if job.piece == PieceKind::S {
                return Err(AiError::NotRunning);
            }
            let mut d = Decision::not_found(job.piece_id, job.piece);
            d.found = true;
            Ok(d)
        }

        fn build(&mut self) -> Result<(), AiError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn job(piece_id: u64, piece: PieceKind) -> ThinkJob {
        ThinkJob {
            piece_id,
            board: Board::new(),
            piece,
            hold: None,
            hold_allowed: true,
            next: vec![],
        }
    }

    fn wait_for(worker: &AiWorker<Echo>, piece_id: u64) -> bool {
        let start = Instant::now();
        while start.elapsed() < Duration::from_secs(5) {
            if worker.completed() >= piece_id {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_inline_publishes_immediately() {
        let builds = Arc::new(AtomicUsize::new(0));
        let mut worker = AiWorker::inline(Echo {
            builds: Arc::clone(&builds),
        });
        assert!(worker.latest().is_none());

        worker.request_build().unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        worker.request_think(job(3, PieceKind::T)).unwrap();
        assert_eq!(worker.completed(), 3);
        assert_eq!(worker.latest().unwrap().piece, PieceKind::T);
    }

    #[test]
    fn test_thread_survives_panics_and_errors() {
        let builds = Arc::new(AtomicUsize::new(0));
        let mut worker = AiWorker::spawn(
            "test-ai",
            Echo {
                builds: Arc::clone(&builds),
            },
            Duration::ZERO,
        )
        .unwrap();
        assert!(worker.is_threaded());

        worker.request_build().unwrap();
        worker.request_think(job(1, PieceKind::Z)).unwrap();
        thread::sleep(Duration::from_millis(50));
        worker.request_think(job(2, PieceKind::S)).unwrap();
        thread::sleep(Duration::from_millis(50));
        worker.request_think(job(3, PieceKind::L)).unwrap();

        assert!(wait_for(&worker, 3));
        let latest = worker.latest().unwrap();
        assert_eq!(latest.piece_id, 3);
        assert!(latest.found);
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        worker.shutdown();
        assert!(!worker.is_running());
        assert!(matches!(
            worker.request_think(job(4, PieceKind::T)),
            Err(AiError::NotRunning)
        ));
    }
}
