//! Single-flight run coordination.
//!
//! Each launch supersedes the previous run: the old task is aborted and a new
//! [`RunId`] becomes current. A run may only publish while it is still
//! current, and the check and the publish happen under the same lock that
//! launches and cancellations take, so a superseded run can never win.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Identifies one run; later runs have larger ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u64);

impl RunId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run#{}", self.0)
    }
}

#[derive(Debug, Default)]
struct Slot {
    last_issued: u64,
    current: Option<RunId>,
    task: Option<JoinHandle<()>>,
}

impl Slot {
    /// Abort the current task if it has not finished yet
    fn abort_current(&mut self) -> Option<RunId> {
        let run = self.current.take()?;
        match self.task.take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                Some(run)
            }
            _ => None,
        }
    }
}

/// At most one active run, spawned on an injected executor
#[derive(Debug)]
pub struct SingleFlight {
    executor: Handle,
    slot: Mutex<Slot>,
}

impl SingleFlight {
    pub fn new(executor: Handle) -> Self {
        Self {
            executor,
            slot: Mutex::new(Slot::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel the active run, if any, and start a new one
    ///
    /// `start` runs under the lock before the task is spawned, so anything it
    /// publishes is ordered before whatever the new run publishes. Returns the
    /// new run and the run it cut short.
    pub fn launch<F, Fut>(&self, start: F) -> (RunId, Option<RunId>)
    where
        F: FnOnce(RunId) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.lock();
        let superseded = slot.abort_current();

        slot.last_issued += 1;
        let run = RunId(slot.last_issued);
        slot.current = Some(run);

        let future = start(run);
        slot.task = Some(self.executor.spawn(future));

        debug!(%run, superseded = ?superseded, "Run launched");
        (run, superseded)
    }

    /// Cancel the active run without starting another
    ///
    /// `on_cancel` always runs under the lock, with the run that was cut
    /// short or `None` when nothing was in flight.
    pub fn cancel<F>(&self, on_cancel: F) -> Option<RunId>
    where
        F: FnOnce(Option<RunId>),
    {
        let mut slot = self.lock();
        let cancelled = slot.abort_current();
        if let Some(run) = cancelled {
            debug!(%run, "Run cancelled");
        }
        on_cancel(cancelled);
        cancelled
    }

    /// Run `publish` only if `run` is still the current run
    ///
    /// A run publishes at most once. Afterwards it is no longer current, so a
    /// later `cancel` cannot turn a finished run into a cancelled one.
    pub fn publish_if_current<F>(&self, run: RunId, publish: F) -> bool
    where
        F: FnOnce(),
    {
        let mut slot = self.lock();
        if slot.current != Some(run) {
            debug!(%run, "Discarding result of superseded run");
            return false;
        }
        publish();
        slot.current = None;
        slot.task = None;
        true
    }

    /// The run that may still publish, if any
    pub fn current(&self) -> Option<RunId> {
        self.lock().current
    }

    /// Whether the current run's task is still executing
    pub fn is_running(&self) -> bool {
        self.lock()
            .task
            .as_ref()
            .map_or(false, |task| !task.is_finished())
    }
}

impl Drop for SingleFlight {
    fn drop(&mut self) {
        self.lock().abort_current();
    }
}
