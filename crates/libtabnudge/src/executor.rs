//! Single-worker execution context with UI affinity.

use std::sync::mpsc;
use std::thread::{self, JoinHandle, ThreadId};

use tracing::debug;

enum Job {
    Run {
        cancelled: Option<Box<dyn Fn() -> bool + Send>>,
        work: Box<dyn FnOnce() + Send>,
    },
    Shutdown,
}

/// A dedicated queue with exactly one worker, standing in for the host
/// toolkit's UI thread.
///
/// Tab-state queries, window focusing, and toast/alert creation and
/// withdrawal are not safe to call from arbitrary threads, so they all
/// funnel through here. Two jobs never run concurrently, which is the only
/// ordering contract the native channel depends on.
pub struct UiExecutor {
    tx: mpsc::Sender<Job>,
    worker_id: ThreadId,
    worker: Option<JoinHandle<()>>,
}

impl UiExecutor {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<Job>();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("tabnudge-ui".to_string())
            .spawn(move || {
                let _ = ready_tx.send(thread::current().id());
                while let Ok(job) = rx.recv() {
                    match job {
                        Job::Shutdown => break,
                        Job::Run { cancelled, work } => {
                            if cancelled.is_some_and(|c| c()) {
                                debug!("dropped cancelled UI job");
                                continue;
                            }
                            work();
                        }
                    }
                }
            })
            .expect("failed to spawn UI executor thread");

        let worker_id = ready_rx.recv().expect("UI executor thread did not start");

        Self {
            tx,
            worker_id,
            worker: Some(worker),
        }
    }

    /// Enqueue `work` to run on the worker.
    pub fn submit(&self, work: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Job::Run {
            cancelled: None,
            work: Box::new(work),
        });
    }

    /// Enqueue `work`, dropping it unrun if `cancelled` reports true by the
    /// time the worker dequeues it.
    pub fn submit_unless(
        &self,
        cancelled: impl Fn() -> bool + Send + 'static,
        work: impl FnOnce() + Send + 'static,
    ) {
        let _ = self.tx.send(Job::Run {
            cancelled: Some(Box::new(cancelled)),
            work: Box::new(work),
        });
    }

    /// Run `work` on the worker and wait for its result.
    ///
    /// Calls made from the worker itself execute inline, so a queued job may
    /// wait on further UI work without deadlocking.
    pub fn run_and_wait<R: Send + 'static>(&self, work: impl FnOnce() -> R + Send + 'static) -> R {
        if thread::current().id() == self.worker_id {
            return work();
        }

        let (tx, rx) = mpsc::channel();
        self.submit(move || {
            let _ = tx.send(work());
        });
        // The executor outlives every handle that can reach it, so the job
        // always runs.
        rx.recv().expect("UI executor gone while waiting on a job")
    }

    /// Wait until every job enqueued so far has run.
    pub fn flush(&self) {
        self.run_and_wait(|| ());
    }
}

impl Default for UiExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UiExecutor {
    fn drop(&mut self) {
        let _ = self.tx.send(Job::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
