//! Single-flight ownership of the background dispatch worker.
//!
//! At most one worker is live. Starting a new one first cancels the old one:
//! the cancellation token is fired, the task gets `grace` to wind down, and
//! is aborted after that. Every worker carries an id and results travel back
//! over a channel tagged with it, so a result from anything but the live
//! worker (or anything at all once closing) is dropped on arrival.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::dispatch::DispatchResult;

#[derive(Debug)]
pub struct Delivery {
    pub worker_id: u64,
    pub result: DispatchResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Nothing was running.
    Idle,
    /// The worker stopped within the grace period.
    Cooperative,
    /// The worker was aborted.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("the session is closing")]
    Closing,
}

/// Ownership token for the live worker task.
pub struct WorkerHandle {
    id: u64,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn id(&self) -> u64 {
        self.id
    }
}

pub struct WorkerLifecycle {
    current: Option<WorkerHandle>,
    next_id: u64,
    grace: Duration,
    closing: bool,
    tx: mpsc::UnboundedSender<Delivery>,
}

impl WorkerLifecycle {
    pub fn new(grace: Duration) -> (Self, mpsc::UnboundedReceiver<Delivery>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                current: None,
                next_id: 0,
                grace,
                closing: false,
                tx,
            },
            rx,
        )
    }

    /// Supersedes any live worker, then spawns `job`. The job receives the
    /// new worker's cancellation token; returning `None` means it gave up.
    pub async fn start<F, Fut>(&mut self, job: F) -> Result<u64, LifecycleError>
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Option<DispatchResult>> + Send + 'static,
    {
        if self.closing {
            return Err(LifecycleError::Closing);
        }
        self.cancel_current().await;

        self.next_id += 1;
        let worker_id = self.next_id;
        let cancel = CancellationToken::new();
        let work = job(cancel.clone());
        let token = cancel.clone();
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            let Some(result) = work.await else {
                debug!(worker_id, "worker stopped without a result");
                return;
            };
            if token.is_cancelled() {
                debug!(worker_id, "discarding result of cancelled worker");
                return;
            }
            if tx.send(Delivery { worker_id, result }).is_err() {
                debug!(worker_id, "result receiver dropped");
            }
        });

        debug!(worker_id, "worker started");
        self.current = Some(WorkerHandle {
            id: worker_id,
            cancel,
            task,
        });
        Ok(worker_id)
    }

    /// Cooperative cancellation first, abort once the grace period runs out.
    pub async fn cancel_current(&mut self) -> CancelOutcome {
        let Some(mut handle) = self.current.take() else {
            return CancelOutcome::Idle;
        };
        handle.cancel.cancel();

        if tokio::time::timeout(self.grace, &mut handle.task)
            .await
            .is_ok()
        {
            debug!(worker_id = handle.id, "worker cancelled");
            return CancelOutcome::Cooperative;
        }

        warn!(
            worker_id = handle.id,
            grace_ms = self.grace.as_millis() as u64,
            "worker ignored cancellation, aborting"
        );
        handle.task.abort();
        // Aborting takes effect at the task's next yield point.
        if tokio::time::timeout(self.grace, &mut handle.task)
            .await
            .is_err()
        {
            warn!(worker_id = handle.id, "aborted worker has not yielded yet");
        }
        CancelOutcome::Forced
    }

    /// Hands back the result when it comes from the live worker and the
    /// session is still open. Accepting clears the handle.
    pub fn accept(&mut self, delivery: Delivery) -> Option<DispatchResult> {
        if self.closing {
            debug!(worker_id = delivery.worker_id, "dropping result after teardown");
            return None;
        }
        match &self.current {
            Some(handle) if handle.id == delivery.worker_id => {
                self.current = None;
                Some(delivery.result)
            }
            _ => {
                debug!(worker_id = delivery.worker_id, "dropping stale result");
                None
            }
        }
    }

    /// Marks the manager closing before draining the live worker, so nothing
    /// that finishes in the meantime is accepted.
    pub async fn teardown(&mut self) -> CancelOutcome {
        self.closing = true;
        self.cancel_current().await
    }

    pub fn is_busy(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn current_id(&self) -> Option<u64> {
        self.current.as_ref().map(WorkerHandle::id)
    }
}

impl Drop for WorkerLifecycle {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.cancel.cancel();
            handle.task.abort();
        }
    }
}
