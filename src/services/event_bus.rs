//! Per-job event queue.
//!
//! Every job owns one unbounded channel. The pipeline and its concurrent
//! Alternatives branch hold clones of the sending half; the single stream
//! consumer owns the receiving half. Closing the channel (all emitters
//! dropped) is the terminal signal.

use tokio::sync::mpsc;

use crate::domain::models::{AnalysisEvent, JobId};

/// Receiving half of a job's event queue.
pub type EventReceiver = mpsc::UnboundedReceiver<AnalysisEvent>;

/// Create the queue for one job.
pub fn job_channel(job_id: JobId) -> (JobEmitter, EventReceiver) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (JobEmitter { job_id, sender }, receiver)
}

/// Cloneable, non-blocking producer handle for a job's queue.
#[derive(Debug, Clone)]
pub struct JobEmitter {
    job_id: JobId,
    sender: mpsc::UnboundedSender<AnalysisEvent>,
}

impl JobEmitter {
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Hand an event to the queue without waiting.
    ///
    /// Events for a job whose consumer is gone (or that was reaped) are
    /// discarded.
    pub fn emit(&self, event: AnalysisEvent) {
        let kind = event.kind();
        if self.sender.send(event).is_err() {
            tracing::trace!(job_id = %self.job_id, kind, "event discarded, queue closed");
        }
    }

    /// True once the receiving half has been dropped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
