//! Process-wide map from job id to its event queue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AnalysisEvent, JobId};

use super::event_bus::{job_channel, EventReceiver, JobEmitter};

struct JobEntry {
    /// Taken by the first consumer to attach.
    receiver: Option<EventReceiver>,
    created_at: Instant,
}

/// Registry of live jobs.
///
/// The map itself is never exposed. A job is inserted by [`create`], handed
/// to exactly one consumer by [`attach`], and removed when that consumer
/// drains its queue or goes away.
///
/// [`create`]: JobRegistry::create
/// [`attach`]: JobRegistry::attach
#[derive(Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, JobEntry>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<JobId, JobEntry>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new job and return the producer side of its queue.
    pub fn create(&self) -> (JobId, JobEmitter) {
        let job_id = JobId::new();
        let (emitter, receiver) = job_channel(job_id);
        self.lock().insert(
            job_id,
            JobEntry {
                receiver: Some(receiver),
                created_at: Instant::now(),
            },
        );
        tracing::debug!(%job_id, "job registered");
        (job_id, emitter)
    }

    /// Bind the single consumer of a job's queue.
    pub fn attach(self: &Arc<Self>, job_id: &str) -> DomainResult<JobStream> {
        let id: JobId = job_id
            .parse()
            .map_err(|_| DomainError::JobNotFound(job_id.to_string()))?;

        let mut jobs = self.lock();
        let entry = jobs
            .get_mut(&id)
            .ok_or_else(|| DomainError::JobNotFound(job_id.to_string()))?;
        let receiver = entry
            .receiver
            .take()
            .ok_or_else(|| DomainError::JobAlreadyAttached(job_id.to_string()))?;
        drop(jobs);

        tracing::debug!(job_id = %id, "consumer attached");
        Ok(JobStream {
            job_id: id,
            receiver,
            registry: Arc::clone(self),
            released: false,
        })
    }

    /// Drop a job. Returns whether it was present.
    pub fn remove(&self, job_id: &JobId) -> bool {
        self.lock().remove(job_id).is_some()
    }

    pub fn contains(&self, job_id: &JobId) -> bool {
        self.lock().contains_key(job_id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop jobs no consumer attached to within `ttl`.
    ///
    /// The dropped receiver closes the queue, so the job's remaining
    /// emissions are discarded.
    pub fn reap_unclaimed(&self, ttl: Duration) -> usize {
        let mut jobs = self.lock();
        let before = jobs.len();
        jobs.retain(|_, entry| entry.receiver.is_none() || entry.created_at.elapsed() < ttl);
        before - jobs.len()
    }
}

/// The attached consumer's view of one job's queue.
///
/// The registry entry is removed when the queue is exhausted or when the
/// stream is dropped, whichever happens first.
pub struct JobStream {
    job_id: JobId,
    receiver: EventReceiver,
    registry: Arc<JobRegistry>,
    released: bool,
}

impl JobStream {
    /// Next event, or `None` once every producer has finished.
    pub async fn next(&mut self) -> Option<AnalysisEvent> {
        let event = self.receiver.recv().await;
        if event.is_none() {
            self.release();
        }
        event
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.remove(&self.job_id);
            tracing::debug!(job_id = %self.job_id, "job removed");
        }
    }
}

impl Drop for JobStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_registers_job() {
        let registry = JobRegistry::new();
        let (job_id, _emitter) = registry.create();
        assert!(registry.contains(&job_id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_attach_unknown_job() {
        let registry = Arc::new(JobRegistry::new());
        let err = registry.attach("does-not-exist").err().unwrap();
        assert!(matches!(err, DomainError::JobNotFound(id) if id == "does-not-exist"));

        let err = registry.attach(&JobId::new().to_string()).err().unwrap();
        assert!(matches!(err, DomainError::JobNotFound(_)));
    }

    #[test]
    fn test_second_consumer_rejected() {
        let registry = Arc::new(JobRegistry::new());
        let (job_id, _emitter) = registry.create();

        let _stream = registry.attach(&job_id.to_string()).unwrap();
        let err = registry.attach(&job_id.to_string()).err().unwrap();
        assert!(matches!(err, DomainError::JobAlreadyAttached(_)));
    }

    #[tokio::test]
    async fn test_drained_stream_removes_job() {
        let registry = Arc::new(JobRegistry::new());
        let (job_id, emitter) = registry.create();
        let mut stream = registry.attach(&job_id.to_string()).unwrap();

        emitter.emit(AnalysisEvent::Done);
        drop(emitter);

        assert_eq!(stream.next().await, Some(AnalysisEvent::Done));
        assert!(registry.contains(&job_id));
        assert_eq!(stream.next().await, None);
        assert!(!registry.contains(&job_id));
    }

    #[test]
    fn test_dropped_stream_removes_job() {
        let registry = Arc::new(JobRegistry::new());
        let (job_id, _emitter) = registry.create();
        let stream = registry.attach(&job_id.to_string()).unwrap();
        drop(stream);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_reap_only_touches_unclaimed_jobs() {
        let registry = Arc::new(JobRegistry::new());
        let (claimed, _a) = registry.create();
        let (unclaimed, emitter) = registry.create();
        let _stream = registry.attach(&claimed.to_string()).unwrap();

        assert_eq!(registry.reap_unclaimed(Duration::from_secs(600)), 0);
        assert_eq!(registry.reap_unclaimed(Duration::ZERO), 1);
        assert!(registry.contains(&claimed));
        assert!(!registry.contains(&unclaimed));
        assert!(emitter.is_closed());
    }
}
