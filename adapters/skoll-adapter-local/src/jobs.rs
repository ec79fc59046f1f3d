//! In-process job bookkeeping shared by the local backends.

use rustc_hash::FxHashMap;
use std::sync::Mutex;

use skoll_hal::{ExecutionResult, HalError, HalResult, Job, JobId, JobStatus};

struct StoredJob {
    job: Job,
    result: Option<ExecutionResult>,
}

/// Thread-safe table of jobs a backend has accepted.
#[derive(Default)]
pub(crate) struct JobTable {
    jobs: Mutex<FxHashMap<String, StoredJob>>,
}

impl JobTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Store a job that finished at submit time.
    pub(crate) fn insert_completed(&self, mut job: Job, result: ExecutionResult) {
        job.transition(JobStatus::Completed);
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.insert(
            job.id.0.clone(),
            StoredJob {
                job,
                result: Some(result),
            },
        );
    }

    pub(crate) fn status(&self, job_id: &JobId) -> HalResult<JobStatus> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        jobs.get(&job_id.0)
            .map(|stored| stored.job.status.clone())
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))
    }

    pub(crate) fn result(&self, job_id: &JobId) -> HalResult<ExecutionResult> {
        let jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let stored = jobs
            .get(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        match &stored.job.status {
            JobStatus::Completed => stored
                .result
                .clone()
                .ok_or_else(|| HalError::Backend("completed job has no result".into())),
            JobStatus::Cancelled => Err(HalError::JobCancelled),
            JobStatus::Failed(msg) => Err(HalError::JobFailed(msg.clone())),
            _ => Err(HalError::Backend(format!(
                "job {} has not completed",
                job_id.0
            ))),
        }
    }

    /// Cancel a job. Terminal jobs are left untouched.
    pub(crate) fn cancel(&self, job_id: &JobId) -> HalResult<()> {
        let mut jobs = self
            .jobs
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let stored = jobs
            .get_mut(&job_id.0)
            .ok_or_else(|| HalError::JobNotFound(job_id.0.clone()))?;
        if !stored.job.status.is_terminal() {
            stored.job.transition(JobStatus::Cancelled);
        }
        Ok(())
    }
}
