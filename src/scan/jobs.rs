use tokio::sync::{RwLock, watch};
use tracing::{debug, info};

use super::{Result, ScanError};
use crate::models::{ScanJob, ScanStatus};

/// What a running job has been told to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobControl {
    Run,
    Pause,
}

struct TrackedJob {
    job: ScanJob,
    control: watch::Sender<JobControl>,
}

/// In-memory registry of scan jobs, in creation order
///
/// Removing a job drops its control sender, which is how a processor learns
/// that the job was cancelled.
#[derive(Default)]
pub struct ScanJobStore {
    jobs: RwLock<Vec<TrackedJob>>,
}

/// The processor's end of a job's control channel
pub struct JobHandle {
    job_id: String,
    control: watch::Receiver<JobControl>,
}

impl JobHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Waits until the job may process its next image
    ///
    /// Returns `false` once the job has been cancelled.
    pub async fn proceed(&mut self) -> bool {
        loop {
            if self.control.has_changed().is_err() {
                return false;
            }
            let state = *self.control.borrow_and_update();
            match state {
                JobControl::Run => return true,
                JobControl::Pause => {
                    debug!("Job {} is paused, waiting", self.job_id);
                    if self.control.changed().await.is_err() {
                        return false;
                    }
                }
            }
        }
    }
}

impl ScanJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a job and returns the handle its processor listens on
    pub async fn create(&self, job: ScanJob) -> JobHandle {
        let initial = if job.status == ScanStatus::Paused {
            JobControl::Pause
        } else {
            JobControl::Run
        };
        let (control, receiver) = watch::channel(initial);
        let handle = JobHandle {
            job_id: job.id.clone(),
            control: receiver,
        };

        info!("Registered scan job {} ({})", job.id, job.job_name);
        self.jobs.write().await.push(TrackedJob { job, control });
        handle
    }

    pub async fn list(&self) -> Vec<ScanJob> {
        self.jobs.read().await.iter().map(|t| t.job.clone()).collect()
    }

    pub async fn get(&self, id: &str) -> Option<ScanJob> {
        self.jobs
            .read()
            .await
            .iter()
            .find(|t| t.job.id == id)
            .map(|t| t.job.clone())
    }

    /// Applies `f` to the job and bumps its `updated_at`
    ///
    /// Returns the updated job, or `None` if the job is gone.
    pub async fn update<F>(&self, id: &str, f: F) -> Option<ScanJob>
    where
        F: FnOnce(&mut ScanJob),
    {
        let mut jobs = self.jobs.write().await;
        let tracked = jobs.iter_mut().find(|t| t.job.id == id)?;
        f(&mut tracked.job);
        tracked.job.touch();
        Some(tracked.job.clone())
    }

    /// Holds the job before its next image
    ///
    /// A finished job keeps its status.
    pub async fn pause(&self, id: &str) -> Result<ScanJob> {
        self.signal(id, ScanStatus::Paused, JobControl::Pause).await
    }

    /// Lets a paused job continue
    pub async fn resume(&self, id: &str) -> Result<ScanJob> {
        self.signal(id, ScanStatus::Processing, JobControl::Run).await
    }

    /// Removes the job; its processor stops before the next image
    pub async fn cancel(&self, id: &str) -> Result<ScanJob> {
        let mut jobs = self.jobs.write().await;
        let index = jobs
            .iter()
            .position(|t| t.job.id == id)
            .ok_or(ScanError::JobNotFound)?;
        let removed = jobs.remove(index);
        info!("Cancelled scan job {}", id);
        Ok(removed.job)
    }

    async fn signal(&self, id: &str, status: ScanStatus, control: JobControl) -> Result<ScanJob> {
        let mut jobs = self.jobs.write().await;
        let tracked = jobs
            .iter_mut()
            .find(|t| t.job.id == id)
            .ok_or(ScanError::JobNotFound)?;

        if !tracked.job.status.is_finished() {
            tracked.job.set_status(status);
            tracked.control.send_replace(control);
            info!("Scan job {} is now {}", id, status);
        }
        Ok(tracked.job.clone())
    }
}
