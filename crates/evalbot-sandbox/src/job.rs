//! Per-user job tracking.
//!
//! A user may have at most one evaluation in flight. A second request while
//! one is running is rejected, not queued. The entry is owned by a
//! [`JobGuard`] and disappears when the guard is dropped, so every exit path
//! of an evaluation releases it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use evalbot_core::UserId;

/// A running evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub user_id: UserId,
    pub started_at: DateTime<Utc>,
}

impl Job {
    /// Time since the job started.
    pub fn elapsed(&self) -> chrono::Duration {
        Utc::now() - self.started_at
    }
}

/// Shared table of running jobs, keyed by user.
#[derive(Debug, Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<DashMap<UserId, DateTime<Utc>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job for `user_id` unless one is already running.
    pub fn try_acquire(&self, user_id: UserId) -> Option<JobGuard> {
        let started_at = Utc::now();
        match self.jobs.entry(user_id) {
            Entry::Occupied(_) => {
                debug!(user = %user_id, "job already running");
                None
            }
            Entry::Vacant(slot) => {
                slot.insert(started_at);
                Some(JobGuard {
                    jobs: Arc::clone(&self.jobs),
                    job: Job {
                        user_id,
                        started_at,
                    },
                })
            }
        }
    }

    pub fn is_running(&self, user_id: UserId) -> bool {
        self.jobs.contains_key(&user_id)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.jobs.len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

/// Holds a user's job slot; dropping it releases the slot.
#[derive(Debug)]
pub struct JobGuard {
    jobs: Arc<DashMap<UserId, DateTime<Utc>>>,
    job: Job,
}

impl JobGuard {
    pub fn job(&self) -> &Job {
        &self.job
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        self.jobs.remove(&self.job.user_id);
        debug!(user = %self.job.user_id, "job released");
    }
}
