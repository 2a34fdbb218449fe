use std::collections::VecDeque;

use crate::scheduler::job::Job;

/// Pending jobs in enqueue order.
///
/// Only push-back and pop-front are offered, so dispatch order always
/// equals insertion order.
#[derive(Debug, Default)]
pub struct JobQueue {
    jobs: VecDeque<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job at the tail. Returns the new length.
    pub fn push(&mut self, job: Job) -> usize {
        self.jobs.push_back(job);
        self.jobs.len()
    }

    /// Remove and return the oldest job.
    pub fn pop(&mut self) -> Option<Job> {
        self.jobs.pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
