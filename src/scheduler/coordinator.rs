use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ActuatorError, Result};
use crate::scheduler::job::{Job, JobAccepted, Speed};
use crate::scheduler::queue::JobQueue;
use crate::scheduler::status::{RelayStatus, StatusSnapshot};

const ABANDONED_DETAIL: &str = "dispatch abandoned before the actuator answered";

#[derive(Debug)]
struct State {
    queue: JobQueue,
    busy: bool,
    last: StatusSnapshot,
    speed: Speed,
}

/// Owns the queue, busy flag, status register and default speed.
///
/// Every read and write goes through one mutex. Critical sections never
/// span an actuator call, so producers are not held up by a playback.
#[derive(Debug)]
pub struct Coordinator {
    state: Mutex<State>,
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(Speed::DEFAULT)
    }
}

impl Coordinator {
    pub fn new(default_speed: Speed) -> Self {
        Self {
            state: Mutex::new(State {
                queue: JobQueue::new(),
                busy: false,
                last: StatusSnapshot::Idle,
                speed: default_speed,
            }),
        }
    }

    // A panic while holding the lock leaves every field in a valid state,
    // so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current default speed.
    pub fn speed(&self) -> Speed {
        self.lock().speed
    }

    /// Parse, clamp and store a new default speed.
    pub fn set_speed(&self, raw: &str) -> Result<Speed> {
        let speed = Speed::parse(raw)?;
        let mut state = self.lock();
        if state.speed != speed {
            tracing::info!(from = %state.speed, to = %speed, "Default speed changed");
        }
        state.speed = speed;
        Ok(speed)
    }

    /// Validate a message and append it to the queue.
    ///
    /// A `speed` that does not parse falls back to the default instead of
    /// rejecting the message.
    pub fn enqueue(&self, text: &str, speed: Option<&str>) -> Result<JobAccepted> {
        let requested = speed.and_then(|raw| match Speed::parse(raw) {
            Ok(speed) => Some(speed),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring per-job speed, using default");
                None
            }
        });

        let mut state = self.lock();
        let job = Job::new(text, requested.unwrap_or(state.speed))?;
        let accepted = JobAccepted::from(&job);
        let queue_len = state.queue.push(job);
        state.last = StatusSnapshot::Queued {
            txt: accepted.txt.clone(),
            speed: accepted.speed,
            queue_len,
        };
        drop(state);

        tracing::info!(
            job_id = %accepted.job_id,
            speed = %accepted.speed,
            len = accepted.len,
            queue_len,
            "Job queued"
        );
        Ok(accepted)
    }

    /// Consistent read of all four entities.
    pub fn status(&self) -> RelayStatus {
        let state = self.lock();
        RelayStatus {
            busy: state.busy,
            queue_len: state.queue.len(),
            last: state.last.clone(),
            speed: state.speed,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.lock().busy
    }

    pub fn queue_len(&self) -> usize {
        self.lock().queue.len()
    }

    /// Pop the oldest job and mark the coordinator busy.
    ///
    /// Returns `None` without side effects when a job is already in flight
    /// or the queue is empty. The check, the pop and the busy flag are one
    /// critical section, so at most one [`InFlight`] exists at a time.
    pub fn begin_dispatch(&self) -> Option<InFlight<'_>> {
        let mut state = self.lock();
        if state.busy {
            return None;
        }
        let job = state.queue.pop()?;
        state.busy = true;
        state.last = StatusSnapshot::sending(&job, state.queue.len());
        Some(InFlight {
            coordinator: self,
            job,
            settled: false,
        })
    }
}

/// A job between dequeue and outcome.
///
/// Dropping it without calling [`InFlight::finish`] records an `error`
/// snapshot and clears the busy flag, so the flag is released on every
/// exit path.
#[derive(Debug)]
pub struct InFlight<'a> {
    coordinator: &'a Coordinator,
    job: Job,
    settled: bool,
}

impl InFlight<'_> {
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Record the actuator outcome and release the busy flag.
    pub fn finish(
        mut self,
        outcome: std::result::Result<String, ActuatorError>,
    ) -> StatusSnapshot {
        let coordinator = self.coordinator;
        let mut state = coordinator.lock();
        let queue_len = state.queue.len();
        state.last = match outcome {
            Ok(ack) => StatusSnapshot::done(&self.job, ack, queue_len),
            Err(e) => StatusSnapshot::error(&self.job, e.to_string(), queue_len),
        };
        state.busy = false;
        self.settled = true;
        state.last.clone()
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let coordinator = self.coordinator;
        let mut state = coordinator.lock();
        let queue_len = state.queue.len();
        state.last = StatusSnapshot::error(&self.job, ABANDONED_DETAIL.to_string(), queue_len);
        state.busy = false;
        tracing::warn!(job_id = %self.job.id(), "In-flight job abandoned");
    }
}
