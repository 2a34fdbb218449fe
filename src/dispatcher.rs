//! Forwards queued jobs to the keying device, one at a time.
//!
//! Each pass is split in three:
//! 1. under the coordinator lock, pop the oldest job and mark busy
//! 2. without the lock, play it on the [`Actuator`] within the timeout
//! 3. under the lock again, record `done` or `error` and clear busy
//!
//! Step 3 is carried by the [`InFlight`](crate::scheduler::InFlight) guard,
//! so it also runs when the playback panics or the pass is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::bridge::Actuator;
use crate::error::ActuatorError;
use crate::scheduler::{Coordinator, StatusSnapshot};

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Clone)]
pub struct Dispatcher {
    coordinator: Arc<Coordinator>,
    actuator: Arc<dyn Actuator>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        coordinator: Arc<Coordinator>,
        actuator: Arc<dyn Actuator>,
        timeout: Duration,
    ) -> Self {
        Self {
            coordinator,
            actuator,
            timeout,
        }
    }

    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Run one dispatch pass.
    ///
    /// Returns `None` when nothing was eligible (busy or empty queue),
    /// otherwise the snapshot recorded for the job's outcome. Failed jobs
    /// are not retried.
    pub async fn tick(&self) -> Option<StatusSnapshot> {
        let in_flight = self.coordinator.begin_dispatch()?;
        let job = in_flight.job();
        let job_id = job.id();

        tracing::info!(
            job_id = %job_id,
            speed = %job.speed(),
            waited_ms = (chrono::Utc::now() - job.created_at()).num_milliseconds(),
            "Sending job"
        );

        let outcome = match tokio::time::timeout(
            self.timeout,
            self.actuator.play(job.text(), job.speed()),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(ActuatorError::Timeout(self.timeout)),
        };

        match &outcome {
            Ok(ack) => tracing::info!(job_id = %job_id, ack = %ack, "Job played"),
            Err(e) => tracing::warn!(job_id = %job_id, error = %e, "Job failed, dropping it"),
        }

        Some(in_flight.finish(outcome))
    }

    /// Drive [`tick`](Self::tick) every `interval` until `cancel` fires.
    ///
    /// A job already in flight is allowed to finish before the loop exits.
    /// Each pass runs in its own task so a panicking bridge does not stop
    /// the loop. A zero `interval` is raised to one millisecond.
    pub async fn run(&self, interval: Duration, cancel: CancellationToken) {
        let interval = interval.max(MIN_INTERVAL);
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(interval_ms = interval.as_millis() as u64, "Dispatcher started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let this = self.clone();
            if let Err(e) = tokio::spawn(async move { this.tick().await }).await {
                tracing::error!(error = %e, "Dispatch pass panicked");
            }
        }

        tracing::info!("Dispatcher stopped");
    }
}
