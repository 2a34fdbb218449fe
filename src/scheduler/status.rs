use serde::Serialize;

use crate::scheduler::job::{Job, Speed};

/// Lifecycle snapshot of the most recently touched job.
///
/// Only the latest transition is kept; every transition overwrites it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StatusSnapshot {
    #[default]
    Idle,
    Queued {
        txt: String,
        speed: Speed,
        queue_len: usize,
    },
    Sending {
        txt: String,
        speed: Speed,
        queue_len: usize,
    },
    Done {
        txt: String,
        speed: Speed,
        ack: String,
        queue_len: usize,
    },
    Error {
        txt: String,
        speed: Speed,
        detail: String,
        queue_len: usize,
    },
}

impl StatusSnapshot {
    pub(crate) fn sending(job: &Job, queue_len: usize) -> Self {
        Self::Sending {
            txt: job.text().to_string(),
            speed: job.speed(),
            queue_len,
        }
    }

    pub(crate) fn done(job: &Job, ack: String, queue_len: usize) -> Self {
        Self::Done {
            txt: job.text().to_string(),
            speed: job.speed(),
            ack,
            queue_len,
        }
    }

    pub(crate) fn error(job: &Job, detail: String, queue_len: usize) -> Self {
        Self::Error {
            txt: job.text().to_string(),
            speed: job.speed(),
            detail,
            queue_len,
        }
    }

    /// Lowercase state name, as serialized.
    pub fn state(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Queued { .. } => "queued",
            Self::Sending { .. } => "sending",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Queued { txt, .. }
            | Self::Sending { txt, .. }
            | Self::Done { txt, .. }
            | Self::Error { txt, .. } => Some(txt),
        }
    }

    pub fn speed(&self) -> Option<Speed> {
        match self {
            Self::Idle => None,
            Self::Queued { speed, .. }
            | Self::Sending { speed, .. }
            | Self::Done { speed, .. }
            | Self::Error { speed, .. } => Some(*speed),
        }
    }

    pub fn queue_len(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Queued { queue_len, .. }
            | Self::Sending { queue_len, .. }
            | Self::Done { queue_len, .. }
            | Self::Error { queue_len, .. } => Some(*queue_len),
        }
    }
}

/// Point-in-time view of the whole coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayStatus {
    pub busy: bool,
    pub queue_len: usize,
    pub last: StatusSnapshot,
    pub speed: Speed,
}
