use std::time::Duration;

use thiserror::Error;

/// Rejections returned synchronously to producers and the speed setter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("Message text is empty after normalization")]
    EmptyText,

    #[error("Speed is not an integer: {0:?}")]
    BadSpeed(String),

    #[error("Malformed query string: {0}")]
    BadQuery(String),
}

impl RelayError {
    /// Short machine-readable code used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::EmptyText => "empty",
            RelayError::BadSpeed(_) => "bad_speed",
            RelayError::BadQuery(_) => "bad_query",
        }
    }
}

/// Failures of a single playback on the keying device.
///
/// These never reach producers; the dispatcher records them in the
/// status register and moves on.
#[derive(Error, Debug)]
pub enum ActuatorError {
    #[error("Actuator did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Actuator rejected the message: {0}")]
    Rejected(String),

    #[error("Nothing encodable in {0:?}")]
    Unencodable(String),

    #[error("Malformed bridge reply: {0}")]
    Protocol(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
