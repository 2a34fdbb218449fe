use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{RelayError, Result};

/// Keying speed in words per minute, always within `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Speed(u8);

impl Speed {
    pub const MIN: u8 = 5;
    pub const MAX: u8 = 30;
    pub const DEFAULT: Speed = Speed(17);

    /// Saturate any integer into the allowed range.
    pub fn clamped(n: i64) -> Self {
        Self(n.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    /// Parse an untyped input and clamp it.
    ///
    /// Surrounding whitespace and a leading sign are accepted. Integers that
    /// overflow `i64` saturate to the bound on their side; anything that is
    /// not an integer is rejected.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim().parse::<i64>() {
            Ok(n) => Ok(Self::clamped(n)),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Ok(Self(Self::MAX)),
                IntErrorKind::NegOverflow => Ok(Self(Self::MIN)),
                _ => Err(RelayError::BadSpeed(raw.to_string())),
            },
        }
    }

    pub fn wpm(self) -> u8 {
        self.0
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for Speed {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strip carriage returns and surrounding whitespace.
/// Returns `None` when nothing is left.
pub fn normalize_text(raw: &str) -> Option<String> {
    let stripped = raw.replace('\r', "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// A queued message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: Uuid,
    text: String,
    speed: Speed,
    created_at: DateTime<Utc>,
}

impl Job {
    /// Build a job from raw producer input.
    pub fn new(raw_text: &str, speed: Speed) -> Result<Self> {
        let text = normalize_text(raw_text).ok_or(RelayError::EmptyText)?;
        Ok(Self {
            id: Uuid::new_v4(),
            text,
            speed,
            created_at: Utc::now(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn speed(&self) -> Speed {
        self.speed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Acceptance record handed back to the producer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobAccepted {
    pub job_id: Uuid,
    pub txt: String,
    /// Character count of the normalized text.
    pub len: usize,
    pub speed: Speed,
}

impl From<&Job> for JobAccepted {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id,
            txt: job.text.clone(),
            len: job.text.chars().count(),
            speed: job.speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_range() {
        assert_eq!(Speed::clamped(-100).wpm(), 5);
        assert_eq!(Speed::clamped(4).wpm(), 5);
        assert_eq!(Speed::clamped(5).wpm(), 5);
        assert_eq!(Speed::clamped(12).wpm(), 12);
        assert_eq!(Speed::clamped(30).wpm(), 30);
        assert_eq!(Speed::clamped(31).wpm(), 30);
        assert_eq!(Speed::clamped(i64::MAX).wpm(), 30);
    }

    #[test]
    fn parse_accepts_whitespace_and_sign() {
        assert_eq!(Speed::parse(" 12 ").unwrap().wpm(), 12);
        assert_eq!(Speed::parse("+20").unwrap().wpm(), 20);
        assert_eq!(Speed::parse("-3").unwrap().wpm(), 5);
    }

    #[test]
    fn parse_saturates_huge_integers() {
        assert_eq!(
            Speed::parse("999999999999999999999999").unwrap().wpm(),
            30
        );
        assert_eq!(
            Speed::parse("-999999999999999999999999").unwrap().wpm(),
            5
        );
    }

    #[test]
    fn parse_rejects_non_integers() {
        for raw in ["abc", "", "  ", "12.5", "1e3", "twelve"] {
            assert_eq!(
                Speed::parse(raw),
                Err(RelayError::BadSpeed(raw.to_string())),
                "input {raw:?}"
            );
        }
    }

    #[test]
    fn normalize_strips_carriage_returns_and_trims() {
        assert_eq!(normalize_text("  SOS\r\n"), Some("SOS".to_string()));
        assert_eq!(normalize_text("A\rB"), Some("AB".to_string()));
        assert_eq!(normalize_text("   \r\n  "), None);
        assert_eq!(normalize_text(""), None);
    }

    #[test]
    fn job_rejects_empty_text() {
        assert_eq!(
            Job::new(" \r ", Speed::DEFAULT),
            Err(RelayError::EmptyText)
        );
    }

    #[test]
    fn accepted_counts_characters() {
        let job = Job::new(" héllo ", Speed::clamped(10)).unwrap();
        let accepted = JobAccepted::from(&job);
        assert_eq!(accepted.txt, "héllo");
        assert_eq!(accepted.len, 5);
        assert_eq!(accepted.speed.wpm(), 10);
        assert_eq!(accepted.job_id, job.id());
    }
}
