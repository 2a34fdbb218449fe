use std::time::Duration;

use async_trait::async_trait;

use crate::bridge::{Ack, Actuator};
use crate::error::ActuatorError;
use crate::morse::{self, Element};
use crate::scheduler::Speed;

/// Stand-in for a buzzer: keys the message into the log and sleeps for as
/// long as the real device would take.
#[derive(Debug, Clone)]
pub struct SimulatedKeyer {
    time_scale: f64,
}

impl SimulatedKeyer {
    pub fn new(time_scale: f64) -> Self {
        Self {
            time_scale: time_scale.max(0.0),
        }
    }

    /// Keyer that answers immediately.
    pub fn instant() -> Self {
        Self::new(0.0)
    }
}

#[async_trait]
impl Actuator for SimulatedKeyer {
    async fn play(&self, text: &str, speed: Speed) -> Result<Ack, ActuatorError> {
        let encoded = morse::encode(text);
        if encoded.is_empty() {
            return Err(ActuatorError::Unencodable(text.to_string()));
        }
        if !encoded.skipped().is_empty() {
            tracing::warn!(skipped = ?encoded.skipped(), "Characters without Morse code skipped");
        }

        for element in encoded.elements() {
            match element {
                Element::Letter { ch, code } => tracing::trace!(%ch, code, "key"),
                Element::WordGap => tracing::trace!("word gap"),
            }
        }

        let keying = encoded.duration(speed);
        tracing::debug!(
            speed = %speed,
            letters = encoded.letter_count(),
            keying_ms = keying.as_millis() as u64,
            "Simulated playback"
        );

        if self.time_scale > 0.0 {
            let scaled = Duration::try_from_secs_f64(keying.as_secs_f64() * self.time_scale)
                .unwrap_or(Duration::MAX);
            tokio::time::sleep(scaled).await;
        }
        Ok("ok".to_string())
    }
}
