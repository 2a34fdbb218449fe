//! Keying-device bridges.
//!
//! The dispatcher sees a device only through [`Actuator`]: one blocking
//! playback that either acknowledges or fails. Timeouts are imposed by the
//! caller, not by the bridge.
//!
//! - [`SimulatedKeyer`]: encodes locally and waits out the keying time
//! - [`TcpBridge`]: forwards to a device over a JSON-lines socket

pub mod simulated;
pub mod tcp;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::BridgeConfig;
use crate::error::ActuatorError;
use crate::scheduler::Speed;

pub use simulated::SimulatedKeyer;
pub use tcp::TcpBridge;

/// Acknowledgement returned by a device after a playback.
pub type Ack = String;

#[async_trait]
pub trait Actuator: Send + Sync {
    /// Play one message and wait for the device to finish.
    async fn play(&self, text: &str, speed: Speed) -> Result<Ack, ActuatorError>;
}

/// Build the bridge selected by configuration.
pub fn from_config(config: &BridgeConfig) -> Arc<dyn Actuator> {
    match config {
        BridgeConfig::Simulated { time_scale } => Arc::new(SimulatedKeyer::new(*time_scale)),
        BridgeConfig::Tcp { addr } => Arc::new(TcpBridge::new(addr.clone())),
    }
}
